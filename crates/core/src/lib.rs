//! # PromptWeave Core
//!
//! Domain types, traits, and error definitions for the PromptWeave agent
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem boundary is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod capability;
pub mod error;
pub mod log;

// Re-export key types at crate root for ergonomics
pub use backend::GenerationBackend;
pub use capability::{Capability, CapabilityRegistry, CATALOG_CLOSE, CATALOG_OPEN};
pub use error::{BackendError, Error, Result};
pub use log::{ConversationEntry, ConversationLog, EntryKind};
