//! Budgeted hierarchical prompt assembly — the core architectural component.
//!
//! A prompt is described as a tree of [`ContentNode`]s. Each node may own a
//! generator that produces one text fragment, and/or children that are pure
//! grouping structure. The [`PromptAssembler`] walks the tree breadth-first
//! under a global length budget, then reorders the produced fragments by
//! priority to build the final payload.
//!
//! The tree's *shape* is purely organizational; only `priority` determines
//! output order. Grouping nodes are transparent to traversal and free.
//!
//! Fragment cost is measured by a [`LengthOracle`] — a deterministic
//! `text -> length` service shared process-wide, initialized lazily exactly
//! once.

pub mod assembler;
pub mod node;
pub mod oracle;

pub use assembler::{Assembled, AssemblyError, AssemblyStats, PromptAssembler};
pub use node::{ContentNode, Generator, GeneratorError};
pub use oracle::{HeuristicOracle, LengthOracle, shared_oracle};
