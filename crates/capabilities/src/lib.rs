//! Built-in capabilities for PromptWeave agents.
//!
//! Each capability implements [`promptweave_core::Capability`]. The stubs
//! here (search, browse) return deterministic canned content so an agent can
//! run end-to-end without external services; swap in real implementations by
//! registering your own types.

pub mod browse;
pub mod clock;
pub mod finish;
pub mod search;

pub use browse::BrowseCapability;
pub use clock::CurrentTimeCapability;
pub use finish::FinishCapability;
pub use search::SearchCapability;

use promptweave_core::CapabilityRegistry;

/// The standard registry: search, browse, clock, and the terminal action,
/// with search as the fallback for unrecognized action names.
pub fn default_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register(Box::new(SearchCapability));
    registry.register(Box::new(BrowseCapability));
    registry.register(Box::new(CurrentTimeCapability));
    registry.register(Box::new(FinishCapability));
    registry.with_fallback("Search")
}
