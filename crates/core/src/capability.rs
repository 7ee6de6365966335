//! Capability trait — the abstraction over agent actions.
//!
//! Capabilities are what give the agent the ability to act in the world:
//! search the web, fetch a page, read the clock, finish a task. The control
//! loop dispatches each parsed action to a capability by name.
//!
//! Capabilities encode failure as returned text rather than raising — the
//! loop always has *some* text to log and continue with.

use async_trait::async_trait;

/// Opening marker line of the rendered capability catalog.
///
/// The catalog's exact textual shape is part of the prompt the generation
/// backend sees, so it must stay stable for reproducible behavior.
pub const CATALOG_OPEN: &str = "Available functions:";

/// Closing marker line of the rendered capability catalog.
pub const CATALOG_CLOSE: &str = "End of available functions.";

/// The core Capability trait.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The action name the model uses to select this capability
    /// (e.g., "Search", "Finish"). Matched case-insensitively.
    fn name(&self) -> &str;

    /// A description of what this capability does (sent to the model).
    fn description(&self) -> &str;

    /// Free-text description of the expected input (sent to the model).
    fn input_shape(&self) -> &str;

    /// Invoke the capability. Failures are reported in the returned text.
    async fn invoke(&self, input: &str) -> String;
}

/// A registry of available capabilities.
///
/// The control loop uses this to:
/// 1. Render the "available functions" prompt fragment
/// 2. Look up and invoke capabilities when the model requests them
///
/// Backed by a `Vec` so that [`describe_all`](Self::describe_all) preserves
/// registration order.
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Box<dyn Capability>>,
    fallback: Option<String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Appended in registration order.
    pub fn register(&mut self, capability: Box<dyn Capability>) {
        self.capabilities.push(capability);
    }

    /// Designate the capability that handles unknown action names.
    pub fn with_fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = Some(name.into());
        self
    }

    /// Look up a capability by name, case-insensitive exact match.
    pub fn lookup(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .map(|c| c.as_ref())
    }

    /// Resolve an action name to a capability, degrading to the designated
    /// fallback when no name matches. The second element is `true` when the
    /// fallback was used.
    pub fn resolve_or_fallback(&self, name: &str) -> Option<(&dyn Capability, bool)> {
        if let Some(cap) = self.lookup(name) {
            return Some((cap, false));
        }
        self.fallback
            .as_deref()
            .and_then(|f| self.lookup(f))
            .map(|cap| (cap, true))
    }

    /// Names of all registered capabilities, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Render the capability catalog for the prompt: a fixed open marker,
    /// one block per capability in registration order, a fixed close marker.
    pub fn describe_all(&self) -> String {
        let mut out = String::from(CATALOG_OPEN);
        out.push('\n');
        for cap in &self.capabilities {
            out.push_str("- Function: ");
            out.push_str(cap.name());
            out.push_str("\n  Input: ");
            out.push_str(cap.input_shape());
            out.push_str("\n  Description: ");
            out.push_str(cap.description());
            out.push('\n');
        }
        out.push_str(CATALOG_CLOSE);
        out.push('\n');
        out
    }
}
