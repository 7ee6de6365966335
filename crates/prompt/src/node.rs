//! ContentNode — one node in the prompt tree.

use thiserror::Error;

/// Error returned by a content generator.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct GeneratorError(pub String);

impl GeneratorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// A content generator: `(input, remaining_budget) -> fragment text`.
///
/// `remaining_budget` is advisory — a generator may use it to size its
/// output, but the assembler never truncates what comes back.
pub type Generator =
    Box<dyn Fn(&str, usize) -> Result<String, GeneratorError> + Send + Sync>;

/// A node in the prompt tree.
///
/// A node may own a generator (it produces one fragment) and/or children
/// (pure grouping structure). Children are exclusively owned — the tree has
/// no sharing and no cycles by construction.
pub struct ContentNode {
    /// Diagnostics label. Uniqueness within a tree is conventional, not
    /// enforced.
    pub id: String,

    /// Global sort key for final assembly order (ascending).
    pub priority: u32,

    /// Optional fragment generator; `None` makes this a grouping node.
    pub generator: Option<Generator>,

    /// Ordered children, visited breadth-first.
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a node with an explicit generator slot and children.
    pub fn new(
        id: impl Into<String>,
        priority: u32,
        generator: Option<Generator>,
        children: Vec<ContentNode>,
    ) -> Self {
        Self {
            id: id.into(),
            priority,
            generator,
            children,
        }
    }

    /// Create a generating leaf node.
    pub fn leaf<F>(id: impl Into<String>, priority: u32, generator: F) -> Self
    where
        F: Fn(&str, usize) -> Result<String, GeneratorError> + Send + Sync + 'static,
    {
        Self::new(id, priority, Some(Box::new(generator)), Vec::new())
    }

    /// Create a generator-less grouping node.
    pub fn group(id: impl Into<String>, priority: u32, children: Vec<ContentNode>) -> Self {
        Self::new(id, priority, None, children)
    }

    /// Attach children to a generating node.
    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }
}

impl std::fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentNode")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("has_generator", &self.generator.is_some())
            .field("children", &self.children)
            .finish()
    }
}
