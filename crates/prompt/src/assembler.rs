//! The prompt assembler — budgeted breadth-first tree traversal.
//!
//! # Algorithm
//!
//! 1. Seed a FIFO queue with the root node; consumed budget starts at 0.
//! 2. While the queue is non-empty **and** consumed budget is strictly
//!    below the limit: dequeue a node; if it has a generator, invoke it
//!    with `(input, budget - consumed)`, measure the fragment's cost via
//!    the oracle, and record it; then enqueue all children.
//! 3. Stable-sort fragments by `(priority, discovery order)` and
//!    concatenate.
//!
//! # Contracts
//!
//! - The budget is checked only *between* dequeued nodes. A single
//!   generator call may push the running total over the limit; only the
//!   next node is skipped, so a fragment is never truncated mid-text.
//! - Nodes still queued when the budget is exhausted are dropped wholesale.
//!   There is no resume or backfill.
//! - A generator failure aborts the entire assembly — no partial payload is
//!   ever returned.
//! - Priority is a global key; equal priorities across unrelated subtrees
//!   break ties by breadth-first discovery order.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::node::ContentNode;
use crate::oracle::{LengthOracle, shared_oracle};

/// Errors from prompt assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblyError {
    /// A generator failed during traversal. Fail-fast: any fragments
    /// already produced are discarded.
    #[error("generator '{node_id}' failed: {reason}")]
    Generator { node_id: String, reason: String },
}

/// The assembled payload plus traversal statistics.
#[derive(Debug, Clone)]
pub struct Assembled {
    /// The final prompt text.
    pub text: String,
    /// What the traversal did.
    pub stats: AssemblyStats,
}

/// Statistics about one assembly pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Configured budget.
    pub budget: usize,
    /// Total oracle cost of the included fragments.
    pub cost: usize,
    /// Fragments included in the final text.
    pub fragments_included: usize,
    /// Nodes dequeued and processed.
    pub nodes_visited: usize,
    /// Nodes still queued when traversal stopped.
    pub nodes_dropped: usize,
}

/// A fragment produced during one pass, tagged for final ordering.
struct AssembledFragment {
    priority: u32,
    /// Breadth-first discovery sequence — the documented tiebreak for
    /// equal priorities.
    seq: usize,
    text: String,
}

/// The prompt assembler. Stateless apart from its oracle handle — create
/// one and reuse it.
pub struct PromptAssembler {
    oracle: Arc<dyn LengthOracle>,
}

impl PromptAssembler {
    /// Create an assembler with an explicit oracle handle.
    pub fn new(oracle: Arc<dyn LengthOracle>) -> Self {
        Self { oracle }
    }

    /// Create an assembler using the process-wide shared oracle.
    pub fn with_shared_oracle() -> Self {
        Self::new(shared_oracle())
    }

    /// Assemble the tree rooted at `root` into a single payload.
    pub fn assemble(
        &self,
        root: &ContentNode,
        input: &str,
        budget: usize,
    ) -> Result<Assembled, AssemblyError> {
        let mut queue: VecDeque<&ContentNode> = VecDeque::new();
        queue.push_back(root);

        let mut consumed = 0usize;
        let mut visited = 0usize;
        let mut fragments: Vec<AssembledFragment> = Vec::new();

        while let Some(node) = queue.front() {
            if consumed >= budget {
                break;
            }
            let node = *node;
            queue.pop_front();
            visited += 1;

            if let Some(generator) = &node.generator {
                let text = generator(input, budget - consumed).map_err(|e| {
                    AssemblyError::Generator {
                        node_id: node.id.clone(),
                        reason: e.to_string(),
                    }
                })?;
                consumed += self.oracle.length(&text);
                fragments.push(AssembledFragment {
                    priority: node.priority,
                    seq: fragments.len(),
                    text,
                });
            }

            // Grouping nodes are transparent: children are enqueued whether
            // or not the node itself generated.
            for child in &node.children {
                queue.push_back(child);
            }
        }

        let dropped = queue.len();
        if dropped > 0 {
            debug!(dropped, consumed, budget, "budget exhausted, queued nodes dropped");
        }

        // Stable order: priority ascending, ties by discovery order.
        fragments.sort_by_key(|f| (f.priority, f.seq));

        let included = fragments.len();
        let mut text = String::new();
        for fragment in &fragments {
            text.push_str(&fragment.text);
        }

        Ok(Assembled {
            text,
            stats: AssemblyStats {
                budget,
                cost: consumed,
                fragments_included: included,
                nodes_visited: visited,
                nodes_dropped: dropped,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::GeneratorError;
    use crate::oracle::HeuristicOracle;

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(Arc::new(HeuristicOracle))
    }

    /// A leaf that emits a fixed string.
    fn fixed(id: &str, priority: u32, text: &'static str) -> ContentNode {
        ContentNode::leaf(id, priority, move |_, _| Ok(text.to_string()))
    }

    #[test]
    fn single_leaf_tree() {
        let root = fixed("only", 1, "hello world");
        let out = assembler().assemble(&root, "", 100).unwrap();
        assert_eq!(out.text, "hello world");
        assert_eq!(out.stats.fragments_included, 1);
        assert_eq!(out.stats.cost, 3);
    }

    #[test]
    fn fragments_ordered_by_priority_not_depth() {
        // The high-priority fragment sits deep in the tree; the low-priority
        // one is discovered first. Output order must follow priority alone.
        let root = ContentNode::group(
            "root",
            0,
            vec![
                fixed("late", 9, "LAST"),
                ContentNode::group(
                    "wrap",
                    5,
                    vec![ContentNode::group("deeper", 5, vec![fixed("early", 1, "FIRST")])],
                ),
                fixed("mid", 4, "MIDDLE"),
            ],
        );
        let out = assembler().assemble(&root, "", 1000).unwrap();
        assert_eq!(out.text, "FIRSTMIDDLELAST");
    }

    #[test]
    fn priority_ties_break_by_discovery_order() {
        let root = ContentNode::group(
            "root",
            0,
            vec![
                fixed("a", 2, "A"),
                ContentNode::group("wrap", 0, vec![fixed("c", 2, "C")]),
                fixed("b", 2, "B"),
            ],
        );
        // Breadth-first discovery: a, b (wrap's child c comes a level later).
        let out = assembler().assemble(&root, "", 1000).unwrap();
        assert_eq!(out.text, "ABC");
    }

    #[test]
    fn grouping_nodes_are_transparent_and_free() {
        let flat = ContentNode::group(
            "root",
            0,
            vec![fixed("x", 1, "xxxx"), fixed("y", 2, "yyyy")],
        );
        let wrapped = ContentNode::group(
            "root",
            0,
            vec![ContentNode::group(
                "wrapper",
                7,
                vec![fixed("x", 1, "xxxx"), fixed("y", 2, "yyyy")],
            )],
        );

        let a = assembler().assemble(&flat, "", 100).unwrap();
        let b = assembler().assemble(&wrapped, "", 100).unwrap();
        assert_eq!(a.text, b.text);
        assert_eq!(a.stats.cost, b.stats.cost);
    }

    #[test]
    fn budget_checked_between_nodes_not_mid_fragment() {
        // Budget 3: the first fragment costs 5 and overshoots, but is kept
        // whole. The second node is then skipped.
        let root = ContentNode::group(
            "root",
            0,
            vec![fixed("big", 1, "aaaaaaaaaaaaaaaaaaaa"), fixed("next", 2, "bbbb")],
        );
        let out = assembler().assemble(&root, "", 3).unwrap();
        assert_eq!(out.text, "aaaaaaaaaaaaaaaaaaaa");
        assert_eq!(out.stats.cost, 5);
        assert_eq!(out.stats.fragments_included, 1);
        assert_eq!(out.stats.nodes_dropped, 1);
    }

    #[test]
    fn no_fragment_readmitted_after_exhaustion() {
        // Once the running total reaches the budget, every remaining queued
        // node is dropped, whatever its priority.
        let root = ContentNode::group(
            "root",
            0,
            vec![
                fixed("a", 5, "aaaaaaaa"),
                fixed("b", 5, "bbbbbbbb"),
                fixed("urgent", 0, "should not appear"),
            ],
        );
        let out = assembler().assemble(&root, "", 2).unwrap();
        assert_eq!(out.text, "aaaaaaaa");
        assert_eq!(out.stats.nodes_dropped, 2);
    }

    #[test]
    fn zero_budget_produces_empty_payload() {
        let root = fixed("only", 1, "text");
        let out = assembler().assemble(&root, "", 0).unwrap();
        assert!(out.text.is_empty());
        assert_eq!(out.stats.fragments_included, 0);
        assert_eq!(out.stats.nodes_dropped, 1);
    }

    #[test]
    fn generator_failure_aborts_whole_assembly() {
        let root = ContentNode::group(
            "root",
            0,
            vec![
                fixed("ok", 1, "fine"),
                ContentNode::leaf("boom", 2, |_, _| {
                    Err(GeneratorError::new("upstream unavailable"))
                }),
            ],
        );
        let err = assembler().assemble(&root, "", 1000).unwrap_err();
        let AssemblyError::Generator { node_id, reason } = err;
        assert_eq!(node_id, "boom");
        assert!(reason.contains("upstream unavailable"));
    }

    #[test]
    fn generators_receive_input_and_remaining_budget() {
        let root = ContentNode::group(
            "root",
            0,
            vec![
                fixed("pad", 1, "12345678"), // cost 2
                ContentNode::leaf("probe", 2, |input, remaining| {
                    Ok(format!("{input}:{remaining}"))
                }),
            ],
        );
        let out = assembler().assemble(&root, "query", 10).unwrap();
        assert!(out.text.ends_with("query:8"));
    }

    #[test]
    fn empty_generator_output_costs_nothing() {
        let root = ContentNode::group(
            "root",
            0,
            vec![
                ContentNode::leaf("empty", 1, |_, _| Ok(String::new())),
                fixed("real", 2, "data"),
            ],
        );
        let out = assembler().assemble(&root, "", 100).unwrap();
        assert_eq!(out.text, "data");
        assert_eq!(out.stats.cost, 1);
        // The empty fragment is still counted as included.
        assert_eq!(out.stats.fragments_included, 2);
    }

    #[test]
    fn deterministic_assembly() {
        let build = || {
            ContentNode::group(
                "root",
                0,
                vec![fixed("a", 3, "alpha"), fixed("b", 1, "beta"), fixed("c", 2, "gamma")],
            )
        };
        let first = assembler().assemble(&build(), "same", 50).unwrap();
        let second = assembler().assemble(&build(), "same", 50).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.stats.cost, second.stats.cost);
    }
}
