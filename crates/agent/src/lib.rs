//! Agent control loop for PromptWeave.
//!
//! Ties the prompt assembler, a generation backend, and a capability
//! registry into the iterate-until-finished loop: assemble → generate →
//! parse → dispatch → fold the result into the conversation log.

pub mod control_loop;
pub mod parser;
pub mod tree;

pub use control_loop::{ControlLoop, FinalState, RunOutcome, TERMINAL_ACTION};
pub use parser::{ParseError, ParsedAction, parse_response};
pub use tree::{CLARIFY_INSTRUCTION, SYSTEM_INSTRUCTION, build_turn_tree, clarify_prompt};
