//! Turn-prompt tree construction.
//!
//! Each loop iteration rebuilds the prompt tree from the current
//! conversation state. Priorities put the system instruction first, then
//! memories, then the capability catalog, then the user turn; the tree
//! nesting itself is organizational (grouping nodes carry no text).
//!
//! The chat markers (`<|system|>`, `<|user|>`, `<|assistant|>`) match the
//! Zephyr template, since the Ollama backend sends the prompt raw.

use promptweave_prompt::ContentNode;

/// Fixed system instruction, including the structured output format the
/// parser expects.
pub const SYSTEM_INSTRUCTION: &str = "<|system|>You are an AI Assistant.\n\
This is a friendly conversation between Human and AI.\n\
Your primary role is to answer questions and provide assistance.\n\
Output should only include one function as the next step using the format:\n\
Function: name of the function\n\
Input: Function Input as text\n\
Reasoning: Reason to choose the Function and Input\n";

/// Instruction used for the one-shot intent clarification call.
pub const CLARIFY_INSTRUCTION: &str = "Analyze the user's original intent and \
reformulate it into a well-structured, single-paragraph input. This input \
should clearly outline the task requirements and specify the criteria for \
successful completion by an AI system, based on the following provided text:";

/// Build the prompt sent to the clarification call.
pub fn clarify_prompt(input: &str) -> String {
    format!("<|system|>{CLARIFY_INSTRUCTION}</s><|user|>{input}</s><|assistant|>")
}

/// Build the prompt tree for one loop iteration.
///
/// `history` is the rendered conversation log and `catalog` the rendered
/// capability catalog; both are captured by the tree's generators. The
/// working user input flows in at assembly time.
pub fn build_turn_tree(history: String, catalog: String) -> ContentNode {
    ContentNode::group(
        "root",
        0,
        vec![
            ContentNode::leaf("system", 1, |_, _| Ok(SYSTEM_INSTRUCTION.to_string())),
            ContentNode::group(
                "memories",
                2,
                vec![
                    // Long-term memory slot. Empty until a retrieval store is
                    // wired in; kept in the tree so its budget position is
                    // already settled.
                    ContentNode::group(
                        "ltm_optional",
                        1,
                        vec![ContentNode::leaf("ltm", 1, |_, _| Ok(String::new()))],
                    ),
                    ContentNode::leaf("stm", 2, move |_, _| {
                        Ok(format!("Conversation:\n{history}\n"))
                    }),
                ],
            ),
            ContentNode::group(
                "functions_optional",
                3,
                vec![ContentNode::leaf("functions", 1, move |_, _| {
                    Ok(catalog.clone())
                })],
            ),
            ContentNode::leaf("asking", 4, |input, _| {
                Ok(format!("</s><|user|>{input}\n</s><|assistant|>"))
            }),
        ],
    )
}
