//! Parser for the model's structured action output.
//!
//! The model is instructed to answer with labeled lines:
//!
//! ```text
//! Function: Search
//! Input: "rust borrow checker"
//! Reasoning: The user wants background information.
//! ```
//!
//! Only the first occurrence of each label counts; anything else the model
//! emits around them is ignored. A missing `Function:` line is a parse
//! failure — `Input:` and `Reasoning:` are optional.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("no function name found in model output: <<<{output}>>>")]
pub struct ParseError {
    pub output: String,
}

/// One action request extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub name: String,
    pub input: String,
    pub reasoning: String,
}

/// Extract the first `Function:` / `Input:` / `Reasoning:` lines from the
/// model output. Surrounding double quotes on the input value are trimmed
/// (models often quote it).
pub fn parse_response(output: &str) -> Result<ParsedAction, ParseError> {
    let mut name: Option<String> = None;
    let mut input: Option<String> = None;
    let mut reasoning: Option<String> = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Function:") {
            if name.is_none() {
                name = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Input:") {
            if input.is_none() {
                input = Some(rest.trim().trim_matches('"').to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Reasoning:") {
            if reasoning.is_none() {
                reasoning = Some(rest.trim().to_string());
            }
        }
    }

    match name {
        Some(name) if !name.is_empty() => Ok(ParsedAction {
            name,
            input: input.unwrap_or_default(),
            reasoning: reasoning.unwrap_or_default(),
        }),
        _ => Err(ParseError {
            output: output.to_string(),
        }),
    }
}
