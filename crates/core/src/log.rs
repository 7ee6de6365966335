//! Conversation log — the append-only record of one agent run.
//!
//! Every turn of the control loop folds its inputs and outputs into the log:
//! the human's request, the results of dispatched actions, and the final AI
//! answer. Entries are immutable once appended; the log only ever grows.
//! The rendered form feeds back into the next iteration's prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The raw request from the human.
    HumanInput,
    /// The agent's final answer for a run.
    AiOutput,
    /// The text returned by one dispatched action.
    ActionResult,
}

/// A single immutable entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// What produced this entry.
    pub kind: EntryKind,

    /// Who sent it ("Human", "AI", "System").
    pub sender: String,

    /// For action results, the name of the action that produced the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,

    /// The text content.
    pub content: String,

    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// An append-only ordered sequence of conversation entries.
///
/// There is deliberately no API to edit or remove an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a human input entry.
    pub fn push_human(&mut self, content: impl Into<String>) {
        self.push(EntryKind::HumanInput, "Human", None, content.into());
    }

    /// Append a final AI output entry.
    pub fn push_ai(&mut self, content: impl Into<String>) {
        self.push(EntryKind::AiOutput, "AI", None, content.into());
    }

    /// Append an action result entry, optionally tagged with the action name.
    pub fn push_action_result(&mut self, action_name: Option<&str>, content: impl Into<String>) {
        self.push(
            EntryKind::ActionResult,
            "System",
            action_name.map(str::to_string),
            content.into(),
        );
    }

    fn push(
        &mut self,
        kind: EntryKind,
        sender: &str,
        action_name: Option<String>,
        content: String,
    ) {
        self.entries.push(ConversationEntry {
            kind,
            sender: sender.to_string(),
            action_name,
            content,
            timestamp: Utc::now(),
        });
    }

    /// The entries in append order.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the whole log as prompt text, one line per entry:
    /// `Sender: content` or `Sender: [action] content` for action results.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.sender);
            out.push_str(": ");
            if let Some(action) = &entry.action_name {
                out.push('[');
                out.push_str(action);
                out.push_str("] ");
            }
            out.push_str(&entry.content);
            out.push('\n');
        }
        out
    }
}
