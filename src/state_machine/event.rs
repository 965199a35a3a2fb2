//! Events that can occur in a conversation

use crate::vocab::START_COMMAND;

/// Inbound events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The chat was opened
    Start,
    /// Any other text the user typed
    Text { text: String },
}

impl Event {
    /// Classify already-trimmed inbound text
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if is_start_command(&text) {
            Event::Start
        } else {
            Event::Text { text }
        }
    }
}

/// `/start`, optionally addressed (`/start@SomeBot`) or with a deep-link
/// payload (`/start abc`)
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split_once('@').map_or(command, |(name, _)| name);
    command == START_COMMAND
}
