//! Fixed vocabulary shared by the conversation flow and the router
//!
//! Categories and audiences are presented as numbered menus; a user picks
//! an entry by typing its 1-based position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Command that starts a new post
pub const POST_COMMAND: &str = "/spill";

/// Command that opens an anonymous reply; takes one message id argument
pub const REPLY_COMMAND: &str = "/reply";

/// Command sent by the platform client when a chat is first opened
pub const START_COMMAND: &str = "/start";

/// Kind of anonymous post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Gossip,
    Suggestion,
    Complaint,
    Appreciation,
}

impl Category {
    /// Menu order
    pub const ALL: [Category; 4] = [
        Category::Gossip,
        Category::Suggestion,
        Category::Complaint,
        Category::Appreciation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Gossip => "Gossip",
            Category::Suggestion => "Suggestion",
            Category::Complaint => "Complaint",
            Category::Appreciation => "Appreciation",
        }
    }

    /// Parse a 1-based menu selection
    pub fn from_selection(text: &str) -> Option<Self> {
        parse_selection(text, &Self::ALL)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who a post is fanned out to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    MyOffice,
    SpecificStore,
    SpecificTeam,
    /// Everyone in the organization
    AllFlexway,
}

impl Audience {
    /// Menu order
    pub const ALL: [Audience; 4] = [
        Audience::MyOffice,
        Audience::SpecificStore,
        Audience::SpecificTeam,
        Audience::AllFlexway,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Audience::MyOffice => "My Office",
            Audience::SpecificStore => "A Specific Store",
            Audience::SpecificTeam => "A Specific Team",
            Audience::AllFlexway => "All Flexway",
        }
    }

    /// Whether the audience spans every verified user rather than the
    /// sender's own group
    pub fn is_organization_wide(self) -> bool {
        matches!(self, Audience::AllFlexway)
    }

    /// Parse a 1-based menu selection
    pub fn from_selection(text: &str) -> Option<Self> {
        parse_selection(text, &Self::ALL)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Only plain ASCII digits count; signs and surrounding text do not.
fn parse_selection<T: Copy>(text: &str, items: &[T]) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = text.parse().ok()?;
    index.checked_sub(1).and_then(|i| items.get(i).copied())
}

/// Render `"1. A\n2. B"` style menus
pub fn numbered_menu<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn is_post_command(text: &str) -> bool {
    text.eq_ignore_ascii_case(POST_COMMAND)
}

pub fn is_reply_command(text: &str) -> bool {
    text.starts_with(REPLY_COMMAND)
}
