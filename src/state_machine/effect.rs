//! Effects produced by state transitions

use crate::router::MessageId;
use crate::vocab::{Audience, Category};

/// Effects to be executed by the dispatcher after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send text back to the user who triggered the event
    Reply { text: String },

    /// Record the user's group in the directory
    Verify { group: String },

    /// Register the post and fan it out
    PublishPost {
        category: Category,
        audience: Audience,
        body: String,
    },

    /// Start a pending anonymous reply
    OpenReplySlot { message_id: MessageId },

    /// Fill the pending reply and route it to the message owner
    DeliverReply { message_id: MessageId, body: String },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
