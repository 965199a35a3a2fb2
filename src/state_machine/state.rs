//! Conversation state types

use crate::directory::UserId;
use crate::router::MessageId;
use crate::vocab::{Audience, Category};
use serde::{Deserialize, Serialize};

/// Where a user is in the posting flow
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Never seen; the next text becomes the user's group
    #[default]
    Unverified,

    /// Verified, nothing in progress
    Idle,

    /// Category menu shown
    AwaitingCategory,

    /// Audience menu shown
    AwaitingAudience { category: Category },

    /// Waiting for the post body
    AwaitingBody {
        category: Category,
        audience: Audience,
    },
}

impl ConvState {
    pub fn is_verified(&self) -> bool {
        !matches!(self, ConvState::Unverified)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Unverified => "unverified",
            ConvState::Idle => "idle",
            ConvState::AwaitingCategory => "awaiting_category",
            ConvState::AwaitingAudience { .. } => "awaiting_audience",
            ConvState::AwaitingBody { .. } => "awaiting_body",
        }
    }
}

/// Read-only view of the message registry needed by transitions
pub trait ReplyLookup {
    fn message_exists(&self, id: MessageId) -> bool;

    /// Message the user has an unfinished reply on, if any
    fn pending_reply(&self, user: UserId) -> Option<MessageId>;
}

/// Context for one transition
pub struct ConvContext<'a> {
    pub user: UserId,
    lookup: &'a dyn ReplyLookup,
}

impl<'a> ConvContext<'a> {
    pub fn new(user: UserId, lookup: &'a dyn ReplyLookup) -> Self {
        Self { user, lookup }
    }

    pub fn message_exists(&self, id: MessageId) -> bool {
        self.lookup.message_exists(id)
    }

    pub fn pending_reply(&self) -> Option<MessageId> {
        self.lookup.pending_reply(self.user)
    }
}
