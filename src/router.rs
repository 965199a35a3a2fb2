//! Anonymous message registry and reply correlation
//!
//! Posted messages keep their owner internally so replies can be routed
//! back, but no outbound text built here ever contains it.

use crate::directory::{Directory, UserId};
use crate::runtime::{DeliveryChannel, Outbound};
use crate::state_machine::ReplyLookup;
use crate::vocab::{Audience, Category, REPLY_COMMAND};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sequential message identifier, rendered as `MSG<n>` starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSG{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a message id: {0}")]
pub struct ParseMessageIdError(String);

impl FromStr for MessageId {
    type Err = ParseMessageIdError;

    /// Only the canonical form is accepted, so `MSG01` and `MSG0` fail.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMessageIdError(s.to_string());
        let digits = s.strip_prefix("MSG").ok_or_else(err)?;
        let canonical = !digits.is_empty()
            && !digits.starts_with('0')
            && digits.bytes().all(|b| b.is_ascii_digit());
        if !canonical {
            return Err(err());
        }
        digits.parse().map(MessageId).map_err(|_| err())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),
    #[error("No pending reply on {message_id}")]
    NoPendingReply { message_id: MessageId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Pending,
    Filled(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyEntry {
    pub from: UserId,
    pub body: ReplyBody,
}

/// One anonymous post
#[derive(Debug, Clone)]
pub struct PostedMessage {
    id: MessageId,
    owner: UserId,
    category: Category,
    audience: Audience,
    body: String,
    created_at: DateTime<Utc>,
    replies: Vec<ReplyEntry>,
}

impl PostedMessage {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn replies(&self) -> &[ReplyEntry] {
        &self.replies
    }

    /// Used for delivery addressing only
    pub(crate) fn owner(&self) -> UserId {
        self.owner
    }

    fn fan_out_text(&self) -> String {
        format!(
            "🍵 *{}* #{}\n{}\n\nReply anonymously? Type: {REPLY_COMMAND} {}",
            self.category, self.id, self.body, self.id
        )
    }
}

/// Counts from one batch of deliveries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

#[derive(Debug, Default)]
pub struct MessageRouter {
    /// Index `n - 1` holds `MSG<n>`
    messages: Vec<PostedMessage>,
    /// Message each user is currently writing a reply to
    pending: HashMap<UserId, MessageId>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&PostedMessage> {
        let index = usize::try_from(id.0.checked_sub(1)?).ok()?;
        self.messages.get(index)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.get(id).is_some()
    }

    pub fn pending_reply(&self, user: UserId) -> Option<MessageId> {
        self.pending.get(&user).copied()
    }

    /// Register a post and build one delivery per resolved recipient
    pub fn post(
        &mut self,
        sender: UserId,
        category: Category,
        audience: Audience,
        body: impl Into<String>,
        directory: &Directory,
    ) -> (MessageId, Vec<Outbound>) {
        let id = MessageId(self.messages.len() as u64 + 1);
        let message = PostedMessage {
            id,
            owner: sender,
            category,
            audience,
            body: body.into(),
            created_at: Utc::now(),
            replies: Vec::new(),
        };

        let text = message.fan_out_text();
        let deliveries = resolve_recipients(sender, audience, directory)
            .into_iter()
            .map(|recipient| Outbound::markdown(recipient, text.clone()))
            .collect::<Vec<_>>();

        tracing::info!(
            message_id = %id,
            created_at = %message.created_at,
            category = %category,
            audience = %audience,
            recipients = deliveries.len(),
            "Message posted"
        );

        self.messages.push(message);
        (id, deliveries)
    }

    /// Start a pending reply from `user` on `id`. A reply the user left
    /// unfinished elsewhere is dropped.
    pub fn open_reply_slot(&mut self, user: UserId, id: MessageId) -> Result<(), RouterError> {
        let index = self.index_of(id)?;

        if let Some(previous) = self.pending.insert(user, id) {
            if let Ok(prev_index) = self.index_of(previous) {
                let replies = &mut self.messages[prev_index].replies;
                if let Some(pos) = replies
                    .iter()
                    .rposition(|r| r.from == user && r.body == ReplyBody::Pending)
                {
                    replies.remove(pos);
                }
            }
            tracing::debug!(message_id = %previous, "Dropped unfinished reply");
        }

        self.messages[index].replies.push(ReplyEntry {
            from: user,
            body: ReplyBody::Pending,
        });
        Ok(())
    }

    /// Fill the pending reply and build the delivery to the hidden owner
    pub fn fill_reply(
        &mut self,
        user: UserId,
        id: MessageId,
        text: impl Into<String>,
    ) -> Result<Outbound, RouterError> {
        if self.pending.get(&user) != Some(&id) {
            return Err(RouterError::NoPendingReply { message_id: id });
        }
        let index = self.index_of(id)?;
        let message = &mut self.messages[index];
        let owner = message.owner;
        let entry = message
            .replies
            .iter_mut()
            .find(|r| r.from == user && r.body == ReplyBody::Pending)
            .ok_or(RouterError::NoPendingReply { message_id: id })?;

        let text = text.into();
        let outbound = Outbound::plain(owner, format!("💌 Anonymous reply to #{id}:\n{text}"));
        entry.body = ReplyBody::Filled(text);
        self.pending.remove(&user);

        tracing::info!(message_id = %id, "Reply routed");
        Ok(outbound)
    }

    fn index_of(&self, id: MessageId) -> Result<usize, RouterError> {
        id.0.checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|i| *i < self.messages.len())
            .ok_or(RouterError::UnknownMessage(id))
    }
}

impl ReplyLookup for MessageRouter {
    fn message_exists(&self, id: MessageId) -> bool {
        self.contains(id)
    }

    fn pending_reply(&self, user: UserId) -> Option<MessageId> {
        MessageRouter::pending_reply(self, user)
    }
}

/// Organization-wide audiences reach every verified user; any other
/// audience reaches the sender's own group. The sender is always excluded.
pub fn resolve_recipients(
    sender: UserId,
    audience: Audience,
    directory: &Directory,
) -> Vec<UserId> {
    let sender_group = directory.group_of(sender);
    directory
        .members()
        .filter(|(id, _)| *id != sender)
        .filter(|(_, group)| audience.is_organization_wide() || Some(*group) == sender_group)
        .map(|(id, _)| id)
        .collect()
}

/// Deliver every message with at most `limit` requests in flight.
/// Failures are logged and counted, never retried or surfaced to the sender.
pub async fn fan_out<C: DeliveryChannel + ?Sized>(
    channel: &C,
    deliveries: &[Outbound],
    limit: usize,
) -> DeliveryReport {
    let pending: Vec<_> = deliveries
        .iter()
        .map(|outbound| {
            let recipient = outbound.recipient;
            channel.deliver(outbound).map(move |result| (recipient, result))
        })
        .collect();
    let mut results = stream::iter(pending).buffer_unordered(limit.max(1));

    let mut report = DeliveryReport::default();
    while let Some((recipient, result)) = results.next().await {
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(recipient = %recipient, error = %e, "Delivery failed");
            }
        }
    }
    report
}
