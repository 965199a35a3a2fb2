//! Mock implementations for testing
//!
//! These mocks let the dispatcher and router run without a chat platform.

use super::traits::*;
use crate::directory::UserId;
use crate::router::MessageId;
use crate::state_machine::ReplyLookup;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

// ============================================================================
// Recording Delivery Channel
// ============================================================================

/// Delivery channel that records every successful delivery and fails for
/// configured recipients
#[derive(Default)]
pub struct RecordingChannel {
    delivered: Mutex<Vec<Outbound>>,
    failing: HashSet<UserId>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery to `user` fail
    pub fn failing_for(mut self, user: UserId) -> Self {
        self.failing.insert(user);
        self
    }

    pub fn delivered(&self) -> Vec<Outbound> {
        self.delivered.lock().unwrap().clone()
    }

    /// Texts delivered to one recipient, in order
    pub fn texts_for(&self, user: UserId) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.recipient == user)
            .map(|d| d.text.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.delivered.lock().unwrap().clear();
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), DeliveryError> {
        if self.failing.contains(&outbound.recipient) {
            return Err(DeliveryError::Rejected {
                status: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.delivered.lock().unwrap().push(outbound.clone());
        Ok(())
    }
}

// ============================================================================
// Gated Delivery Channel
// ============================================================================

/// Delivery channel that holds every delivery until the test releases it,
/// tracking how many are in flight at once
pub struct GatedChannel {
    gate: Semaphore,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delivered: AtomicUsize,
}

impl GatedChannel {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
        }
    }

    /// Let `n` more deliveries through
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryChannel for GatedChannel {
    async fn deliver(&self, _outbound: &Outbound) -> Result<(), DeliveryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        self.gate.acquire().await.unwrap().forget();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Static Reply Lookup
// ============================================================================

/// Fixed registry view for exercising transitions in isolation
#[derive(Default)]
pub struct StaticLookup {
    messages: HashSet<MessageId>,
    pending: HashMap<UserId, MessageId>,
}

impl StaticLookup {
    pub fn with_messages(ids: &[&str]) -> Self {
        Self {
            messages: ids.iter().map(|id| id.parse().unwrap()).collect(),
            pending: HashMap::new(),
        }
    }

    pub fn pending(mut self, user: UserId, id: &str) -> Self {
        self.pending.insert(user, id.parse().unwrap());
        self
    }
}

impl ReplyLookup for StaticLookup {
    fn message_exists(&self, id: MessageId) -> bool {
        self.messages.contains(&id)
    }

    fn pending_reply(&self, user: UserId) -> Option<MessageId> {
        self.pending.get(&user).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_channel() {
        let channel = RecordingChannel::new().failing_for(UserId(2));

        channel.deliver(&Outbound::plain(UserId(1), "hi")).await.unwrap();
        assert!(channel.deliver(&Outbound::plain(UserId(2), "hi")).await.is_err());

        assert_eq!(channel.texts_for(UserId(1)), vec!["hi".to_string()]);
        assert!(channel.texts_for(UserId(2)).is_empty());

        channel.clear();
        assert!(channel.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_gated_channel_holds_until_released() {
        let channel = GatedChannel::new();
        channel.release(1);
        channel.deliver(&Outbound::plain(UserId(1), "hi")).await.unwrap();

        assert_eq!(channel.delivered(), 1);
        assert_eq!(channel.in_flight(), 0);
        assert_eq!(channel.peak(), 1);
    }
}
