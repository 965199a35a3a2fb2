//! Dispatcher: drives inbound events through the state machine
//!
//! Each inbound event is handled under one lock covering the conversation
//! states, the directory and the router, so the full transition plus any
//! registry update is atomic. Deliveries run in a background task after the
//! lock is released, with a bounded number of requests in flight.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::directory::{Directory, UserId};
use crate::router::{self, DeliveryReport, MessageRouter};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Requests in flight per fan-out unless configured otherwise
pub const DEFAULT_DELIVERY_LIMIT: usize = 16;

/// Everything the relay remembers, for the lifetime of the process
#[derive(Debug, Default)]
pub struct RelayState {
    conversations: HashMap<UserId, ConvState>,
    directory: Directory,
    router: MessageRouter,
}

impl RelayState {
    pub fn conversation(&self, user: UserId) -> ConvState {
        self.conversations.get(&user).cloned().unwrap_or_default()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Run one event for `user` and return the deliveries it produced
    fn apply(&mut self, user: UserId, event: Event) -> Vec<Outbound> {
        let current = self.conversation(user);
        let result = {
            let context = ConvContext::new(user, &self.router);
            transition(&current, &context, event)
        };

        if result.new_state != current {
            tracing::debug!(
                user = %user,
                from = current.name(),
                to = result.new_state.name(),
                "State transition"
            );
        }
        self.conversations.insert(user, result.new_state);

        let mut outbound = Vec::new();
        for effect in result.effects {
            self.execute(user, effect, &mut outbound);
        }
        outbound
    }

    fn execute(&mut self, user: UserId, effect: Effect, outbound: &mut Vec<Outbound>) {
        match effect {
            Effect::Reply { text } => outbound.push(Outbound::plain(user, text)),

            Effect::Verify { group } => {
                if self.directory.verify(user, group) {
                    tracing::info!(verified_users = self.directory.len(), "User verified");
                }
            }

            Effect::PublishPost {
                category,
                audience,
                body,
            } => {
                let (_, deliveries) =
                    self.router.post(user, category, audience, body, &self.directory);
                outbound.extend(deliveries);
            }

            Effect::OpenReplySlot { message_id } => {
                if let Err(e) = self.router.open_reply_slot(user, message_id) {
                    tracing::warn!(error = %e, "Could not open reply slot");
                }
            }

            Effect::DeliverReply { message_id, body } => {
                match self.router.fill_reply(user, message_id, body) {
                    Ok(delivery) => outbound.push(delivery),
                    Err(e) => tracing::warn!(error = %e, "Could not route reply"),
                }
            }
        }
    }
}

/// Background deliveries of one inbound event. Dropping it leaves the
/// deliveries running.
#[derive(Debug)]
pub struct Delivery(Option<JoinHandle<DeliveryReport>>);

impl Delivery {
    fn none() -> Self {
        Self(None)
    }

    /// Wait until every delivery of the event has succeeded or failed
    pub async fn finished(self) -> DeliveryReport {
        let Some(handle) = self.0 else {
            return DeliveryReport::default();
        };
        handle.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Delivery task failed");
            DeliveryReport::default()
        })
    }
}

/// Entry point for inbound `(user, text)` events
pub struct Dispatcher<C> {
    state: Mutex<RelayState>,
    channel: Arc<C>,
    delivery_limit: usize,
}

impl<C: DeliveryChannel + 'static> Dispatcher<C> {
    pub fn new(channel: C) -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            channel: Arc::new(channel),
            delivery_limit: DEFAULT_DELIVERY_LIMIT,
        }
    }

    /// Cap the requests one fan-out keeps in flight (at least one)
    #[must_use]
    pub fn with_delivery_limit(mut self, limit: usize) -> Self {
        self.delivery_limit = limit.max(1);
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Handle one inbound text. Blank text is dropped.
    ///
    /// Returns once the state change is committed; the deliveries it
    /// produced continue in the background.
    pub async fn handle_inbound(&self, user: UserId, text: &str) -> Delivery {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(user = %user, "Ignoring blank message");
            return Delivery::none();
        }

        let outbound = {
            let mut state = self.state.lock().await;
            state.apply(user, Event::from_text(text))
        };
        if outbound.is_empty() {
            return Delivery::none();
        }

        let channel = Arc::clone(&self.channel);
        let limit = self.delivery_limit;
        Delivery(Some(tokio::spawn(async move {
            let report = router::fan_out(&*channel, &outbound, limit).await;
            if report.failed > 0 {
                tracing::warn!(
                    delivered = report.delivered,
                    failed = report.failed,
                    "Some deliveries failed"
                );
            } else {
                tracing::debug!(delivered = report.delivered, "Deliveries finished");
            }
            report
        })))
    }

    /// Read the relay state under the lock
    pub async fn inspect<R>(&self, f: impl FnOnce(&RelayState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    pub async fn conversation(&self, user: UserId) -> ConvState {
        self.inspect(|s| s.conversation(user)).await
    }
}
