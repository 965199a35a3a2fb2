//! HTTP surface: webhook intake and liveness

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::runtime::{DeliveryChannel, Dispatcher};
use std::sync::Arc;

pub type SharedDispatcher = Arc<Dispatcher<Arc<dyn DeliveryChannel>>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: SharedDispatcher,
    /// Secret path segment the platform must call us with
    pub webhook_token: Arc<str>,
}

impl AppState {
    pub fn new(
        channel: Arc<dyn DeliveryChannel>,
        webhook_token: impl Into<Arc<str>>,
        delivery_limit: usize,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(channel).with_delivery_limit(delivery_limit)),
            webhook_token: webhook_token.into(),
        }
    }
}
