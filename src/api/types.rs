//! Webhook payload and response types

use crate::directory::UserId;
use serde::{Deserialize, Serialize};

/// Incoming platform update. Only plain new messages are handled; edits,
/// callbacks and the like deserialize with `message: None`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub from: Option<Sender>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// The `(user, text)` pair to dispatch, if this update carries one
    pub fn text_event(&self) -> Option<(UserId, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        let user = message.from.as_ref().map_or(message.chat.id, |s| s.id);
        Some((UserId(user), text))
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
