//! Trait abstractions for outbound delivery
//!
//! The dispatcher only ever hands text to a `DeliveryChannel`, which lets
//! tests swap the chat platform for a recording mock.

use crate::directory::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Formatting hint passed along with outbound text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Markdown,
}

impl TextFormat {
    pub fn parse_mode(self) -> &'static str {
        match self {
            TextFormat::Markdown => "Markdown",
        }
    }
}

/// One message to send to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub recipient: UserId,
    pub text: String,
    pub format: Option<TextFormat>,
}

impl Outbound {
    pub fn plain(recipient: UserId, text: impl Into<String>) -> Self {
        Self {
            recipient,
            text: text.into(),
            format: None,
        }
    }

    pub fn markdown(recipient: UserId, text: impl Into<String>) -> Self {
        Self {
            recipient,
            text: text.into(),
            format: Some(TextFormat::Markdown),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Delivery rejected ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Channel that delivers text to a recipient
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: DeliveryChannel + ?Sized> DeliveryChannel for Arc<T> {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), DeliveryError> {
        (**self).deliver(outbound).await
    }
}
