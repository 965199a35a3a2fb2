//! Telegram Bot API delivery channel

use crate::config::Config;
use crate::runtime::{DeliveryChannel, DeliveryError, Outbound, TextFormat};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl<'a> From<&'a Outbound> for SendMessageRequest<'a> {
    fn from(outbound: &'a Outbound) -> Self {
        Self {
            chat_id: outbound.recipient.0,
            text: &outbound.text,
            parse_mode: outbound.format.map(TextFormat::parse_mode),
        }
    }
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: config.bot_token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<(), DeliveryError> {
        let response = self.client.post(self.method_url(method)).json(body).send().await?;
        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            other => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }

    /// Point the platform at our webhook endpoint
    pub async fn set_webhook(&self, url: &str) -> Result<(), DeliveryError> {
        self.call("setWebhook", &SetWebhookRequest { url }).await
    }
}

#[async_trait]
impl DeliveryChannel for TelegramClient {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), DeliveryError> {
        self.call("sendMessage", &SendMessageRequest::from(outbound)).await
    }
}
