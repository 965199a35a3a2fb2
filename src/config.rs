//! Process configuration from the environment

use crate::runtime::DEFAULT_DELIVERY_LIMIT;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token; also the secret path segment of the webhook
    pub bot_token: String,
    /// Public URL registered with the platform on startup
    pub webhook_url: Option<String>,
    pub port: u16,
    pub api_base: String,
    /// Requests one fan-out keeps in flight
    pub delivery_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let delivery_concurrency = match lookup("DELIVERY_CONCURRENCY") {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DELIVERY_CONCURRENCY",
                        value,
                    })
                }
            },
            None => DEFAULT_DELIVERY_LIMIT,
        };

        Ok(Self {
            bot_token,
            webhook_url: lookup("WEBHOOK_URL").filter(|u| !u.is_empty()),
            port,
            api_base: lookup("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            delivery_concurrency,
        })
    }
}
