//! FlexTea relay server
//!
//! Receives chat platform webhooks and relays anonymous posts and replies.

use flextea::api::{create_router, AppState};
use flextea::config::Config;
use flextea::runtime::DeliveryChannel;
use flextea::telegram::TelegramClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flextea=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;
    let telegram = Arc::new(TelegramClient::new(&config)?);

    match &config.webhook_url {
        Some(url) => match telegram.set_webhook(url).await {
            Ok(()) => tracing::info!("Webhook registered"),
            Err(e) => tracing::warn!(error = %e, "Failed to register webhook"),
        },
        None => tracing::warn!("WEBHOOK_URL not set; assuming the webhook is already registered"),
    }

    let channel: Arc<dyn DeliveryChannel> = telegram;
    let state = AppState::new(
        channel,
        config.bot_token.as_str(),
        config.delivery_concurrency,
    );
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("FlexTea relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
