//! Entry point: load config, wire dependencies, and run the plugin API server.

use std::sync::Arc;

use confluence_subs::config::Config;
use confluence_subs::repositories::SubscriptionRepository;
use confluence_subs::services::{NotificationService, SubscriptionService};
use confluence_subs::{
    create_app, AppError, AppState, HttpPostSender, LogPostSender, PostSender,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(AppError::from)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let sender: Arc<dyn PostSender> = match HttpPostSender::from_config(&config) {
        Some(sender) => Arc::new(sender),
        None => {
            tracing::warn!(
                "MATTERMOST_SITE_URL or MATTERMOST_BOT_TOKEN unset, notifications are only logged"
            );
            Arc::new(LogPostSender)
        }
    };
    if config.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET unset, Confluence webhooks will be refused");
    }

    let repo = SubscriptionRepository::new();
    let subscription_service = SubscriptionService::new(repo.clone(), config.server_version_v9);
    let notification_service =
        NotificationService::new(repo, sender, config.webhook_secret.clone());
    let state = AppState {
        subscription_service,
        notification_service,
    };

    let app = create_app(state);

    tracing::info!(
        addr = %config.server_addr,
        server_version_v9 = config.server_version_v9,
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
