//! Confluence channel subscriptions.
//!
//! The core is a pure draft engine that turns edited subscription and credential forms into
//! normalized, validated request payloads. Around it sit form sessions, an HTTP client for the
//! plugin API, and a reference axum backend that serves the same API and turns Confluence
//! webhooks into channel posts.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use client::{HttpPluginApi, HttpPostSender, LogPostSender, PluginApi, PostSender};
pub use config::Config;
pub use error::AppError;
pub use forms::{CredentialForm, SubmitOutcome, SubscriptionForm};
pub use handlers::http::AppState;
pub use services::{NotificationService, SubscriptionService};

use axum::routing::get;
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (plugin API and webhook under `/api/v1`, health). Used by main and by
/// integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let api_routes = axum::Router::new()
        .route("/config", get(http::get_plugin_config))
        .route(
            "/:channel_id/subscription",
            get(http::get_subscription).delete(http::delete_subscription),
        )
        .route(
            "/:channel_id/subscription/:subscription_type",
            axum::routing::post(http::save_subscription).put(http::edit_subscription),
        )
        .route("/:channel_id/subscriptions", get(http::list_subscriptions))
        .route("/server/webhook", axum::routing::post(http::confluence_webhook));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
