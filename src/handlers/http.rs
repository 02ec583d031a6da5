//! HTTP handlers for the plugin API: config, subscription CRUD, Confluence webhooks, health.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::PluginUser;
use crate::models::{ChannelSubscription, PluginConfigResponse, StatusResponse, WebhookEvent};
use crate::services::{NotificationService, SubscriptionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub subscription_service: SubscriptionService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn subscription_service(&self) -> &SubscriptionService {
        &self.subscription_service
    }

    pub fn notification_service(&self) -> &NotificationService {
        &self.notification_service
    }
}

#[derive(Debug, Deserialize)]
pub struct AliasQuery {
    #[serde(default)]
    pub alias: String,
}

/// GET /api/v1/config: event catalog for the connected server version.
pub async fn get_plugin_config(
    State(state): State<AppState>,
    _user: PluginUser,
) -> Json<PluginConfigResponse> {
    Json(state.subscription_service().plugin_config())
}

/// POST /api/v1/:channel_id/subscription/:subscription_type
pub async fn save_subscription(
    State(state): State<AppState>,
    PluginUser(user_id): PluginUser,
    Path((channel_id, subscription_type)): Path<(String, String)>,
    Json(body): Json<ChannelSubscription>,
) -> Result<Json<StatusResponse>, AppError> {
    tracing::debug!(user_id = %user_id, channel_id = %channel_id, "save subscription request");
    state
        .subscription_service()
        .save(&subscription_type, &channel_id, body)
        .await?;
    Ok(Json(StatusResponse::ok()))
}

/// PUT /api/v1/:channel_id/subscription/:subscription_type
pub async fn edit_subscription(
    State(state): State<AppState>,
    PluginUser(user_id): PluginUser,
    Path((channel_id, subscription_type)): Path<(String, String)>,
    Json(body): Json<ChannelSubscription>,
) -> Result<Json<StatusResponse>, AppError> {
    tracing::debug!(user_id = %user_id, channel_id = %channel_id, "edit subscription request");
    state
        .subscription_service()
        .edit(&subscription_type, &channel_id, body)
        .await?;
    Ok(Json(StatusResponse::ok()))
}

/// GET /api/v1/:channel_id/subscription?alias=
pub async fn get_subscription(
    State(state): State<AppState>,
    _user: PluginUser,
    Path(channel_id): Path<String>,
    Query(query): Query<AliasQuery>,
) -> Result<Json<ChannelSubscription>, AppError> {
    let subscription = state
        .subscription_service()
        .get(&channel_id, &query.alias)
        .await?;
    Ok(Json(subscription))
}

/// DELETE /api/v1/:channel_id/subscription?alias=
pub async fn delete_subscription(
    State(state): State<AppState>,
    _user: PluginUser,
    Path(channel_id): Path<String>,
    Query(query): Query<AliasQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    state
        .subscription_service()
        .delete(&channel_id, &query.alias)
        .await?;
    Ok(Json(StatusResponse::ok()))
}

/// GET /api/v1/:channel_id/subscriptions: aliases, for autocomplete.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    _user: PluginUser,
    Path(channel_id): Path<String>,
) -> Json<Vec<String>> {
    Json(state.subscription_service().list_aliases(&channel_id).await)
}

#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    #[serde(default)]
    pub secret: String,
}

/// POST /api/v1/server/webhook?secret=: Confluence event, fanned out to subscribed channels.
/// The secret is checked before the body is parsed.
pub async fn confluence_webhook(
    State(state): State<AppState>,
    Query(query): Query<SecretQuery>,
    body: Bytes,
) -> Result<Json<StatusResponse>, AppError> {
    let notifications = state.notification_service();
    notifications.verify_secret(&query.secret)?;
    let event: WebhookEvent = serde_json::from_slice(&body)?;
    tracing::info!(event = %event.event, "received confluence event");
    notifications.notify(event).await?;
    Ok(Json(StatusResponse::ok()))
}

/// GET /health: liveness check.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "confluence-subs" })),
    )
}
