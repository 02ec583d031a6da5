//! Outbound HTTP: the plugin API client forms submit through, and notification posts.

pub mod http;
pub mod posts;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ChannelSubscription, PluginConfigResponse, StatusResponse};

pub use http::HttpPluginApi;
pub use posts::{HttpPostSender, LogPostSender, PostSender};

/// Single-shot calls against the plugin backend. Failures are returned as-is; nothing retries.
#[async_trait]
pub trait PluginApi: Send + Sync {
    /// `GET /config`: event catalog for the connected server.
    async fn fetch_config(&self) -> AppResult<PluginConfigResponse>;

    /// `POST /{channelID}/subscription/{subscriptionType}`.
    async fn save_subscription(&self, subscription: &ChannelSubscription)
        -> AppResult<StatusResponse>;

    /// `PUT /{channelID}/subscription/{subscriptionType}`.
    async fn edit_subscription(&self, subscription: &ChannelSubscription)
        -> AppResult<StatusResponse>;

    /// `GET /{channelID}/subscription?alias=…`.
    async fn get_subscription(&self, channel_id: &str, alias: &str)
        -> AppResult<ChannelSubscription>;

    /// `DELETE /{channelID}/subscription?alias=…`.
    async fn delete_subscription(&self, channel_id: &str, alias: &str)
        -> AppResult<StatusResponse>;
}
