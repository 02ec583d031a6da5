//! Outbound notification posts to chat channels.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use super::http::read_response;
use crate::config::Config;
use crate::error::AppResult;

/// Delivers one rendered notification into one channel.
#[async_trait]
pub trait PostSender: Send + Sync {
    async fn create_post(&self, channel_id: &str, message: &str) -> AppResult<()>;
}

/// Creates posts through the chat server's REST API as the bot user.
#[derive(Debug, Clone)]
pub struct HttpPostSender {
    http: reqwest::Client,
    site_url: String,
    bot_token: String,
}

impl HttpPostSender {
    pub fn new(site_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        let site_url: String = site_url.into();
        Self {
            http: reqwest::Client::new(),
            site_url: site_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    /// `None` unless both the site URL and the bot token are configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.mattermost_url, &config.bot_token) {
            (Some(url), Some(token)) => Some(Self::new(url.clone(), token.clone())),
            _ => None,
        }
    }

    fn posts_url(&self) -> String {
        format!("{}/api/v4/posts", self.site_url)
    }
}

#[async_trait]
impl PostSender for HttpPostSender {
    async fn create_post(&self, channel_id: &str, message: &str) -> AppResult<()> {
        debug!(channel_id = %channel_id, "creating notification post");
        let response = self
            .http
            .post(self.posts_url())
            .bearer_auth(&self.bot_token)
            .json(&json!({ "channel_id": channel_id, "message": message }))
            .send()
            .await?;
        read_response::<serde_json::Value>(response).await?;
        Ok(())
    }
}

/// Writes notifications to the log instead of a chat server.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPostSender;

#[async_trait]
impl PostSender for LogPostSender {
    async fn create_post(&self, channel_id: &str, message: &str) -> AppResult<()> {
        info!(channel_id = %channel_id, message = %message, "notification");
        Ok(())
    }
}
