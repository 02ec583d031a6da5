//! `reqwest`-backed [`PluginApi`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::PluginApi;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{ChannelSubscription, PluginConfigResponse, StatusResponse};

pub const HEADER_REQUESTED_WITH: &str = "X-Requested-With";
pub const HEADER_CSRF_TOKEN: &str = "X-CSRF-Token";
pub const HEADER_USER_ID: &str = "Mattermost-User-Id";

/// HTTP client for the plugin API rooted at `api_url` (e.g. `https://chat.example.com/plugins/confluence/api/v1`).
#[derive(Debug, Clone)]
pub struct HttpPluginApi {
    api_url: String,
    http: reqwest::Client,
    csrf_token: Option<String>,
    user_id: Option<String>,
}

impl HttpPluginApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            csrf_token: None,
            user_id: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.plugin_api_url.clone())
    }

    /// Token sent as `X-CSRF-Token` on POST/PUT/DELETE.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Identity sent as `Mattermost-User-Id` on every request.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn subscription_url(&self, subscription: &ChannelSubscription) -> String {
        format!(
            "{}/{}/subscription/{}",
            self.api_url, subscription.channel_id, subscription.subscription_type
        )
    }

    fn lookup_url(&self, channel_id: &str) -> String {
        format!("{}/{}/subscription", self.api_url, channel_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mutating = method != Method::GET;
        let mut req = self
            .http
            .request(method, url)
            .header(HEADER_REQUESTED_WITH, "XMLHttpRequest")
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(user_id) = &self.user_id {
            req = req.header(HEADER_USER_ID, user_id.as_str());
        }
        if mutating {
            if let Some(token) = &self.csrf_token {
                req = req.header(HEADER_CSRF_TOKEN, token.as_str());
            }
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> AppResult<T> {
        let response = req.send().await?;
        read_response(response).await
    }
}

pub(crate) async fn read_response<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(status = status.as_u16(), error = %message, "request failed");
        return Err(AppError::Transport {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// `{"error": "..."}` bodies yield the message; plain-text bodies are returned trimmed.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl PluginApi for HttpPluginApi {
    async fn fetch_config(&self) -> AppResult<PluginConfigResponse> {
        let url = format!("{}/config", self.api_url);
        self.send(self.request(Method::GET, &url)).await
    }

    async fn save_subscription(
        &self,
        subscription: &ChannelSubscription,
    ) -> AppResult<StatusResponse> {
        let url = self.subscription_url(subscription);
        debug!(channel_id = %subscription.channel_id, alias = %subscription.alias, "saving subscription");
        self.send(self.request(Method::POST, &url).json(subscription))
            .await
    }

    async fn edit_subscription(
        &self,
        subscription: &ChannelSubscription,
    ) -> AppResult<StatusResponse> {
        let url = self.subscription_url(subscription);
        debug!(channel_id = %subscription.channel_id, alias = %subscription.alias, "editing subscription");
        self.send(self.request(Method::PUT, &url).json(subscription))
            .await
    }

    async fn get_subscription(
        &self,
        channel_id: &str,
        alias: &str,
    ) -> AppResult<ChannelSubscription> {
        let url = self.lookup_url(channel_id);
        self.send(self.request(Method::GET, &url).query(&[("alias", alias)]))
            .await
    }

    async fn delete_subscription(
        &self,
        channel_id: &str,
        alias: &str,
    ) -> AppResult<StatusResponse> {
        let url = self.lookup_url(channel_id);
        self.send(self.request(Method::DELETE, &url).query(&[("alias", alias)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionType;

    #[test]
    fn subscription_url_uses_channel_and_wire_type() {
        let api = HttpPluginApi::new("http://localhost:8065/plugins/confluence/api/v1/");
        let sub = ChannelSubscription {
            old_alias: None,
            alias: "Abc".into(),
            base_url: "https://test.com".into(),
            space_key: String::new(),
            events: vec![],
            channel_id: "abcabcabcabcabc".into(),
            page_id: "1234".into(),
            subscription_type: SubscriptionType::Page,
        };
        assert_eq!(
            api.subscription_url(&sub),
            "http://localhost:8065/plugins/confluence/api/v1/abcabcabcabcabc/subscription/page_subscription"
        );
    }

    #[test]
    fn from_config_uses_plugin_api_url() {
        let config = Config {
            plugin_api_url: "https://chat.example.com/plugins/confluence/api/v1".into(),
            ..Config::default()
        };
        let api = HttpPluginApi::from_config(&config).with_user_id("admin");
        assert_eq!(
            api.api_url(),
            "https://chat.example.com/plugins/confluence/api/v1"
        );
        assert_eq!(
            api.lookup_url("chan"),
            "https://chat.example.com/plugins/confluence/api/v1/chan/subscription"
        );
    }

    #[test]
    fn error_message_from_json_or_text() {
        assert_eq!(extract_error_message(r#"{"error":"boom"}"#), "boom");
        assert_eq!(
            extract_error_message("Invalid subscription type\n"),
            "Invalid subscription type"
        );
    }
}
