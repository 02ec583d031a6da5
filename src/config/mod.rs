//! Application configuration loaded from environment.

use std::net::SocketAddr;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// Whether the connected Confluence Server is v9 or newer; selects the event catalog.
    pub server_version_v9: bool,
    /// Base URL of the plugin API used by the client (e.g. `http://localhost:8065/plugins/confluence/api/v1`).
    pub plugin_api_url: String,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Shared secret Confluence appends as `?secret=` to webhook calls. Webhooks are refused
    /// while unset.
    pub webhook_secret: Option<String>,
    /// Chat server that receives notification posts (e.g. `https://chat.example.com`).
    pub mattermost_url: Option<String>,
    /// Bot access token used to create notification posts.
    pub bot_token: Option<String>,
}

const DEFAULT_PLUGIN_API_URL: &str = "http://localhost:8065/plugins/confluence/api/v1";
const WEBHOOK_SECRET_LEN: usize = 32;

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            server_version_v9: false,
            plugin_api_url: DEFAULT_PLUGIN_API_URL.to_string(),
            log_level: "info".to_string(),
            webhook_secret: None,
            mattermost_url: None,
            bot_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let server_version_v9 = match std::env::var("CONFLUENCE_SERVER_V9") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigLoadError::InvalidBool("CONFLUENCE_SERVER_V9", raw))?,
            Err(_) => false,
        };

        let plugin_api_url = std::env::var("PLUGIN_API_URL")
            .unwrap_or_else(|_| DEFAULT_PLUGIN_API_URL.to_string());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let webhook_secret = non_empty_var("WEBHOOK_SECRET");
        if let Some(secret) = &webhook_secret {
            check_webhook_secret(secret)?;
        }

        Ok(Self {
            server_addr,
            server_version_v9,
            plugin_api_url: plugin_api_url.trim_end_matches('/').to_string(),
            log_level,
            webhook_secret,
            mattermost_url: non_empty_var("MATTERMOST_SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            bot_token: non_empty_var("MATTERMOST_BOT_TOKEN"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_webhook_secret(secret: &str) -> Result<(), ConfigLoadError> {
    if secret.chars().count() != WEBHOOK_SECRET_LEN {
        return Err(ConfigLoadError::InvalidWebhookSecret);
    }
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid boolean for {0}: {1}")]
    InvalidBool(&'static str, String),
    #[error("WEBHOOK_SECRET must be 32 characters")]
    InvalidWebhookSecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn webhook_secret_must_be_32_chars() {
        assert!(check_webhook_secret("0123456789abcdef0123456789abcdef").is_ok());
        assert!(matches!(
            check_webhook_secret("short"),
            Err(ConfigLoadError::InvalidWebhookSecret)
        ));
    }

    #[test]
    fn default_matches_env_defaults() {
        let config = Config::default();
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.plugin_api_url, DEFAULT_PLUGIN_API_URL);
        assert!(config.webhook_secret.is_none());
    }
}
