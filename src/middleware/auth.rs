//! Auth extractor: the host server stamps every plugin request with the acting user's id.

use axum::http::request::Parts;
use tracing::debug;

use crate::error::AppError;

pub const HEADER_USER_ID: &str = "mattermost-user-id";

/// Extractor: id of the authenticated host user. Missing or blank header → 401.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginUser(pub String);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for PluginUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(HEADER_USER_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match user_id {
            Some(id) => Ok(PluginUser(id.to_string())),
            None => {
                debug!("rejected request: missing user id header");
                Err(AppError::Auth("Not authorized".to_string()))
            }
        }
    }
}
