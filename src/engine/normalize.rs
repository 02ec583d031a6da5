//! Canonical form of user-entered strings.

use crate::models::{ChannelSubscriptionDraft, ConnectionCredentialDraft};

/// Trim `alias` and `spaceKey`; trim and lower-case the whole `baseURL` (scheme and path too).
pub fn normalize_subscription(draft: &ChannelSubscriptionDraft) -> ChannelSubscriptionDraft {
    ChannelSubscriptionDraft {
        alias: draft.alias.trim().to_string(),
        base_url: draft.base_url.trim().to_lowercase(),
        space_key: draft.space_key.trim().to_string(),
        ..draft.clone()
    }
}

/// Trim `serverURL`; client id and secret are taken verbatim.
pub fn normalize_credential(draft: &ConnectionCredentialDraft) -> ConnectionCredentialDraft {
    ConnectionCredentialDraft {
        server_url: draft.server_url.trim().to_string(),
        ..draft.clone()
    }
}
