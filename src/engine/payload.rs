//! Wire payloads from normalized, validated drafts.

use crate::engine::compare::IdentityDelta;
use crate::models::{
    ChannelSubscription, ChannelSubscriptionDraft, ConnectionCredential,
    ConnectionCredentialDraft, EventCatalog, SubscriptionType,
};

/// Build the subscription request body.
///
/// The identifier not selected by `subscription_type` is emitted as `""`, and `events` follows
/// catalog order rather than selection order. Selected events missing from the catalog are dropped.
pub fn build_subscription(
    draft: &ChannelSubscriptionDraft,
    delta: &IdentityDelta,
    catalog: &EventCatalog,
) -> ChannelSubscription {
    let (space_key, page_id) = match draft.subscription_type {
        SubscriptionType::Space => (draft.space_key.clone(), String::new()),
        SubscriptionType::Page => (String::new(), draft.page_id.clone()),
    };
    let events = catalog
        .values()
        .filter(|value| draft.events.contains(*value))
        .map(str::to_string)
        .collect();

    ChannelSubscription {
        old_alias: delta.old_alias.clone(),
        alias: draft.alias.clone(),
        base_url: draft.base_url.clone(),
        space_key,
        events,
        channel_id: draft.channel_id.clone(),
        page_id,
        subscription_type: draft.subscription_type,
    }
}

pub fn build_credential(draft: &ConnectionCredentialDraft) -> ConnectionCredential {
    ConnectionCredential {
        server_url: draft.server_url.clone(),
        client_id: draft.client_id.clone(),
        client_secret: draft.client_secret.clone(),
    }
}
