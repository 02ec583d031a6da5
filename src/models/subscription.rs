//! Channel subscription types: the editable draft and the wire/stored shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which Confluence entity a subscription follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionType {
    /// Every page in a space, identified by `spaceKey`.
    #[default]
    #[serde(rename = "space_subscription")]
    Space,
    /// A single page, identified by `pageID`.
    #[serde(rename = "page_subscription")]
    Page,
}

impl SubscriptionType {
    pub const SPACE: &'static str = "space_subscription";
    pub const PAGE: &'static str = "page_subscription";

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Space => Self::SPACE,
            SubscriptionType::Page => Self::PAGE,
        }
    }

    /// Parse a wire literal. Anything other than the two literals is rejected.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            Self::SPACE => Some(SubscriptionType::Space),
            Self::PAGE => Some(SubscriptionType::Page),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-editable subscription form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSubscriptionDraft {
    pub alias: String,
    pub base_url: String,
    pub space_key: String,
    pub page_id: String,
    pub subscription_type: SubscriptionType,
    pub events: BTreeSet<String>,
    /// Owning channel; comes from context, never from user input.
    pub channel_id: String,
}

impl ChannelSubscriptionDraft {
    /// Empty draft for a creation form.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    /// Draft pre-filled from an existing subscription, for an edit form.
    pub fn from_subscription(subscription: &ChannelSubscription) -> Self {
        Self {
            alias: subscription.alias.clone(),
            base_url: subscription.base_url.clone(),
            space_key: subscription.space_key.clone(),
            page_id: subscription.page_id.clone(),
            subscription_type: subscription.subscription_type,
            events: subscription.events.iter().cloned().collect(),
            channel_id: subscription.channel_id.clone(),
        }
    }
}

/// Subscription as sent to and returned by the plugin API.
///
/// Field order is the wire order; `oldAlias` only appears on updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSubscription {
    #[serde(rename = "oldAlias", default, skip_serializing_if = "Option::is_none")]
    pub old_alias: Option<String>,
    pub alias: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    #[serde(rename = "spaceKey", default)]
    pub space_key: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(rename = "channelID")]
    pub channel_id: String,
    #[serde(rename = "pageID", default)]
    pub page_id: String,
    #[serde(rename = "subscriptionType")]
    pub subscription_type: SubscriptionType,
}

impl ChannelSubscription {
    /// The identifier selected by `subscription_type` (space key or page id).
    pub fn target(&self) -> &str {
        match self.subscription_type {
            SubscriptionType::Space => &self.space_key,
            SubscriptionType::Page => &self.page_id,
        }
    }

    /// Alias under which the entity is currently stored: `oldAlias` when renaming.
    pub fn stored_alias(&self) -> &str {
        match self.old_alias.as_deref() {
            Some(old) if !old.is_empty() => old,
            _ => &self.alias,
        }
    }
}

/// Acknowledgement returned by mutating plugin API calls: `{"status": "OK"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}
