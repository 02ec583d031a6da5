//! In-memory subscription index, keyed by channel and by (URL host, space key / page id).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{ChannelSubscription, SubscriptionType};

const SUBSCRIPTION_KEY_PREFIX: &str = "confluence_subs";

/// `confluence_subs/{host}/{target}`. Falls back to the raw URL when it has no host.
pub fn combination_key(base_url: &str, target: &str) -> String {
    let host = url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| base_url.to_lowercase());
    format!("{}/{}/{}", SUBSCRIPTION_KEY_PREFIX, host, target)
}

type ChannelEvents = HashMap<String, Vec<String>>;

#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    by_channel: HashMap<String, BTreeMap<String, ChannelSubscription>>,
    by_url_space_key: HashMap<String, ChannelEvents>,
    by_url_page_id: HashMap<String, ChannelEvents>,
}

impl SubscriptionIndex {
    fn targets(&self, subscription_type: SubscriptionType) -> &HashMap<String, ChannelEvents> {
        match subscription_type {
            SubscriptionType::Space => &self.by_url_space_key,
            SubscriptionType::Page => &self.by_url_page_id,
        }
    }

    fn targets_mut(
        &mut self,
        subscription_type: SubscriptionType,
    ) -> &mut HashMap<String, ChannelEvents> {
        match subscription_type {
            SubscriptionType::Space => &mut self.by_url_space_key,
            SubscriptionType::Page => &mut self.by_url_page_id,
        }
    }

    pub fn get(&self, channel_id: &str, alias: &str) -> Option<&ChannelSubscription> {
        self.by_channel.get(channel_id)?.get(alias)
    }

    pub fn list(&self, channel_id: &str) -> Vec<&ChannelSubscription> {
        self.by_channel
            .get(channel_id)
            .map(|subs| subs.values().collect())
            .unwrap_or_default()
    }

    pub fn contains_alias(&self, channel_id: &str, alias: &str) -> bool {
        self.get(channel_id, alias).is_some()
    }

    /// Whether the channel already follows the same space/page on the same host.
    pub fn contains_target(&self, subscription: &ChannelSubscription) -> bool {
        let key = combination_key(&subscription.base_url, subscription.target());
        self.targets(subscription.subscription_type)
            .get(&key)
            .is_some_and(|channels| channels.contains_key(&subscription.channel_id))
    }

    /// Channels (and their events) following a space/page on a host.
    pub fn subscribers(
        &self,
        subscription_type: SubscriptionType,
        base_url: &str,
        target: &str,
    ) -> Vec<(String, Vec<String>)> {
        let key = combination_key(base_url, target);
        self.targets(subscription_type)
            .get(&key)
            .map(|channels| {
                channels
                    .iter()
                    .map(|(channel, events)| (channel.clone(), events.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Channels to notify about `event`: subscribers of the space or of the page on the
    /// URL's host that selected the event. Each channel appears once, sorted.
    pub fn notification_channels(
        &self,
        url: &str,
        space_key: &str,
        page_id: &str,
        event: &str,
    ) -> Vec<String> {
        let mut channels = BTreeSet::new();
        let targets = [
            (SubscriptionType::Space, space_key),
            (SubscriptionType::Page, page_id),
        ];
        for (subscription_type, target) in targets {
            if target.is_empty() {
                continue;
            }
            for (channel, events) in self.subscribers(subscription_type, url, target) {
                if events.iter().any(|e| e == event) {
                    channels.insert(channel);
                }
            }
        }
        channels.into_iter().collect()
    }

    /// Store under `alias`; `oldAlias` is never persisted.
    pub fn add(&mut self, mut subscription: ChannelSubscription) {
        subscription.old_alias = None;
        let key = combination_key(&subscription.base_url, subscription.target());
        self.targets_mut(subscription.subscription_type)
            .entry(key)
            .or_default()
            .insert(subscription.channel_id.clone(), subscription.events.clone());
        debug!(channel_id = %subscription.channel_id, alias = %subscription.alias, "subscription indexed");
        self.by_channel
            .entry(subscription.channel_id.clone())
            .or_default()
            .insert(subscription.alias.clone(), subscription);
    }

    pub fn remove(&mut self, channel_id: &str, alias: &str) -> Option<ChannelSubscription> {
        let channel = self.by_channel.get_mut(channel_id)?;
        let removed = channel.remove(alias)?;
        if channel.is_empty() {
            self.by_channel.remove(channel_id);
        }
        let key = combination_key(&removed.base_url, removed.target());
        let targets = self.targets_mut(removed.subscription_type);
        if let Some(channels) = targets.get_mut(&key) {
            channels.remove(channel_id);
            if channels.is_empty() {
                targets.remove(&key);
            }
        }
        Some(removed)
    }
}

/// Shared index guarded by one lock; every read-check-write runs inside a single `modify`.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRepository {
    index: Arc<RwLock<SubscriptionIndex>>,
}

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read<T>(&self, f: impl FnOnce(&SubscriptionIndex) -> T) -> T {
        let index = self.index.read().await;
        f(&index)
    }

    pub async fn modify<T>(&self, f: impl FnOnce(&mut SubscriptionIndex) -> T) -> T {
        let mut index = self.index.write().await;
        f(&mut index)
    }
}
