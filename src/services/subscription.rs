//! Server-side subscription rules: request checks, uniqueness, save/edit/delete.

use tracing::{info, instrument};
use validator::ValidateUrl;

use crate::error::{AppError, AppResult};
use crate::models::{
    ChannelSubscription, EventCatalog, PluginConfigResponse, SubscriptionType,
};
use crate::repositories::SubscriptionRepository;

pub const ALIAS_ALREADY_EXISTS: &str =
    "a subscription with the same name already exists in this channel";
pub const URL_SPACE_KEY_ALREADY_EXISTS: &str =
    "a subscription with the same url and space key already exists in this channel";
pub const URL_PAGE_ID_ALREADY_EXISTS: &str =
    "a subscription with the same url and page id already exists in this channel";

#[derive(Clone)]
pub struct SubscriptionService {
    repo: SubscriptionRepository,
    catalog: EventCatalog,
}

impl SubscriptionService {
    pub fn new(repo: SubscriptionRepository, server_version_v9: bool) -> Self {
        Self {
            repo,
            catalog: EventCatalog::for_server(server_version_v9),
        }
    }

    pub fn plugin_config(&self) -> PluginConfigResponse {
        PluginConfigResponse {
            supported_events: self.catalog.clone(),
        }
    }

    /// Reject bodies that disagree with the route, are incomplete, or name unsupported events.
    fn check_request(
        &self,
        path_type: &str,
        channel_id: &str,
        subscription: &ChannelSubscription,
    ) -> AppResult<()> {
        let subscription_type = SubscriptionType::from_wire(path_type)
            .ok_or_else(|| AppError::Validation("Invalid subscription type".to_string()))?;
        if subscription_type != subscription.subscription_type {
            return Err(AppError::Validation("subscription type mismatch".to_string()));
        }
        if channel_id != subscription.channel_id {
            return Err(AppError::Validation("channel id mismatch".to_string()));
        }
        is_valid(subscription)?;
        for event in &subscription.events {
            if !self.catalog.contains(event) {
                return Err(AppError::Validation(format!(
                    "event '{}' is not supported by the current Confluence Server version",
                    event
                )));
            }
        }
        Ok(())
    }

    #[instrument(skip(self, subscription), fields(alias = %subscription.alias))]
    pub async fn save(
        &self,
        path_type: &str,
        channel_id: &str,
        subscription: ChannelSubscription,
    ) -> AppResult<()> {
        self.check_request(path_type, channel_id, &subscription)?;
        self.repo
            .modify(|index| {
                if index.contains_alias(&subscription.channel_id, &subscription.alias) {
                    return Err(AppError::Validation(ALIAS_ALREADY_EXISTS.to_string()));
                }
                if index.contains_target(&subscription) {
                    return Err(AppError::Validation(target_conflict(&subscription).to_string()));
                }
                index.add(subscription);
                Ok(())
            })
            .await?;
        info!(channel_id = %channel_id, "subscription saved");
        Ok(())
    }

    /// Replace the subscription stored under `oldAlias` (or `alias`). Atomic: on conflict the
    /// stored entry is left untouched.
    #[instrument(skip(self, subscription), fields(alias = %subscription.alias))]
    pub async fn edit(
        &self,
        path_type: &str,
        channel_id: &str,
        subscription: ChannelSubscription,
    ) -> AppResult<()> {
        self.check_request(path_type, channel_id, &subscription)?;
        let stored_alias = subscription.stored_alias().to_string();
        self.repo
            .modify(|index| {
                let previous = index
                    .remove(&subscription.channel_id, &stored_alias)
                    .ok_or_else(|| not_found(&stored_alias))?;
                let conflict = if index.contains_alias(&subscription.channel_id, &subscription.alias)
                {
                    Some(ALIAS_ALREADY_EXISTS)
                } else if index.contains_target(&subscription) {
                    Some(target_conflict(&subscription))
                } else {
                    None
                };
                if let Some(message) = conflict {
                    index.add(previous);
                    return Err(AppError::Validation(message.to_string()));
                }
                index.add(subscription);
                Ok(())
            })
            .await?;
        info!(channel_id = %channel_id, old_alias = %stored_alias, "subscription edited");
        Ok(())
    }

    pub async fn get(&self, channel_id: &str, alias: &str) -> AppResult<ChannelSubscription> {
        self.repo
            .read(|index| index.get(channel_id, alias).cloned())
            .await
            .ok_or_else(|| not_found(alias))
    }

    /// Aliases in the channel, sorted.
    pub async fn list_aliases(&self, channel_id: &str) -> Vec<String> {
        self.repo
            .read(|index| {
                index
                    .list(channel_id)
                    .into_iter()
                    .map(|s| s.alias.clone())
                    .collect()
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, channel_id: &str, alias: &str) -> AppResult<ChannelSubscription> {
        let removed = self
            .repo
            .modify(|index| index.remove(channel_id, alias))
            .await
            .ok_or_else(|| not_found(alias))?;
        info!(channel_id = %channel_id, alias = %alias, "subscription deleted");
        Ok(removed)
    }
}

fn is_valid(subscription: &ChannelSubscription) -> AppResult<()> {
    let invalid = |msg: &str| Err(AppError::Validation(msg.to_string()));
    if subscription.alias.is_empty() {
        return invalid("subscription name can not be empty");
    }
    if subscription.base_url.is_empty() {
        return invalid("base url can not be empty");
    }
    if !subscription.base_url.validate_url() {
        return invalid("enter a valid url");
    }
    if subscription.target().is_empty() {
        return match subscription.subscription_type {
            SubscriptionType::Space => invalid("space key can not be empty"),
            SubscriptionType::Page => invalid("page id can not be empty"),
        };
    }
    if subscription.channel_id.is_empty() {
        return invalid("channel id can not be empty");
    }
    Ok(())
}

fn target_conflict(subscription: &ChannelSubscription) -> &'static str {
    match subscription.subscription_type {
        SubscriptionType::Space => URL_SPACE_KEY_ALREADY_EXISTS,
        SubscriptionType::Page => URL_PAGE_ID_ALREADY_EXISTS,
    }
}

fn not_found(alias: &str) -> AppError {
    AppError::NotFound(format!("subscription with name \"{}\" does not exist", alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{COMMENT_REMOVED, PAGE_CREATED};

    const SPACE: &str = "space_subscription";
    const PAGE: &str = "page_subscription";

    fn service() -> SubscriptionService {
        SubscriptionService::new(SubscriptionRepository::new(), false)
    }

    fn space(alias: &str, key: &str) -> ChannelSubscription {
        ChannelSubscription {
            old_alias: None,
            alias: alias.into(),
            base_url: "https://test.com".into(),
            space_key: key.into(),
            events: vec![PAGE_CREATED.into()],
            channel_id: "chan".into(),
            page_id: String::new(),
            subscription_type: SubscriptionType::Space,
        }
    }

    fn expect_validation(result: AppResult<()>, expected: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn save_then_get() {
        let svc = service();
        svc.save(SPACE, "chan", space("Abc", "TEST")).await.unwrap();
        let stored = svc.get("chan", "Abc").await.unwrap();
        assert_eq!(stored.space_key, "TEST");
        assert_eq!(svc.list_aliases("chan").await, vec!["Abc"]);
    }

    #[tokio::test]
    async fn duplicate_alias_and_target_rejected() {
        let svc = service();
        svc.save(SPACE, "chan", space("Abc", "TEST")).await.unwrap();
        expect_validation(
            svc.save(SPACE, "chan", space("Abc", "OTHER")).await,
            ALIAS_ALREADY_EXISTS,
        );
        expect_validation(
            svc.save(SPACE, "chan", space("Xyz", "TEST")).await,
            URL_SPACE_KEY_ALREADY_EXISTS,
        );
    }

    #[tokio::test]
    async fn route_and_body_must_agree() {
        let svc = service();
        expect_validation(
            svc.save("bogus", "chan", space("Abc", "TEST")).await,
            "Invalid subscription type",
        );
        expect_validation(
            svc.save(PAGE, "chan", space("Abc", "TEST")).await,
            "subscription type mismatch",
        );
        expect_validation(
            svc.save(SPACE, "other", space("Abc", "TEST")).await,
            "channel id mismatch",
        );
    }

    #[tokio::test]
    async fn incomplete_or_malformed_bodies_rejected() {
        let svc = service();
        expect_validation(
            svc.save(SPACE, "chan", space("Abc", "")).await,
            "space key can not be empty",
        );
        let mut bad_url = space("Abc", "TEST");
        bad_url.base_url = "not a url".into();
        expect_validation(svc.save(SPACE, "chan", bad_url).await, "enter a valid url");
    }

    #[tokio::test]
    async fn v9_rejects_comment_removed() {
        let svc = SubscriptionService::new(SubscriptionRepository::new(), true);
        let mut sub = space("Abc", "TEST");
        sub.events.push(COMMENT_REMOVED.into());
        expect_validation(
            svc.save(SPACE, "chan", sub).await,
            "event 'comment_removed' is not supported by the current Confluence Server version",
        );
    }

    #[tokio::test]
    async fn edit_renames_by_old_alias() {
        let svc = service();
        svc.save(SPACE, "chan", space("Abc", "TEST")).await.unwrap();
        let mut renamed = space("Xyz", "TEST");
        renamed.old_alias = Some("Abc".into());
        svc.edit(SPACE, "chan", renamed).await.unwrap();
        assert!(matches!(
            svc.get("chan", "Abc").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(svc.get("chan", "Xyz").await.unwrap().old_alias, None);
    }

    #[tokio::test]
    async fn edit_conflict_leaves_original() {
        let svc = service();
        svc.save(SPACE, "chan", space("Abc", "ONE")).await.unwrap();
        svc.save(SPACE, "chan", space("Def", "TWO")).await.unwrap();
        let mut clash = space("Def", "ONE");
        clash.old_alias = Some("Abc".into());
        expect_validation(svc.edit(SPACE, "chan", clash).await, ALIAS_ALREADY_EXISTS);
        assert_eq!(svc.get("chan", "Abc").await.unwrap().space_key, "ONE");
    }

    #[tokio::test]
    async fn edit_and_delete_missing_are_not_found() {
        let svc = service();
        assert!(matches!(
            svc.edit(SPACE, "chan", space("Abc", "TEST")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete("chan", "Abc").await,
            Err(AppError::NotFound(_))
        ));
    }
}
