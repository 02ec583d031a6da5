//! Required-field, type-conditional and uniqueness checks over normalized drafts.
//!
//! Every applicable check runs and accumulates into one [`ValidationResult`] so a form can
//! flag all offending inputs at once. Nothing here mutates the draft.

use crate::engine::compare::Mode;
use crate::models::{
    credential_identity_key, field, ChannelSubscriptionDraft, ConnectionCredential,
    ConnectionCredentialDraft, EventCatalog, SubscriptionType, ValidationResult,
    EVENTS_NOT_LOADED, REQUIRED, SERVER_URL_EXISTS,
};

/// Knobs for rules the backend contract has not pinned down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Reject subscriptions with no selected event.
    pub require_events: bool,
}

/// Answers whether a credential with the given server URL is already registered.
pub trait ExistenceCheck {
    fn exists(&self, server_url: &str) -> bool;
}

impl<F> ExistenceCheck for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, server_url: &str) -> bool {
        self(server_url)
    }
}

/// Already-registered credentials, compared by identity key.
#[derive(Debug, Clone, Copy)]
pub struct ExistingCredentials<'a>(pub &'a [ConnectionCredential]);

impl ExistenceCheck for ExistingCredentials<'_> {
    fn exists(&self, server_url: &str) -> bool {
        let key = credential_identity_key(server_url);
        self.0.iter().any(|c| c.identity_key() == key)
    }
}

/// Events are judged against `catalog`, since only catalog members reach the payload. With no
/// catalog yet there is nothing to send, so `events` is flagged regardless of policy.
pub fn validate_subscription(
    draft: &ChannelSubscriptionDraft,
    catalog: &EventCatalog,
    policy: ValidationPolicy,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    result.require(field::ALIAS, &draft.alias);
    result.require(field::BASE_URL, &draft.base_url);
    match draft.subscription_type {
        SubscriptionType::Space => result.require(field::SPACE_KEY, &draft.space_key),
        SubscriptionType::Page => result.require(field::PAGE_ID, &draft.page_id),
    }
    if catalog.is_empty() {
        result.add(field::EVENTS, EVENTS_NOT_LOADED);
    } else if policy.require_events && !catalog.values().any(|v| draft.events.contains(v)) {
        result.add(field::EVENTS, REQUIRED);
    }
    result
}

/// Uniqueness is only consulted in create mode, and only once every required field is present.
pub fn validate_credential<E>(
    draft: &ConnectionCredentialDraft,
    mode: Mode,
    existing: &E,
) -> ValidationResult
where
    E: ExistenceCheck + ?Sized,
{
    let mut result = ValidationResult::default();
    result.require(field::SERVER_URL, &draft.server_url);
    result.require(field::CLIENT_ID, &draft.client_id);
    result.require(field::CLIENT_SECRET, &draft.client_secret);
    if !result.is_valid() {
        return result;
    }

    if mode == Mode::Create && existing.exists(&draft.server_url) {
        result.add(field::SERVER_URL, SERVER_URL_EXISTS);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn space_draft() -> ChannelSubscriptionDraft {
        ChannelSubscriptionDraft {
            alias: "Abc".into(),
            base_url: "https://test.com".into(),
            space_key: "test".into(),
            channel_id: "chan".into(),
            ..Default::default()
        }
    }

    fn catalog() -> EventCatalog {
        EventCatalog::for_server(false)
    }

    fn page_draft() -> ChannelSubscriptionDraft {
        ChannelSubscriptionDraft {
            subscription_type: SubscriptionType::Page,
            space_key: String::new(),
            page_id: "1234".into(),
            ..space_draft()
        }
    }

    fn credential() -> ConnectionCredentialDraft {
        ConnectionCredentialDraft {
            server_url: "https://wiki.example.com".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
        }
    }

    #[test]
    fn valid_space_subscription() {
        let result = validate_subscription(&space_draft(), &catalog(), ValidationPolicy::default());
        assert!(result.is_valid());
    }

    #[test]
    fn required_errors_match_exactly_the_empty_subset() {
        // bit 0 = alias, bit 1 = baseURL, bit 2 = type identifier
        let cases = [(space_draft(), field::SPACE_KEY), (page_draft(), field::PAGE_ID)];
        for (base, identifier) in cases {
            for mask in 0u8..8 {
                let mut d = base.clone();
                let mut expected = Vec::new();
                if mask & 1 != 0 {
                    d.alias.clear();
                    expected.push(field::ALIAS);
                }
                if mask & 2 != 0 {
                    d.base_url.clear();
                    expected.push(field::BASE_URL);
                }
                if mask & 4 != 0 {
                    match d.subscription_type {
                        SubscriptionType::Space => d.space_key.clear(),
                        SubscriptionType::Page => d.page_id.clear(),
                    }
                    expected.push(identifier);
                }
                expected.sort_unstable();
                let result = validate_subscription(&d, &catalog(), ValidationPolicy::default());
                let fields: Vec<_> = result.fields().collect();
                assert_eq!(fields, expected, "{identifier} mask {mask}");
                assert!(result.field_errors.values().all(|m| m == REQUIRED));
            }
        }
    }

    #[test]
    fn space_type_ignores_empty_page_id() {
        let d = space_draft();
        assert!(d.page_id.is_empty());
        let result = validate_subscription(&d, &catalog(), ValidationPolicy::default());
        assert!(!result.has(field::PAGE_ID));
    }

    #[test]
    fn page_type_requires_page_id_not_space_key() {
        let d = ChannelSubscriptionDraft {
            subscription_type: SubscriptionType::Page,
            space_key: String::new(),
            ..space_draft()
        };
        let result = validate_subscription(&d, &catalog(), ValidationPolicy::default());
        assert_eq!(result.get(field::PAGE_ID), Some(REQUIRED));
        assert!(!result.has(field::SPACE_KEY));
    }

    #[test]
    fn events_only_required_by_policy() {
        let d = space_draft();
        assert!(validate_subscription(&d, &catalog(), ValidationPolicy::default()).is_valid());
        let strict = ValidationPolicy {
            require_events: true,
        };
        assert_eq!(
            validate_subscription(&d, &catalog(), strict).get(field::EVENTS),
            Some(REQUIRED)
        );
    }

    #[test]
    fn required_events_must_be_in_catalog() {
        let strict = ValidationPolicy {
            require_events: true,
        };
        let mut d = space_draft();
        d.events.insert("not_in_catalog".into());
        assert_eq!(
            validate_subscription(&d, &catalog(), strict).get(field::EVENTS),
            Some(REQUIRED)
        );

        d.events.insert(crate::models::PAGE_CREATED.into());
        assert!(validate_subscription(&d, &catalog(), strict).is_valid());
    }

    #[test]
    fn missing_catalog_blocks_any_draft() {
        let result = validate_subscription(
            &space_draft(),
            &EventCatalog::default(),
            ValidationPolicy::default(),
        );
        assert_eq!(result.get(field::EVENTS), Some(EVENTS_NOT_LOADED));
        assert_eq!(result.field_errors.len(), 1);
    }

    #[test]
    fn credential_required_fields_accumulate() {
        let result = validate_credential(
            &ConnectionCredentialDraft::default(),
            Mode::Create,
            &|_: &str| false,
        );
        let fields: Vec<_> = result.fields().collect();
        assert_eq!(
            fields,
            vec![field::CLIENT_ID, field::CLIENT_SECRET, field::SERVER_URL]
        );
    }

    #[test]
    fn uniqueness_suppressed_while_fields_missing() {
        let calls = Cell::new(0);
        let exists = |_: &str| {
            calls.set(calls.get() + 1);
            true
        };
        let d = ConnectionCredentialDraft {
            client_secret: String::new(),
            ..credential()
        };
        let result = validate_credential(&d, Mode::Create, &exists);
        assert_eq!(result.get(field::CLIENT_SECRET), Some(REQUIRED));
        assert!(!result.has(field::SERVER_URL));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn duplicate_server_url_on_create() {
        let existing = vec![ConnectionCredential {
            server_url: "HTTPS://Wiki.Example.com".into(),
            client_id: "other".into(),
            client_secret: "other".into(),
        }];
        let result =
            validate_credential(&credential(), Mode::Create, &ExistingCredentials(&existing));
        assert_eq!(result.get(field::SERVER_URL), Some(SERVER_URL_EXISTS));
        assert_eq!(result.field_errors.len(), 1);
    }

    #[test]
    fn uniqueness_skipped_on_update() {
        let result = validate_credential(&credential(), Mode::Update, &|_: &str| true);
        assert!(result.is_valid());
    }
}
