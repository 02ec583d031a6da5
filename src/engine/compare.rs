//! Create-vs-update decision from the presence of a prior entity.

use crate::models::{ChannelSubscription, ConnectionCredential};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// What the backend needs to find the entity being updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityDelta {
    pub old_alias: Option<String>,
}

/// Only the identity of the prior subscription is read; full diffing is the backend's job.
pub fn resolve_subscription_mode(prior: Option<&ChannelSubscription>) -> (Mode, IdentityDelta) {
    match prior {
        None => (Mode::Create, IdentityDelta::default()),
        Some(prior) => (
            Mode::Update,
            IdentityDelta {
                old_alias: Some(prior.alias.clone()),
            },
        ),
    }
}

/// Credentials are keyed by an immutable server URL, so an update never carries a delta.
pub fn resolve_credential_mode(prior: Option<&ConnectionCredential>) -> Mode {
    if prior.is_some() {
        Mode::Update
    } else {
        Mode::Create
    }
}
