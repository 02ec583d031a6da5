//! Draft engine: normalize → validate → compare → build.
//!
//! Pure and synchronous. Validation always sees normalized values and the payload is built
//! from those same values, so the user is shown errors for exactly what would be sent.

pub mod compare;
pub mod normalize;
pub mod payload;
pub mod validate;

pub use compare::{resolve_credential_mode, resolve_subscription_mode, IdentityDelta, Mode};
pub use normalize::{normalize_credential, normalize_subscription};
pub use payload::{build_credential, build_subscription};
pub use validate::{
    validate_credential, validate_subscription, ExistenceCheck, ExistingCredentials,
    ValidationPolicy,
};

use crate::models::{
    ChannelSubscription, ChannelSubscriptionDraft, ConnectionCredential,
    ConnectionCredentialDraft, EventCatalog, ValidationResult,
};

/// A subscription ready to send: POST when `mode` is `Create`, PUT when `Update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSubmission {
    pub mode: Mode,
    pub payload: ChannelSubscription,
}

/// A credential ready to hand to the caller's save or update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSubmission {
    pub mode: Mode,
    pub payload: ConnectionCredential,
}

/// Run the full pipeline for a subscription draft.
pub fn prepare_subscription(
    draft: &ChannelSubscriptionDraft,
    prior: Option<&ChannelSubscription>,
    catalog: &EventCatalog,
    policy: ValidationPolicy,
) -> Result<SubscriptionSubmission, ValidationResult> {
    let normalized = normalize_subscription(draft);
    let errors = validate_subscription(&normalized, catalog, policy);
    if !errors.is_valid() {
        return Err(errors);
    }
    let (mode, delta) = resolve_subscription_mode(prior);
    Ok(SubscriptionSubmission {
        mode,
        payload: build_subscription(&normalized, &delta, catalog),
    })
}

/// Run the full pipeline for a credential draft.
///
/// The mode is resolved from `prior` up front because the uniqueness check only applies
/// when creating.
pub fn prepare_credential<E>(
    draft: &ConnectionCredentialDraft,
    prior: Option<&ConnectionCredential>,
    existing: &E,
) -> Result<CredentialSubmission, ValidationResult>
where
    E: ExistenceCheck + ?Sized,
{
    let normalized = normalize_credential(draft);
    let mode = resolve_credential_mode(prior);
    let errors = validate_credential(&normalized, mode, existing);
    if !errors.is_valid() {
        return Err(errors);
    }
    Ok(CredentialSubmission {
        mode,
        payload: build_credential(&normalized),
    })
}
