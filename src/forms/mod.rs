//! Form sessions: per-form draft ownership, late catalog delivery, submission.

pub mod credential;
pub mod subscription;

pub use credential::CredentialForm;
pub use subscription::{load_catalog, SubmitOutcome, SubscriptionForm};
