//! Credential form session for the admin settings page.

use tracing::debug;

use crate::engine::{self, CredentialSubmission, ExistenceCheck, Mode};
use crate::models::{ConnectionCredential, ConnectionCredentialDraft, ValidationResult};

#[derive(Debug, Clone, Default)]
pub struct CredentialForm {
    draft: ConnectionCredentialDraft,
    prior: Option<ConnectionCredential>,
    errors: ValidationResult,
    closed: bool,
}

impl CredentialForm {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(prior: ConnectionCredential) -> Self {
        Self {
            draft: ConnectionCredentialDraft::from_credential(&prior),
            prior: Some(prior),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        engine::resolve_credential_mode(self.prior.as_ref())
    }

    pub fn draft(&self) -> &ConnectionCredentialDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_server_url(&mut self, server_url: impl Into<String>) {
        self.draft.server_url = server_url.into();
    }

    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.draft.client_id = client_id.into();
    }

    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.draft.client_secret = client_secret.into();
    }

    /// Restore the fields the form was opened with.
    pub fn reset(&mut self) {
        self.draft = self
            .prior
            .as_ref()
            .map(ConnectionCredentialDraft::from_credential)
            .unwrap_or_default();
    }

    /// Validate and hand back the payload for the caller's save (create) or update call.
    /// `existing` must answer for the caller's current credential set.
    pub fn submit<E>(&mut self, existing: &E) -> Result<CredentialSubmission, ValidationResult>
    where
        E: ExistenceCheck + ?Sized,
    {
        match engine::prepare_credential(&self.draft, self.prior.as_ref(), existing) {
            Ok(submission) => {
                self.closed = true;
                self.errors = ValidationResult::default();
                Ok(submission)
            }
            Err(errors) => {
                debug!(errors = %errors, "credential draft rejected");
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Close without saving; clears any shown errors.
    pub fn close(&mut self) {
        self.closed = true;
        self.errors = ValidationResult::default();
    }
}
