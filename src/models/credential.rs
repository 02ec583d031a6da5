//! Confluence OAuth connection credentials.

use serde::{Deserialize, Serialize};

/// User-editable credential form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionCredentialDraft {
    pub server_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ConnectionCredentialDraft {
    pub fn from_credential(credential: &ConnectionCredential) -> Self {
        Self {
            server_url: credential.server_url.clone(),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
        }
    }
}

/// Credential as saved by the host settings page. Same shape for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredential {
    #[serde(rename = "serverURL")]
    pub server_url: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

impl ConnectionCredential {
    pub fn identity_key(&self) -> String {
        credential_identity_key(&self.server_url)
    }
}

/// Identity of a credential: the server URL, trimmed and lower-cased.
pub fn credential_identity_key(server_url: &str) -> String {
    server_url.trim().to_lowercase()
}
