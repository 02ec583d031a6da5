//! Field-keyed validation outcome shown next to form inputs.

use serde::Serialize;
use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required";
pub const SERVER_URL_EXISTS: &str = "Server URL already exists";
pub const EVENTS_NOT_LOADED: &str = "Supported events have not loaded yet";

/// Wire names of the form fields that can carry an error.
pub mod field {
    pub const ALIAS: &str = "alias";
    pub const BASE_URL: &str = "baseURL";
    pub const SPACE_KEY: &str = "spaceKey";
    pub const PAGE_ID: &str = "pageID";
    pub const EVENTS: &str = "events";
    pub const SERVER_URL: &str = "serverURL";
    pub const CLIENT_ID: &str = "clientID";
    pub const CLIENT_SECRET: &str = "clientSecret";
}

/// Field name → message. Empty means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub field_errors: BTreeMap<&'static str, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.field_errors.insert(field, message.into());
    }

    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            self.add(field, REQUIRED);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.field_errors.keys().copied()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .field_errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
