//! Confluence webhook events and the server-advertised event catalog.

use serde::{Deserialize, Serialize};

pub const COMMENT_CREATED: &str = "comment_created";
pub const COMMENT_UPDATED: &str = "comment_updated";
pub const COMMENT_REMOVED: &str = "comment_removed";
pub const PAGE_CREATED: &str = "page_created";
pub const PAGE_UPDATED: &str = "page_updated";
pub const PAGE_TRASHED: &str = "page_trashed";
pub const PAGE_RESTORED: &str = "page_restored";
pub const PAGE_REMOVED: &str = "page_removed";
/// Delivered by Confluence but never offered as a subscription choice.
pub const SPACE_UPDATED: &str = "space_updated";

/// Events supported by Confluence Server v8 and below.
pub const SUPPORTED_EVENTS_V8: &[&str] = &[
    COMMENT_CREATED,
    COMMENT_UPDATED,
    COMMENT_REMOVED,
    PAGE_CREATED,
    PAGE_UPDATED,
    PAGE_TRASHED,
    PAGE_RESTORED,
    PAGE_REMOVED,
];

/// Events supported by Confluence Server v9+ (`comment_removed` is gone).
pub const SUPPORTED_EVENTS_V9: &[&str] = &[
    COMMENT_CREATED,
    COMMENT_UPDATED,
    PAGE_CREATED,
    PAGE_UPDATED,
    PAGE_TRASHED,
    PAGE_RESTORED,
    PAGE_REMOVED,
];

/// Human-readable label for an event identifier. Unknown events fall back to the identifier.
pub fn event_display_name(event: &str) -> &str {
    match event {
        COMMENT_CREATED => "Comment Create",
        COMMENT_UPDATED => "Comment Update",
        COMMENT_REMOVED => "Comment Remove",
        PAGE_CREATED => "Page Create",
        PAGE_UPDATED => "Page Update",
        PAGE_TRASHED => "Page Trash",
        PAGE_RESTORED => "Page Restore",
        PAGE_REMOVED => "Page Remove",
        other => other,
    }
}

/// One selectable entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl EventOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = event_display_name(&value).to_string();
        Self { value, label }
    }
}

/// Ordered list of events a subscription may select. Order is authoritative for payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCatalog(Vec<EventOption>);

impl EventCatalog {
    pub fn new(options: Vec<EventOption>) -> Self {
        Self(options)
    }

    /// Catalog advertised for the given Confluence Server generation.
    pub fn for_server(is_v9_or_above: bool) -> Self {
        let events = if is_v9_or_above {
            SUPPORTED_EVENTS_V9
        } else {
            SUPPORTED_EVENTS_V8
        };
        Self(events.iter().copied().map(EventOption::new).collect())
    }

    pub fn options(&self) -> &[EventOption] {
        &self.0
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|o| o.value.as_str())
    }

    pub fn contains(&self, event: &str) -> bool {
        self.values().any(|v| v == event)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Body of `GET /config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfigResponse {
    pub supported_events: EventCatalog,
}
