//! Incoming Confluence webhook events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "self", default)]
    pub url: String,
    #[serde(default)]
    pub space_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookComment {
    #[serde(rename = "self", default)]
    pub url: String,
    #[serde(default)]
    pub space_key: String,
    /// Page the comment was posted on.
    #[serde(default)]
    pub parent: WebhookPage,
}

/// One page or comment event. `event` is an identifier such as `page_created`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<WebhookPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<WebhookComment>,
}

impl WebhookEvent {
    /// Link to the comment, or to the page for page events.
    pub fn url(&self) -> &str {
        match (&self.comment, &self.page) {
            (Some(comment), _) => &comment.url,
            (None, Some(page)) => &page.url,
            (None, None) => "",
        }
    }

    pub fn space_key(&self) -> &str {
        match (&self.comment, &self.page) {
            (Some(comment), _) => &comment.space_key,
            (None, Some(page)) => &page.space_key,
            (None, None) => "",
        }
    }

    /// Page the event concerns; for comments, the page they belong to.
    pub fn page_id(&self) -> &str {
        match (&self.comment, &self.page) {
            (Some(comment), _) => &comment.parent.id,
            (None, Some(page)) => &page.id,
            (None, None) => "",
        }
    }

    /// Collapse doubled slashes Confluence leaves in link paths.
    pub fn sanitize_urls(&mut self) {
        if let Some(page) = &mut self.page {
            page.url = sanitize_url(&page.url);
        }
        if let Some(comment) = &mut self.comment {
            comment.url = sanitize_url(&comment.url);
            comment.parent.url = sanitize_url(&comment.parent.url);
        }
    }
}

/// `https://host//spaces//KEY?q=a//b` → `https://host/spaces/KEY?q=a//b`. Strings without a
/// scheme are returned unchanged.
pub fn sanitize_url(raw: &str) -> String {
    let Some((scheme, rest)) = raw.split_once("://") else {
        return raw.to_string();
    };
    let (path, tail) = match rest.find(|c| c == '?' || c == '#') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };

    let mut out = String::with_capacity(raw.len());
    out.push_str(scheme);
    out.push_str("://");
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' && prev_slash {
            continue;
        }
        prev_slash = c == '/';
        out.push(c);
    }
    out.push_str(tail);
    out
}
