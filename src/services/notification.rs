//! Confluence webhook delivery: secret check, message rendering, fan-out to subscribed channels.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tracing::{debug, info, instrument, warn};

use crate::client::PostSender;
use crate::error::{AppError, AppResult};
use crate::models::{
    WebhookEvent, COMMENT_CREATED, COMMENT_REMOVED, COMMENT_UPDATED, PAGE_CREATED, PAGE_REMOVED,
    PAGE_RESTORED, PAGE_TRASHED, PAGE_UPDATED,
};
use crate::repositories::SubscriptionRepository;

#[derive(Clone)]
pub struct NotificationService {
    repo: SubscriptionRepository,
    sender: Arc<dyn PostSender>,
    secret: Option<String>,
}

impl NotificationService {
    pub fn new(
        repo: SubscriptionRepository,
        sender: Arc<dyn PostSender>,
        secret: Option<String>,
    ) -> Self {
        Self {
            repo,
            sender,
            secret,
        }
    }

    /// Compare the `?secret=` value against the configured one.
    pub fn verify_secret(&self, got: &str) -> AppResult<()> {
        let expected = self
            .secret
            .as_deref()
            .ok_or_else(|| AppError::Forbidden("webhook secret is not configured".to_string()))?;
        verify_secret(expected, got)
    }

    /// Post the rendered event into every subscribed channel. Returns how many posts were
    /// created; a failed post is logged and skipped.
    #[instrument(skip(self, event), fields(event = %event.event))]
    pub async fn notify(&self, mut event: WebhookEvent) -> AppResult<usize> {
        event.sanitize_urls();
        let Some(message) = render_message(&event) else {
            debug!("no notification for event");
            return Ok(0);
        };

        let channels = self
            .repo
            .read(|index| {
                index.notification_channels(
                    event.url(),
                    event.space_key(),
                    event.page_id(),
                    &event.event,
                )
            })
            .await;

        let mut delivered = 0;
        for channel_id in &channels {
            match self.sender.create_post(channel_id, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(channel_id = %channel_id, error = %e, "notification post failed"),
            }
        }
        info!(channels = channels.len(), delivered, "notifications sent");
        Ok(delivered)
    }
}

/// Constant-time match of `got` against `expected`, percent-decoding `got` as many times as it
/// keeps changing.
pub fn verify_secret(expected: &str, got: &str) -> AppResult<()> {
    let mut got = got.to_string();
    while !constant_time_eq(got.as_bytes(), expected.as_bytes()) {
        let unescaped = percent_decode_str(&got).decode_utf8_lossy().into_owned();
        if unescaped == got {
            return Err(AppError::Forbidden(
                "request URL: secret did not match".to_string(),
            ));
        }
        got = unescaped;
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Chat message for `event`, or `None` when the event is unknown or lacks its page/comment.
pub fn render_message(event: &WebhookEvent) -> Option<String> {
    let page = event.page.as_ref();
    let comment = event.comment.as_ref();
    let message = match event.event.as_str() {
        PAGE_CREATED => {
            let p = page?;
            format!(
                "A new page [{}]({}) was created in the **{}** space.",
                p.title, p.url, p.space_key
            )
        }
        PAGE_UPDATED => {
            let p = page?;
            format!(
                "Page [{}]({}) was updated in the **{}** space.",
                p.title, p.url, p.space_key
            )
        }
        PAGE_TRASHED => {
            let p = page?;
            format!(
                "Page [{}]({}) was moved to the trash in the **{}** space.",
                p.title, p.url, p.space_key
            )
        }
        PAGE_RESTORED => {
            let p = page?;
            format!(
                "Page [{}]({}) was restored in the **{}** space.",
                p.title, p.url, p.space_key
            )
        }
        PAGE_REMOVED => {
            let p = page?;
            format!(
                "Page **{}** was removed from the **{}** space.",
                p.title, p.space_key
            )
        }
        COMMENT_CREATED => {
            let c = comment?;
            format!(
                "A new [Comment]({}) was posted on the [{}]({}) page.",
                c.url, c.parent.title, c.parent.url
            )
        }
        COMMENT_UPDATED => {
            let c = comment?;
            format!(
                "A [Comment]({}) was updated on the [{}]({}) page.",
                c.url, c.parent.title, c.parent.url
            )
        }
        COMMENT_REMOVED => {
            let c = comment?;
            format!(
                "A Comment was deleted from the [{}]({}) page.",
                c.parent.title, c.parent.url
            )
        }
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelSubscription, SubscriptionType, WebhookComment, WebhookPage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[derive(Default)]
    struct RecordingSender {
        posts: Mutex<Vec<(String, String)>>,
        fail_channel: Option<&'static str>,
    }

    #[async_trait]
    impl PostSender for RecordingSender {
        async fn create_post(&self, channel_id: &str, message: &str) -> AppResult<()> {
            if self.fail_channel == Some(channel_id) {
                return Err(AppError::Transport {
                    status: 403,
                    message: "bot is not a member of the channel".into(),
                });
            }
            self.posts
                .lock()
                .unwrap()
                .push((channel_id.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn test_page() -> WebhookPage {
        WebhookPage {
            id: "1234".into(),
            title: "Roadmap".into(),
            url: "https://wiki.example.com/display/TEST/Roadmap".into(),
            space_key: "TEST".into(),
        }
    }

    fn page_event(event: &str) -> WebhookEvent {
        WebhookEvent {
            event: event.into(),
            page: Some(test_page()),
            comment: None,
        }
    }

    fn subscription(channel: &str, alias: &str, events: &[&str]) -> ChannelSubscription {
        ChannelSubscription {
            old_alias: None,
            alias: alias.into(),
            base_url: "https://wiki.example.com".into(),
            space_key: "TEST".into(),
            events: events.iter().map(|e| e.to_string()).collect(),
            channel_id: channel.into(),
            page_id: String::new(),
            subscription_type: SubscriptionType::Space,
        }
    }

    async fn service_with(
        subscriptions: Vec<ChannelSubscription>,
        sender: Arc<RecordingSender>,
    ) -> NotificationService {
        let repo = SubscriptionRepository::new();
        repo.modify(|index| subscriptions.into_iter().for_each(|s| index.add(s)))
            .await;
        NotificationService::new(repo, sender, Some(SECRET.to_string()))
    }

    #[test]
    fn renders_page_and_comment_templates() {
        assert_eq!(
            render_message(&page_event(PAGE_CREATED)).unwrap(),
            "A new page [Roadmap](https://wiki.example.com/display/TEST/Roadmap) was created in the **TEST** space."
        );
        assert_eq!(
            render_message(&page_event(PAGE_REMOVED)).unwrap(),
            "Page **Roadmap** was removed from the **TEST** space."
        );
        let comment = WebhookEvent {
            event: COMMENT_REMOVED.into(),
            page: None,
            comment: Some(WebhookComment {
                url: String::new(),
                space_key: "TEST".into(),
                parent: test_page(),
            }),
        };
        assert_eq!(
            render_message(&comment).unwrap(),
            "A Comment was deleted from the [Roadmap](https://wiki.example.com/display/TEST/Roadmap) page."
        );
    }

    #[test]
    fn unknown_or_incomplete_events_render_nothing() {
        assert!(render_message(&page_event("space_updated")).is_none());
        assert!(render_message(&page_event(COMMENT_CREATED)).is_none());
    }

    #[test]
    fn secret_matches_after_unescaping() {
        assert!(verify_secret(SECRET, SECRET).is_ok());
        assert!(verify_secret("a+b/c", "a%2Bb%2Fc").is_ok());
        assert!(verify_secret("a+b/c", "a%252Bb%252Fc").is_ok());
        assert!(matches!(
            verify_secret(SECRET, "wrong"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_secret_refuses_webhooks() {
        let service = NotificationService::new(
            SubscriptionRepository::new(),
            Arc::new(RecordingSender::default()),
            None,
        );
        assert!(matches!(
            service.verify_secret(SECRET),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn notify_posts_to_channels_that_selected_the_event() {
        let sender = Arc::new(RecordingSender::default());
        let service = service_with(
            vec![
                subscription("c1", "all", &[PAGE_CREATED, PAGE_UPDATED]),
                subscription("c2", "updates", &[PAGE_UPDATED]),
            ],
            sender.clone(),
        )
        .await;

        let delivered = service.notify(page_event(PAGE_CREATED)).await.unwrap();
        assert_eq!(delivered, 1);
        let posts = sender.posts.lock().unwrap().clone();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "c1");
        assert!(posts[0].1.starts_with("A new page [Roadmap]"));
    }

    #[tokio::test]
    async fn failed_post_does_not_stop_delivery() {
        let sender = Arc::new(RecordingSender {
            fail_channel: Some("c1"),
            ..Default::default()
        });
        let service = service_with(
            vec![
                subscription("c1", "a", &[PAGE_UPDATED]),
                subscription("c2", "b", &[PAGE_UPDATED]),
            ],
            sender.clone(),
        )
        .await;

        assert_eq!(service.notify(page_event(PAGE_UPDATED)).await.unwrap(), 1);
        assert_eq!(sender.posts.lock().unwrap()[0].0, "c2");
    }
}
