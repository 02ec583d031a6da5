//! Business logic: server-side subscription rules and webhook notifications.

pub mod notification;
pub mod subscription;

pub use notification::NotificationService;
pub use subscription::SubscriptionService;
