//! Storage for channel subscriptions.

pub mod subscription_repo;

pub use subscription_repo::{combination_key, SubscriptionIndex, SubscriptionRepository};
