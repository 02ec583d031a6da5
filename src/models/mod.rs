//! Data models for subscriptions, credentials, events, webhooks and validation results.

pub mod credential;
pub mod event;
pub mod notification;
pub mod subscription;
pub mod validation;

pub use credential::*;
pub use event::*;
pub use notification::*;
pub use subscription::*;
pub use validation::*;
