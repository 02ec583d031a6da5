//! Middleware: request identity for the plugin API.

pub mod auth;

pub use auth::PluginUser;
