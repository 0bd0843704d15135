//! Runtime settings service for a campaign mailer.
//!
//! Serves the single settings document over HTTP, validates and persists
//! updates, and reloads the running process when it is safe to do so.

pub mod admin;
pub mod campaigns;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod settings;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use reload::ReloadCoordinator;
pub use settings::Settings;
