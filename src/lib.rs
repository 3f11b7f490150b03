// I.D.T.F.E - Integrated Developer Tools for Efficiency
//
// This is the library crate containing the dashboard backend: services,
// models, configuration and the HTTP surface.
// The binary crate (main.rs) wires them together and serves.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod server;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, EnvFileStore, SecretStore};
pub use metrics::Metrics;
pub use models::{ActionRequest, ActionResponse, AppConfig};
pub use server::{AppState, build_router};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
