// Rickdex - browse Rick and Morty characters and episodes
//
// Library crate with the models, state management, GraphQL services and UI glue.
// The binary crate (main.rs) wires them together and opens the window.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::QueryMetrics;
pub use models::{AppConfig, AppState, FetchPolicy};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
