// rbmanager - runtime bootstrap and process supervisor for the Recordurbate recorder
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::config::{ConfigError, ConfigStore, Settings};
pub use models::{Configuration, RecordingState};
pub use models::paths::WorkspacePaths;
pub use services::{ProcessSupervisor, StartOutcome};
pub use state::StateChange;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
