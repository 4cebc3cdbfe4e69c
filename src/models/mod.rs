//! Data models for rbmanager.
//!
//! - [`Configuration`]: the persisted entity stored in `configs/config.json`. Its
//!   serialized field names are the wire contract shared with the recorder scripts.
//! - [`RecordingState`]: lifecycle of the supervised recorder process, owned
//!   exclusively by [`ProcessSupervisor`](crate::services::ProcessSupervisor).
//! - [`paths`]: the working directory layout.

pub mod config;
pub mod paths;
pub mod recording;

pub use self::config::{Configuration, DEFAULT_DOWNLOADER_CONFIG};
pub use recording::RecordingState;
