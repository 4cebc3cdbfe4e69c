// State change events
//
// The configuration store and the process supervisor each own their state behind
// a lock and announce mutations on a tokio broadcast channel, so a presentation
// layer can refresh without polling.

use crate::models::{Configuration, RecordingState};
use tokio::sync::broadcast;

/// Buffer size for every change channel
pub const CHANNEL_CAPACITY: usize = 100;

/// Change events emitted when owned state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The streamer list was edited
    StreamersChanged { count: usize },

    /// The default export location changed
    ExportLocationChanged { location: String },

    /// Any other configuration field changed
    SettingsChanged,

    /// The recorder process moved to a new lifecycle state
    RecordingStateChanged { state: RecordingState },
}

/// Create the sender half of a change channel
pub fn channel() -> broadcast::Sender<StateChange> {
    let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
    tx
}

/// Detect what changed between two configurations and generate events
pub fn detect_config_changes(old: &Configuration, new: &Configuration) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.streamers != new.streamers {
        changes.push(StateChange::StreamersChanged {
            count: new.streamers.len(),
        });
    }

    if old.default_export_location != new.default_export_location {
        changes.push(StateChange::ExportLocationChanged {
            location: new.default_export_location.clone(),
        });
    }

    if old.downloader_command != new.downloader_command
        || old.downloader_config_path != new.downloader_config_path
        || old.auto_reload_config != new.auto_reload_config
        || old.rate_limit_enabled != new.rate_limit_enabled
        || old.rate_limit_seconds != new.rate_limit_seconds
    {
        changes.push(StateChange::SettingsChanged);
    }

    changes
}
