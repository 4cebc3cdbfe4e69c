// Controller - the control surface over the configuration store and supervisor
//
// Every user action maps to one method here. Mutations go through the
// ConfigStore so they are on disk before they are reported as done; recorder
// launches go through the ProcessSupervisor and run on the tokio blocking pool.

use crate::config::{ConfigError, ConfigStore, Settings};
use crate::metrics::Metrics;
use crate::models::RecordingState;
use crate::models::paths::WorkspacePaths;
use crate::services::{LaunchError, ProcessSupervisor, StartOutcome};
use crate::state::StateChange;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported to the user for a control action
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("No streamer selected")]
    NoSelection,

    #[error("Streamer name is empty")]
    EmptyStreamer,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to export streamers to {path}: {source}")]
    Export {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Control surface that wires user actions to the store and supervisor
///
/// # Example
/// ```ignore
/// let controller = Controller::new(paths, settings, store, supervisor);
/// controller.add_streamer("alice")?;
/// controller.restart_recording().await?;
/// ```
pub struct Controller {
    paths: WorkspacePaths,
    settings: Settings,
    store: Arc<ConfigStore>,
    supervisor: ProcessSupervisor,
    metrics: Arc<Metrics>,
}

impl Controller {
    pub fn new(
        paths: WorkspacePaths,
        settings: Settings,
        store: Arc<ConfigStore>,
        supervisor: ProcessSupervisor,
    ) -> Self {
        Self {
            paths,
            settings,
            store,
            supervisor,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Streamers in display order
    pub fn list_streamers(&self) -> Vec<String> {
        self.store.read(|c| c.streamers.clone())
    }

    pub fn recording_state(&self) -> RecordingState {
        self.supervisor.state()
    }

    /// Append a streamer and persist. Surrounding whitespace is trimmed.
    pub fn add_streamer(&self, name: &str) -> Result<Vec<StateChange>, ControlError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ControlError::EmptyStreamer);
        }

        let changes = self.commit(|config| {
            config.push_streamer(name);
            Ok(())
        })?;

        tracing::info!("Added streamer {}", name);
        Ok(changes)
    }

    /// Remove the streamer at the selected position and persist.
    ///
    /// No selection, or a position past the end of the list, is
    /// [`ControlError::NoSelection`] and leaves the list untouched.
    ///
    /// # Returns
    /// The removed streamer
    pub fn remove_streamer(&self, selection: Option<usize>) -> Result<String, ControlError> {
        let index = selection.ok_or(ControlError::NoSelection)?;

        let mut removed = String::new();
        self.commit(|config| {
            removed = config
                .remove_streamer_at(index)
                .ok_or(ControlError::NoSelection)?;
            Ok(())
        })?;

        tracing::info!("Removed streamer {} at position {}", removed, index);
        Ok(removed)
    }

    pub fn set_export_location(&self, location: &str) -> Result<Vec<StateChange>, ControlError> {
        self.commit(|config| {
            config.default_export_location = location.to_string();
            Ok(())
        })
    }

    /// Toggle rate limiting, optionally changing the interval
    pub fn set_rate_limit(
        &self,
        enabled: bool,
        seconds: Option<u32>,
    ) -> Result<Vec<StateChange>, ControlError> {
        self.commit(|config| {
            config.rate_limit_enabled = enabled;
            if let Some(seconds) = seconds {
                config.rate_limit_seconds = seconds;
            }
            Ok(())
        })
    }

    pub fn set_auto_reload(&self, enabled: bool) -> Result<Vec<StateChange>, ControlError> {
        self.commit(|config| {
            config.auto_reload_config = enabled;
            Ok(())
        })
    }

    /// Change the downloader binary and the path of its own config file
    pub fn set_downloader(
        &self,
        command: &str,
        config_path: &str,
    ) -> Result<Vec<StateChange>, ControlError> {
        self.commit(|config| {
            config.downloader_command = command.to_string();
            config.downloader_config_path = config_path.to_string();
            Ok(())
        })
    }

    /// Write the streamer list, one per line.
    ///
    /// Without `destination` the configured default export location is used,
    /// resolved against the workspace root.
    pub fn export_streamers(
        &self,
        destination: Option<&Utf8Path>,
    ) -> Result<Utf8PathBuf, ControlError> {
        let (streamers, default_location) = self
            .store
            .read(|c| (c.streamers.clone(), c.default_export_location.clone()));

        let path = match destination {
            Some(path) => path.to_path_buf(),
            None => self.paths.resolve(&default_location),
        };

        let mut contents = streamers.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        fs::write(&path, contents).map_err(|source| ControlError::Export {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Exported {} streamers to {}", streamers.len(), path);
        Ok(path)
    }

    /// Restart the recorder.
    ///
    /// Parameterless: there is a single recorder process, not one per
    /// streamer. Runs the launch on the blocking pool; a no-op while the
    /// recorder is already starting or running.
    pub async fn restart_recording(&self) -> Result<StartOutcome, ControlError> {
        let result = self
            .supervisor
            .start_async(
                self.settings.interpreter.clone(),
                self.settings.restart_args(),
            )
            .await;

        match &result {
            Ok(StartOutcome::Launched(_)) => self.metrics.record_launch_succeeded(),
            Ok(StartOutcome::AlreadyActive) => self.metrics.record_launch_skipped(),
            Err(_) => self.metrics.record_launch_failed(),
        }

        Ok(result?)
    }

    /// Mark the recorder as stopped so it can be started again
    pub fn mark_recording_stopped(&self) -> bool {
        self.supervisor.stop()
    }

    /// Apply a mutation through the store and count the write
    fn commit<F>(&self, update_fn: F) -> Result<Vec<StateChange>, ControlError>
    where
        F: FnOnce(&mut crate::models::Configuration) -> Result<(), ControlError>,
    {
        match self.store.try_update(update_fn) {
            Ok(((), changes)) => {
                self.metrics.record_config_save();
                Ok(changes)
            }
            Err(ControlError::Config(e)) => {
                self.metrics.record_config_save_failure();
                tracing::error!("Configuration change not saved: {}", e);
                Err(ControlError::Config(e))
            }
            Err(e) => Err(e),
        }
    }
}
