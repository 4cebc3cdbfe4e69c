pub mod settings;

use crate::models::Configuration;
use crate::state::{self, StateChange};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

pub use settings::Settings;

/// Errors that can occur while reading or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid launcher settings: {0}")]
    Settings(#[from] ::config::ConfigError),
}

/// Read and deserialize a configuration file.
///
/// A missing or unreadable file is [`ConfigError::Io`], malformed JSON is
/// [`ConfigError::Parse`].
pub fn load(path: &Utf8Path) -> Result<Configuration, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loaded configuration from {}", path);
    Ok(config)
}

/// Serialize a configuration with two-space indentation and replace the file.
pub fn save(path: &Utf8Path, config: &Configuration) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Saved configuration to {}", path);
    Ok(())
}

/// Owner of the in-memory [`Configuration`] and its backing file.
///
/// Every mutation goes through [`update()`](Self::update) or
/// [`try_update()`](Self::try_update), which hold the write lock across the
/// persist so a change is only visible once it is on disk. When the write
/// fails the in-memory value is restored and the error returned.
///
/// Does not watch the file. `auto_reload_config` is a stored preference only;
/// [`reload()`](Self::reload) re-reads on demand.
pub struct ConfigStore {
    path: Utf8PathBuf,
    config: Arc<RwLock<Configuration>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl ConfigStore {
    /// Load the configuration at `path` and take ownership of it
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let config = load(&path)?;

        tracing::info!(
            "Loaded config from {} ({} streamers)",
            path,
            config.streamers.len()
        );

        Ok(Self::with_config(path, config))
    }

    /// Wrap an already loaded configuration without touching the disk
    pub fn with_config<P: AsRef<Utf8Path>>(path: P, config: Configuration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config: Arc::new(RwLock::new(config)),
            state_tx: state::channel(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Clone of the current configuration
    pub fn snapshot(&self) -> Configuration {
        self.read(Configuration::clone)
    }

    /// Execute a function with read access to the configuration
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Configuration) -> R,
    {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        f(&config)
    }

    /// Subscribe to configuration change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Apply a mutation and persist it
    ///
    /// # Returns
    /// The change events that were emitted
    ///
    /// # Example
    /// ```ignore
    /// store.update(|config| config.push_streamer("alice"))?;
    /// ```
    pub fn update<F>(&self, update_fn: F) -> Result<Vec<StateChange>, ConfigError>
    where
        F: FnOnce(&mut Configuration),
    {
        self.try_update(|config| {
            update_fn(config);
            Ok::<_, ConfigError>(())
        })
        .map(|((), changes)| changes)
    }

    /// Apply a fallible mutation and persist it.
    ///
    /// If `update_fn` fails nothing is written and the configuration is left
    /// untouched. If the write fails the previous value is restored.
    pub fn try_update<F, T, E>(&self, update_fn: F) -> Result<(T, Vec<StateChange>), E>
    where
        F: FnOnce(&mut Configuration) -> Result<T, E>,
        E: From<ConfigError>,
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let old_config = config.clone();

        let value = match update_fn(&mut *config) {
            Ok(value) => value,
            Err(e) => {
                *config = old_config;
                return Err(e);
            }
        };

        if let Err(e) = save(&self.path, &config) {
            tracing::error!("Rolling back configuration change: {}", e);
            *config = old_config;
            return Err(e.into());
        }

        let changes = state::detect_config_changes(&old_config, &config);
        drop(config);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        Ok((value, changes))
    }

    /// Replace the in-memory configuration with the file contents
    pub fn reload(&self) -> Result<Vec<StateChange>, ConfigError> {
        let fresh = load(&self.path)?;

        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let changes = state::detect_config_changes(&config, &fresh);
        *config = fresh;
        drop(config);

        tracing::info!("Reloaded config from {}", self.path);
        for change in &changes {
            let _ = self.state_tx.send(change.clone());
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (ConfigStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let path = dir.join("config.json");
        save(&path, &Configuration::default()).unwrap();
        let store = ConfigStore::open(&path).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let result = load(&dir.join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let (store, _temp_dir) = create_test_store();
        let contents = fs::read_to_string(store.path()).unwrap();

        assert!(contents.contains("\n  \"youtube-dl_cmd\": \"youtube-dl\""));
        assert!(contents.contains("\"streamers\": []"));
    }

    #[test]
    fn test_update_persists() {
        let (store, _temp_dir) = create_test_store();

        let changes = store.update(|c| c.push_streamer("alice")).unwrap();
        assert_eq!(changes, vec![StateChange::StreamersChanged { count: 1 }]);

        let on_disk = load(store.path()).unwrap();
        assert_eq!(on_disk.streamers, vec!["alice"]);
        assert_eq!(store.snapshot(), on_disk);
    }

    #[test]
    fn test_try_update_error_leaves_config_untouched() {
        let (store, _temp_dir) = create_test_store();

        let result: Result<((), Vec<StateChange>), ConfigError> = store.try_update(|c| {
            c.push_streamer("ghost");
            Err(ConfigError::Serialize(
                serde_json::from_str::<u32>("x").unwrap_err(),
            ))
        });

        assert!(result.is_err());
        assert!(store.read(|c| c.streamers.is_empty()));
        assert!(load(store.path()).unwrap().streamers.is_empty());
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        // Parent directory does not exist, so every write fails
        let store = ConfigStore::with_config(dir.join("missing/config.json"), Configuration::default());

        let result = store.update(|c| c.push_streamer("alice"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
        assert!(store.read(|c| c.streamers.is_empty()));
    }

    #[test]
    fn test_reload_picks_up_external_edit() {
        let (store, _temp_dir) = create_test_store();
        let mut edited = Configuration::default();
        edited.push_streamer("carol");
        save(store.path(), &edited).unwrap();

        let changes = store.reload().unwrap();
        assert_eq!(changes, vec![StateChange::StreamersChanged { count: 1 }]);
        assert_eq!(store.snapshot(), edited);
    }

    #[test]
    fn test_subscribe_receives_changes() {
        let (store, _temp_dir) = create_test_store();
        let mut rx = store.subscribe();

        store
            .update(|c| c.default_export_location = "/tmp/list.txt".to_string())
            .unwrap();

        assert!(matches!(
            rx.try_recv().unwrap(),
            StateChange::ExportLocationChanged { .. }
        ));
    }
}
