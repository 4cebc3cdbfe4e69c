// Environment bootstrap
//
// Creates the `configs/` working directory with its default files on first run.
// An existing directory is left alone, whatever state its files are in.

use crate::models::paths::WorkspacePaths;
use crate::models::{Configuration, DEFAULT_DOWNLOADER_CONFIG};
use camino::Utf8PathBuf;
use std::fs;
use thiserror::Error;

/// Fatal bootstrap failure. Only raised when the directory itself cannot be created.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to create working directory {path}: {source}")]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A default file that could not be written
#[derive(Debug)]
pub struct FileFailure {
    pub path: Utf8PathBuf,
    pub error: std::io::Error,
}

/// Outcome of [`ensure_environment`]
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// True if the directory was absent and has been created on this call
    pub created: bool,

    /// Default files written successfully
    pub files_written: Vec<Utf8PathBuf>,

    /// Default files that failed, each attempted independently
    pub failures: Vec<FileFailure>,
}

impl BootstrapReport {
    /// True if nothing failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ensure the working directory exists, creating it and its default files if absent.
///
/// Idempotent: when the directory already exists this is a no-op and does not
/// repair missing or corrupted files inside it. File-level failures are logged
/// and collected in the report rather than aborting the remaining files.
pub fn ensure_environment(paths: &WorkspacePaths) -> Result<BootstrapReport, BootstrapError> {
    let config_dir = paths.config_dir();

    if config_dir.is_dir() {
        tracing::debug!("Working directory {} already present", config_dir);
        return Ok(BootstrapReport::default());
    }

    fs::create_dir_all(config_dir).map_err(|source| BootstrapError::CreateDir {
        path: config_dir.to_path_buf(),
        source,
    })?;

    tracing::info!("Created working directory {}", config_dir);

    let default_config = default_config_json();
    let defaults: [(Utf8PathBuf, &[u8]); 3] = [
        (paths.log_file().to_path_buf(), b"".as_slice()),
        (
            paths.downloader_config_file().to_path_buf(),
            DEFAULT_DOWNLOADER_CONFIG.as_bytes(),
        ),
        (paths.config_file().to_path_buf(), default_config.as_bytes()),
    ];

    let mut report = BootstrapReport {
        created: true,
        ..Default::default()
    };
    write_defaults(&mut report, defaults);

    Ok(report)
}

/// Write each file independently, recording successes and failures in `report`
fn write_defaults<'a>(
    report: &mut BootstrapReport,
    files: impl IntoIterator<Item = (Utf8PathBuf, &'a [u8])>,
) {
    for (path, contents) in files {
        match fs::write(&path, contents) {
            Ok(()) => {
                tracing::debug!("Wrote default {}", path);
                report.files_written.push(path);
            }
            Err(error) => {
                tracing::warn!("Failed to write default {}: {}", path, error);
                report.failures.push(FileFailure { path, error });
            }
        }
    }
}

/// Default `config.json` contents, formatted the same way as a save
fn default_config_json() -> String {
    // Serializing plain strings, bools and integers cannot fail
    serde_json::to_string_pretty(&Configuration::default()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_paths() -> (TempDir, WorkspacePaths) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, WorkspacePaths::new(root))
    }

    #[test]
    fn test_first_run_creates_layout() {
        let (_temp_dir, paths) = temp_paths();

        let report = ensure_environment(&paths).unwrap();
        assert!(report.created);
        assert!(report.is_clean());
        assert_eq!(report.files_written.len(), 3);

        assert!(paths.log_file().exists());
        assert_eq!(fs::read_to_string(paths.log_file()).unwrap(), "");
        assert_eq!(
            fs::read_to_string(paths.downloader_config_file()).unwrap(),
            DEFAULT_DOWNLOADER_CONFIG
        );
    }

    #[test]
    fn test_default_config_deserializes() {
        let (_temp_dir, paths) = temp_paths();
        ensure_environment(&paths).unwrap();

        let config = crate::config::load(paths.config_file()).unwrap();
        assert!(config.streamers.is_empty());
        assert!(config.rate_limit_enabled);
        assert_eq!(config.rate_limit_seconds, 5);
    }

    #[test]
    fn test_existing_directory_is_not_healed() {
        let (_temp_dir, paths) = temp_paths();
        fs::create_dir_all(paths.config_dir()).unwrap();

        let report = ensure_environment(&paths).unwrap();
        assert!(!report.created);
        assert!(report.files_written.is_empty());
        assert!(!paths.config_file().exists());
    }

    #[test]
    fn test_one_failed_file_does_not_stop_the_rest() {
        let (_temp_dir, paths) = temp_paths();
        let root = paths.root();
        let files: [(Utf8PathBuf, &[u8]); 3] = [
            (root.join("rb.log"), b"".as_slice()),
            (root.join("missing").join("youtube-dl.config"), b"-o x".as_slice()),
            (root.join("config.json"), b"{}".as_slice()),
        ];

        let mut report = BootstrapReport::default();
        write_defaults(&mut report, files);

        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].path,
            root.join("missing").join("youtube-dl.config")
        );
        assert_eq!(
            report.files_written,
            vec![root.join("rb.log"), root.join("config.json")]
        );
        assert!(root.join("rb.log").exists());
        assert_eq!(fs::read_to_string(root.join("config.json")).unwrap(), "{}");
    }

    #[test]
    fn test_directory_creation_failure_is_fatal() {
        let (_temp_dir, paths) = temp_paths();
        // A regular file where the root directory should be
        fs::write(paths.root().join("blocker"), "x").unwrap();
        let blocked = WorkspacePaths::new(paths.root().join("blocker"));

        let result = ensure_environment(&blocked);
        assert!(matches!(result, Err(BootstrapError::CreateDir { .. })));
    }
}
