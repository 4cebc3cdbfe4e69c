use camino::{Utf8Path, Utf8PathBuf};

/// Name of the working directory created by the bootstrapper
pub const CONFIG_DIR_NAME: &str = "configs";

/// Resolved locations of every file in the working directory.
///
/// All paths hang off a single root so tests can point the whole layout
/// at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: Utf8PathBuf,
    config_dir: Utf8PathBuf,
    config_file: Utf8PathBuf,
    downloader_config_file: Utf8PathBuf,
    log_file: Utf8PathBuf,
    pid_file: Utf8PathBuf,
    settings_file: Utf8PathBuf,
}

impl WorkspacePaths {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let config_dir = root.join(CONFIG_DIR_NAME);

        Self {
            config_file: config_dir.join("config.json"),
            downloader_config_file: config_dir.join("youtube-dl.config"),
            log_file: config_dir.join("rb.log"),
            pid_file: config_dir.join("rb.pid"),
            settings_file: config_dir.join("manager.yaml"),
            config_dir,
            root,
        }
    }

    /// Directory the recorder scripts are materialized into and run from
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    pub fn downloader_config_file(&self) -> &Utf8Path {
        &self.downloader_config_file
    }

    pub fn log_file(&self) -> &Utf8Path {
        &self.log_file
    }

    /// Written by the recorder daemon while it runs, never by the manager
    pub fn pid_file(&self) -> &Utf8Path {
        &self.pid_file
    }

    /// Optional launcher settings file, never created by the bootstrapper
    pub fn settings_file(&self) -> &Utf8Path {
        &self.settings_file
    }

    /// Resolve a path from the configuration relative to the root
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
