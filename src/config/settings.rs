use super::ConfigError;
use ::config::{Config, Environment, File, FileFormat};
use camino::Utf8Path;
use serde::Deserialize;

/// Prefix for environment variable overrides, e.g. `RBM_INTERPRETER=python`
pub const ENV_PREFIX: &str = "RBM";

/// Launcher settings for the manager itself.
///
/// Kept apart from [`Configuration`](crate::models::Configuration), whose keys are
/// shared with the recorder scripts. Layered from built-in defaults, an optional
/// `configs/manager.yaml`, then `RBM_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Executable used to run the recorder entry point
    pub interpreter: String,

    /// Materialized asset passed as the first argument
    pub entry_point: String,

    /// Subcommand token passed after the entry point
    pub restart_subcommand: String,

    /// Log at debug level
    pub debug: bool,

    /// Mirror log output to the console
    pub console_log: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            entry_point: crate::services::assets::ENTRY_POINT.to_string(),
            restart_subcommand: "restart".to_string(),
            debug: false,
            console_log: false,
        }
    }
}

impl Settings {
    /// Load settings, reading `settings_file` if it exists
    pub fn load(settings_file: &Utf8Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("interpreter", defaults.interpreter)?
            .set_default("entry_point", defaults.entry_point)?
            .set_default("restart_subcommand", defaults.restart_subcommand)?
            .set_default("debug", defaults.debug)?
            .set_default("console_log", defaults.console_log)?
            .add_source(File::new(settings_file.as_str(), FileFormat::Yaml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        tracing::debug!("Launcher settings: {:?}", settings);
        Ok(settings)
    }

    /// Arguments passed to the interpreter for a restart
    pub fn restart_args(&self) -> Vec<String> {
        vec![self.entry_point.clone(), self.restart_subcommand.clone()]
    }
}
