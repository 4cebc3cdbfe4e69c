//! rbmanager - command line entry point.
//!
//! # Execution Flow
//!
//! 1. Bootstrap `configs/` (fatal only if the directory cannot be created)
//! 2. Load launcher settings (`configs/manager.yaml`, `RBM_*` env vars)
//! 3. Initialize logging → appends to `configs/rb.log`, console only if it can't be opened
//! 4. Materialize the bundled recorder scripts into the root directory
//! 5. Load `configs/config.json` (fatal on failure)
//! 6. Create the tokio runtime used for offloading launches
//!    and pick up a recorder already running from `configs/rb.pid`
//! 7. Dispatch the requested subcommand through the [`Controller`]
//! 8. Log the metrics summary and shut the runtime down

use anyhow::{Context, Result};
use clap::Parser;
use rbmanager::logging;
use rbmanager::services::{SystemLauncher, assets, ensure_environment};
use rbmanager::ui::{Args, Command, Controller, cli};
use rbmanager::{APP_NAME, ConfigStore, ProcessSupervisor, Settings, VERSION, WorkspacePaths};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = WorkspacePaths::new(&args.root);

    let report = ensure_environment(&paths).context("Failed to initialize working directory")?;

    let settings = Settings::load(paths.settings_file()).context("Failed to load launcher settings")?;

    let _guard = match logging::setup_logging(
        paths.log_file(),
        settings.debug,
        settings.console_log,
    ) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::setup_console_logging(settings.debug)?;
            tracing::warn!("File logging unavailable, logging to console: {:#}", e);
            None
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    if report.created {
        tracing::info!(
            "Bootstrapped {} ({} default files written)",
            paths.config_dir(),
            report.files_written.len()
        );
    }
    if !report.is_clean() {
        tracing::warn!("Bootstrap finished with {} failures", report.failures.len());
    }
    for failure in &report.failures {
        tracing::warn!("Bootstrap could not write {}: {}", failure.path, failure.error);
    }

    assets::materialize(paths.root(), &assets::bundled())
        .context("Failed to write embedded files")?;

    let store = Arc::new(
        ConfigStore::open(paths.config_file()).context("Failed to load config")?,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("rbmanager-worker")
        .build()?;

    let launcher = SystemLauncher::new(paths.root()).with_pid_file(paths.pid_file());
    let supervisor = ProcessSupervisor::new(Arc::new(launcher));
    supervisor.adopt_from_pid_file(paths.pid_file());
    let controller = Controller::new(paths, settings, store, supervisor);

    let result = cli::dispatch(
        &controller,
        args.command.unwrap_or(Command::Status),
        runtime.handle(),
    );

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }

    controller.metrics().log_summary();
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Shutdown complete");
    result
}
