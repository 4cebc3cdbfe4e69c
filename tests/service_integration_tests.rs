//! Integration tests for the bootstrap, asset and supervisor services
//!
//! These tests verify:
//! - Bootstrap idempotency and default file contents
//! - Asset materialization into a fresh working directory
//! - The single-instance invariant under concurrent start requests
//! - Launch failures leave the supervisor resumable

use camino::{Utf8Path, Utf8PathBuf};
use mockall::mock;
use rbmanager::services::{
    LaunchError, LaunchReceipt, Launcher, ProcessSupervisor, StartOutcome, SystemLauncher, assets,
    ensure_environment,
};
use rbmanager::{RecordingState, WorkspacePaths, config};
use std::collections::BTreeMap;
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

mock! {
    pub Launcher {}

    impl Launcher for Launcher {
        fn launch(&self, command: &str, args: &[String]) -> Result<LaunchReceipt, LaunchError>;
    }
}

fn create_test_workspace() -> (TempDir, WorkspacePaths) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, WorkspacePaths::new(root))
}

/// File name -> contents for every file under `dir`
fn snapshot_dir(dir: &Utf8Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

fn restart_args() -> Vec<String> {
    vec!["Recordurbate.py".to_string(), "restart".to_string()]
}

#[test]
fn test_bootstrap_twice_matches_once() {
    let (_temp_once, once) = create_test_workspace();
    let (_temp_twice, twice) = create_test_workspace();

    ensure_environment(&once).unwrap();
    let first = ensure_environment(&twice).unwrap();
    let second = ensure_environment(&twice).unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(snapshot_dir(once.config_dir()), snapshot_dir(twice.config_dir()));
}

#[test]
fn test_bootstrap_keeps_user_edits() {
    let (_temp_dir, paths) = create_test_workspace();
    ensure_environment(&paths).unwrap();

    let mut edited = config::load(paths.config_file()).unwrap();
    edited.push_streamer("alice");
    config::save(paths.config_file(), &edited).unwrap();

    ensure_environment(&paths).unwrap();
    assert_eq!(config::load(paths.config_file()).unwrap(), edited);
}

#[test]
fn test_first_run_default_configuration() {
    let (_temp_dir, paths) = create_test_workspace();
    assert!(!paths.config_dir().exists());

    let report = ensure_environment(&paths).unwrap();
    assert!(report.is_clean());

    let config = config::load(paths.config_file()).unwrap();
    assert!(config.streamers.is_empty());
    assert!(config.rate_limit_enabled);
    assert_eq!(config.rate_limit_seconds, 5);
    assert_eq!(config.downloader_command, "youtube-dl");
}

#[test]
fn test_materialize_into_workspace_root() {
    let (_temp_dir, paths) = create_test_workspace();
    ensure_environment(&paths).unwrap();

    let written = assets::materialize(paths.root(), &assets::bundled()).unwrap();

    assert_eq!(written.len(), 4);
    for name in ["bot.py", "config.py", "daemon.py", "Recordurbate.py"] {
        assert!(paths.root().join(name).is_file(), "{name} not written");
    }

    // A second run overwrites in place
    let again = assets::materialize(paths.root(), &assets::bundled()).unwrap();
    assert_eq!(written, again);
}

#[test]
fn test_concurrent_starts_spawn_once() {
    let mut launcher = MockLauncher::new();
    launcher.expect_launch().times(1).returning(|_, _| {
        thread::sleep(Duration::from_millis(50));
        Ok(LaunchReceipt {
            pid: 2024,
            exit_code: 0,
        })
    });

    let supervisor = ProcessSupervisor::new(Arc::new(launcher));
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let supervisor = supervisor.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                supervisor.start("python3", &restart_args()).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<StartOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let launched = outcomes
        .iter()
        .filter(|o| matches!(o, StartOutcome::Launched(_)))
        .count();
    assert_eq!(launched, 1);
    assert_eq!(outcomes.len() - launched, threads - 1);
    assert!(matches!(
        supervisor.state(),
        RecordingState::Running { pid: 2024, .. }
    ));
}

#[test]
fn test_exit_status_failure_is_launch_error() {
    let mut launcher = MockLauncher::new();
    launcher.expect_launch().times(1).returning(|command, _| {
        Err(LaunchError::ExitStatus {
            command: command.to_string(),
            code: Some(2),
        })
    });

    let supervisor = ProcessSupervisor::new(Arc::new(launcher));
    let result = supervisor.start("python3", &restart_args());

    assert!(matches!(
        result,
        Err(LaunchError::ExitStatus { code: Some(2), .. })
    ));
    assert_eq!(supervisor.state(), RecordingState::Idle);
}

#[cfg(unix)]
#[test]
fn test_missing_command_then_valid_command() {
    let (_temp_dir, paths) = create_test_workspace();
    let supervisor = ProcessSupervisor::new(Arc::new(SystemLauncher::new(paths.root())));

    let result = supervisor.start("rbmanager-no-such-interpreter", &restart_args());
    assert!(matches!(result, Err(LaunchError::NotFound { .. })));
    assert!(!supervisor.is_active());

    // `true` ignores its arguments and exits 0
    let outcome = supervisor.start("true", &restart_args()).unwrap();
    assert!(matches!(outcome, StartOutcome::Launched(_)));
    assert!(supervisor.state().is_running());
}
