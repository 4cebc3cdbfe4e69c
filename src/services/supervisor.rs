use super::pidfile;
use crate::models::RecordingState;
use crate::state::{self, StateChange};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors that can occur while launching the recorder
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Command not found: {command}")]
    NotFound { command: String },

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with status {code:?}")]
    ExitStatus { command: String, code: Option<i32> },

    #[error("Launch task aborted: {0}")]
    Aborted(String),
}

/// How long a launch waits for the detached recorder to write its pid file
pub const PID_FILE_TIMEOUT: Duration = Duration::from_secs(2);

/// Details of a completed launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchReceipt {
    /// Recorder daemon pid read from the pid file, or the pid of the launch
    /// command itself when no pid file appeared
    pub pid: u32,
    pub exit_code: i32,
}

/// Result of a start request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The command ran and the supervisor is now running
    Launched(LaunchReceipt),
    /// A launch was already in flight or done; nothing happened
    AlreadyActive,
}

/// Runs an external command to completion.
///
/// This is the seam between the supervisor's state machine and the operating
/// system, so tests can count or fail launches without spawning anything.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher: Send + Sync {
    fn launch(&self, command: &str, args: &[String]) -> Result<LaunchReceipt, LaunchError>;
}

/// [`Launcher`] backed by `std::process::Command`.
///
/// The child inherits stdout/stderr, so its output is not captured.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    working_dir: Utf8PathBuf,
    pid_file: Option<Utf8PathBuf>,
}

impl SystemLauncher {
    pub fn new<P: AsRef<Utf8Path>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            pid_file: None,
        }
    }

    /// After a successful launch, report the pid the daemon writes here
    pub fn with_pid_file<P: AsRef<Utf8Path>>(mut self, pid_file: P) -> Self {
        self.pid_file = Some(pid_file.as_ref().to_path_buf());
        self
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, command: &str, args: &[String]) -> Result<LaunchReceipt, LaunchError> {
        let mut child = Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    LaunchError::NotFound {
                        command: command.to_string(),
                    }
                } else {
                    LaunchError::Spawn {
                        command: command.to_string(),
                        source,
                    }
                }
            })?;

        let child_pid = child.id();
        tracing::debug!("Spawned {} with pid {}", command, child_pid);

        let status = child.wait().map_err(|source| LaunchError::Wait {
            command: command.to_string(),
            source,
        })?;

        match status.code() {
            Some(0) => {
                let pid = self
                    .pid_file
                    .as_deref()
                    .and_then(|path| pidfile::wait_for_pid(path, PID_FILE_TIMEOUT))
                    .unwrap_or(child_pid);
                Ok(LaunchReceipt { pid, exit_code: 0 })
            }
            code => Err(LaunchError::ExitStatus {
                command: command.to_string(),
                code,
            }),
        }
    }
}

/// Single-instance guard around the recorder process.
///
/// Owns the [`RecordingState`]. The `Idle -> Starting` transition happens under
/// the mutex, so of any number of concurrent [`start()`](Self::start) calls
/// exactly one reaches the launcher. The launch itself runs with the lock
/// released; the result moves the state to `Running` or back to `Idle`.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct ProcessSupervisor {
    launcher: Arc<dyn Launcher>,
    state: Arc<Mutex<RecordingState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl ProcessSupervisor {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            launcher,
            state: Arc::new(Mutex::new(RecordingState::Idle)),
            state_tx: state::channel(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RecordingState {
        *self.lock()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_active()
    }

    /// Subscribe to recording state changes
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Launch `command` unless a launch is already in flight or done.
    ///
    /// Blocks until the command exits. A failed launch returns the state to
    /// `Idle` so the caller can retry.
    pub fn start(&self, command: &str, args: &[String]) -> Result<StartOutcome, LaunchError> {
        {
            let mut state = self.lock();
            if state.is_active() {
                tracing::debug!("Recorder already {}, ignoring start request", *state);
                return Ok(StartOutcome::AlreadyActive);
            }
            *state = RecordingState::Starting;
        }
        self.emit(RecordingState::Starting);

        tracing::info!("Launching recorder: {} {}", command, args.join(" "));

        match self.launcher.launch(command, args) {
            Ok(receipt) => {
                let running = RecordingState::Running {
                    pid: receipt.pid,
                    since: Instant::now(),
                };
                self.transition(running);
                tracing::info!("Recorder launched (pid {})", receipt.pid);
                Ok(StartOutcome::Launched(receipt))
            }
            Err(e) => {
                self.transition(RecordingState::Idle);
                tracing::error!("Recorder launch failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run [`start()`](Self::start) on the blocking thread pool
    pub async fn start_async(
        &self,
        command: String,
        args: Vec<String>,
    ) -> Result<StartOutcome, LaunchError> {
        let supervisor = self.clone();

        tokio::task::spawn_blocking(move || supervisor.start(&command, &args))
            .await
            .map_err(|e| LaunchError::Aborted(e.to_string()))?
    }

    /// Take over a recorder that is already running, e.g. one started by an
    /// earlier invocation. Only applies while `Idle`.
    ///
    /// # Returns
    /// True if the state changed
    pub fn adopt(&self, pid: u32) -> bool {
        let mut state = self.lock();
        if state.is_active() {
            return false;
        }

        let running = RecordingState::Running {
            pid,
            since: Instant::now(),
        };
        *state = running;
        drop(state);

        tracing::info!("Recorder already running (pid {})", pid);
        self.emit(running);
        true
    }

    /// [`adopt()`](Self::adopt) the recorder named by `pid_file` if it is alive
    ///
    /// # Returns
    /// The adopted pid
    pub fn adopt_from_pid_file(&self, pid_file: &Utf8Path) -> Option<u32> {
        let pid = pidfile::running_pid(pid_file)?;
        self.adopt(pid).then_some(pid)
    }

    /// Mark a running recorder as gone.
    ///
    /// The process is not signalled; this only returns the state machine to
    /// `Idle` so a later start is possible. Has no effect while a launch is
    /// in flight.
    ///
    /// # Returns
    /// True if the state changed
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        let RecordingState::Running { pid, .. } = *state else {
            return false;
        };
        *state = RecordingState::Idle;
        drop(state);

        tracing::info!("Recorder (pid {}) marked as stopped", pid);
        self.emit(RecordingState::Idle);
        true
    }

    fn transition(&self, next: RecordingState) {
        *self.lock() = next;
        self.emit(next);
    }

    fn emit(&self, state: RecordingState) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self
            .state_tx
            .send(StateChange::RecordingStateChanged { state });
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
