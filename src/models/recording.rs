use std::fmt;
use std::time::Instant;

/// Lifecycle of the supervised recorder process.
///
/// `Idle -> Starting -> Running -> Idle`. A failed launch goes from
/// `Starting` straight back to `Idle` so a retry is always possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Nothing launched, or the last launch failed.
    Idle,
    /// A launch is in flight. Other start requests are no-ops.
    Starting,
    /// The launch command completed successfully, or a live recorder was
    /// found in the pid file.
    Running {
        /// Pid of the recorder daemon when its pid file was found, otherwise
        /// of the launch command, which has already exited.
        pid: u32,
        /// When this supervisor saw the recorder come up.
        since: Instant,
    },
}

impl RecordingState {
    /// True while a launch is in flight or has succeeded
    pub fn is_active(&self) -> bool {
        !matches!(self, RecordingState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RecordingState::Running { .. })
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        RecordingState::Idle
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "idle"),
            RecordingState::Starting => write!(f, "starting"),
            RecordingState::Running { pid, since } => {
                write!(f, "running (pid {}, {}s)", pid, since.elapsed().as_secs())
            }
        }
    }
}
