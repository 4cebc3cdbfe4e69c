// Recorder pid file
//
// The recorder daemon writes its pid to `configs/rb.pid` once it has detached
// and removes the file when it exits. Reading it lets a fresh manager process
// see a recorder started by an earlier invocation.

use camino::Utf8Path;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pid stored in `path`, if the file exists and holds one
pub fn read_pid(path: &Utf8Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    contents.trim().parse().ok()
}

/// True if a process with this pid exists.
///
/// Checked through `/proc`; other platforms assume the pid is alive.
#[cfg(target_os = "linux")]
pub fn is_alive(pid: u32) -> bool {
    pid != 0 && Utf8Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(not(target_os = "linux"))]
pub fn is_alive(pid: u32) -> bool {
    pid != 0
}

/// Pid of a live recorder. A file left behind by a killed daemon is ignored.
pub fn running_pid(path: &Utf8Path) -> Option<u32> {
    let pid = read_pid(path)?;
    if is_alive(pid) {
        Some(pid)
    } else {
        tracing::debug!("Ignoring stale pid file {} (pid {})", path, pid);
        None
    }
}

/// Poll until the pid file names a live process or `timeout` runs out.
///
/// The daemon detaches before it writes the file, so the file may appear
/// shortly after the launch command has exited.
pub fn wait_for_pid(path: &Utf8Path, timeout: Duration) -> Option<u32> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(pid) = running_pid(path) {
            return Some(pid);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
