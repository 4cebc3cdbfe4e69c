//! Services module - the runtime bootstrap and process supervision logic.
//!
//! Everything here is free of presentation concerns and takes explicit paths,
//! so it runs the same from the CLI and from tests.
//!
//! # Components
//!
//! - [`bootstrap`]: idempotently creates `configs/` with its default files and
//!   reports file-level failures without aborting.
//! - [`assets`]: writes the bundled recorder scripts next to the working
//!   directory so the interpreter can run them.
//! - [`pidfile`]: reads the pid the recorder daemon leaves in `configs/rb.pid`.
//! - [`ProcessSupervisor`]: launches the recorder under a single-instance
//!   guard and tracks its [`RecordingState`](crate::models::RecordingState).
//!
//! # Startup order
//!
//! 1. [`bootstrap::ensure_environment`]
//! 2. [`assets::materialize`] with [`assets::bundled`]
//! 3. [`ConfigStore::open`](crate::config::ConfigStore::open)
//! 4. [`ProcessSupervisor::adopt`] when [`pidfile::running_pid`] finds a live recorder
//! 5. [`ProcessSupervisor::start`] on demand

pub mod assets;
pub mod bootstrap;
pub mod pidfile;
pub mod supervisor;

pub use assets::{AssetBundle, MaterializeError};
pub use bootstrap::{BootstrapError, BootstrapReport, ensure_environment};
pub use supervisor::{
    LaunchError, LaunchReceipt, Launcher, ProcessSupervisor, StartOutcome, SystemLauncher,
};
