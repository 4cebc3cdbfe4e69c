// Control surface
//
// `controller` holds the actions a user can trigger; `cli` maps command line
// subcommands onto them.

pub mod cli;
pub mod controller;

pub use cli::{Args, Command};
pub use controller::{ControlError, Controller};
