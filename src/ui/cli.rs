use super::controller::{ControlError, Controller};
use crate::services::StartOutcome;
use anyhow::Result;
use camino::Utf8Path;
use clap::{Parser, Subcommand, ValueEnum};

/// Manage the Recordurbate streamer list and recorder process
#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Args {
    /// Directory holding `configs/` and the recorder scripts
    #[arg(short = 'C', long, default_value = ".")]
    pub root: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the recorder state and the streamer list (default)
    Status,

    /// List monitored streamers with their positions
    List,

    /// Add a streamer to the end of the list
    Add { name: String },

    /// Remove the streamer at a position shown by `list` (1-based)
    Remove { position: usize },

    /// Set the default export location
    ExportLocation { location: String },

    /// Enable or disable rate limiting, optionally setting the interval
    RateLimit {
        state: Toggle,
        seconds: Option<u32>,
    },

    /// Enable or disable the auto reload preference
    AutoReload { state: Toggle },

    /// Set the downloader binary and the path of its config file
    Downloader { command: String, config_path: String },

    /// Write the streamer list to a file (default: configured export location)
    Export { path: Option<String> },

    /// Restart the recorder process
    Restart,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

/// Convert a 1-based list position into a selection
pub fn selection_from_position(position: usize) -> Option<usize> {
    position.checked_sub(1)
}

/// Execute one subcommand against the controller
pub fn dispatch(
    controller: &Controller,
    command: Command,
    runtime: &tokio::runtime::Handle,
) -> Result<()> {
    match command {
        Command::Status => {
            println!("recorder: {}", controller.recording_state());
            print_streamers(controller);
        }
        Command::List => print_streamers(controller),
        Command::Add { name } => {
            controller.add_streamer(&name)?;
            println!("added {}", name.trim());
        }
        Command::Remove { position } => {
            match controller.remove_streamer(selection_from_position(position)) {
                Ok(removed) => println!("removed {}", removed),
                Err(ControlError::NoSelection) => {
                    println!("No streamer selected");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::ExportLocation { location } => {
            controller.set_export_location(&location)?;
            println!("export location set to {}", location);
        }
        Command::RateLimit { state, seconds } => {
            controller.set_rate_limit(state.enabled(), seconds)?;
            let config = controller.store().snapshot();
            println!(
                "rate limit {} ({}s)",
                if config.rate_limit_enabled { "on" } else { "off" },
                config.rate_limit_seconds
            );
        }
        Command::AutoReload { state } => {
            controller.set_auto_reload(state.enabled())?;
            println!("auto reload {}", if state.enabled() { "on" } else { "off" });
        }
        Command::Downloader {
            command,
            config_path,
        } => {
            controller.set_downloader(&command, &config_path)?;
            println!("downloader set to {} ({})", command, config_path);
        }
        Command::Export { path } => {
            let written = controller.export_streamers(path.as_deref().map(Utf8Path::new))?;
            println!("exported to {}", written);
        }
        Command::Restart => match runtime.block_on(controller.restart_recording())? {
            StartOutcome::Launched(receipt) => {
                println!("recorder restarted (pid {})", receipt.pid);
            }
            StartOutcome::AlreadyActive => println!("recorder already active"),
        },
    }

    Ok(())
}

fn print_streamers(controller: &Controller) {
    let streamers = controller.list_streamers();
    if streamers.is_empty() {
        println!("no streamers");
        return;
    }

    for (i, name) in streamers.iter().enumerate() {
        println!("{:>3}  {}", i + 1, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_position() {
        assert_eq!(selection_from_position(0), None);
        assert_eq!(selection_from_position(1), Some(0));
        assert_eq!(selection_from_position(3), Some(2));
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["rbmanager", "add", "alice"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Add {
                name: "alice".to_string()
            })
        );
        assert_eq!(args.root, ".");

        let args = Args::try_parse_from(["rbmanager", "-C", "/srv/rb", "rate-limit", "off", "10"])
            .unwrap();
        assert_eq!(args.root, "/srv/rb");
        assert_eq!(
            args.command,
            Some(Command::RateLimit {
                state: Toggle::Off,
                seconds: Some(10)
            })
        );

        let args = Args::try_parse_from(["rbmanager"]).unwrap();
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_restart_takes_no_arguments() {
        assert!(Args::try_parse_from(["rbmanager", "restart", "alice"]).is_err());
    }
}
