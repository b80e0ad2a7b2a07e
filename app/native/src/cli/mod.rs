//! CLI module for Deskshell.
//!
//! The engine has no platform of its own, so the command line works on
//! configuration files and replays scripted [`DesktopCommand`] sequences
//! against an in-memory desktop.
//!
//! [`DesktopCommand`]: crate::desktop::DesktopCommand

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::DeskshellError;

/// Runs the CLI.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), DeskshellError> {
    let cli = Cli::parse();
    cli.execute()
}
