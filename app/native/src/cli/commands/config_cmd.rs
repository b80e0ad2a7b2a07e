//! Config CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{config_paths, load_config_from_path};
use crate::error::DeskshellError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a configuration file with every option documented.
    ///
    /// Options are commented out, so the file starts out equivalent to the
    /// built-in defaults.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  deskshell config init              # Create config at default location
  deskshell config init --force      # Overwrite existing config
  deskshell config init --path ./desk.jsonc
  deskshell config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/deskshell/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show where configuration files are searched for.
    Path,

    /// Parse a configuration file and report problems.
    Check {
        /// File to check. Defaults to the active configuration file.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), DeskshellError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
        ConfigCommands::Check { path } => {
            let target = path.clone().or_else(active_config_path).ok_or_else(|| {
                DeskshellError::ConfigError(
                    "No configuration file found. Run 'deskshell config init' to create one."
                        .to_string(),
                )
            })?;
            check_config(&target)
        }
    }
}

/// First existing file in the search order.
fn active_config_path() -> Option<PathBuf> { config_paths().into_iter().find(|p| p.exists()) }

fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), DeskshellError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(DeskshellError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        DeskshellError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    tracing::info!(path = %config_path.display(), "config: created configuration file");
    println!("Configuration file created at: {}", config_path.display());
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let active = active_config_path();
    for (i, path) in config_paths().iter().enumerate() {
        let marker = if active.as_ref() == Some(path) {
            " (active)".green().to_string()
        } else if path.exists() {
            " (exists)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }

    if active.is_none() {
        println!("\nNo configuration file found; built-in defaults are used.");
        println!("Run 'deskshell config init' to create one.");
    }
}

fn check_config(path: &Path) -> Result<(), DeskshellError> {
    let (config, _) = load_config_from_path(path)?;
    let templates = config.grid.templates.len();

    println!("{} {}", "✓".green(), path.display());
    println!(
        "  snap threshold {}px, release {}px, {} grid template(s), {} configured monitor name(s)",
        config.snap.threshold,
        config.snap.release_distance,
        templates,
        config.monitors.names.len()
    );
    Ok(())
}
