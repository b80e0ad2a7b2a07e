//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file management
//! - `simulate` - Replays a command script against an in-memory desktop
//! - `templates` - Lists the configured grid templates

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, DeskshellConfig};
use crate::error::DeskshellError;

pub mod config_cmd;
pub mod simulate;
pub mod templates;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deskshell CLI - window layout engine for browser desktops.
#[derive(Parser, Debug)]
#[command(name = "deskshell")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Configuration file management commands.
    ///
    /// Initialize, locate, and describe the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Replay a JSON command script and print the resulting desktop.
    ///
    /// The script is an array of commands such as
    /// `{ "op": "open", "componentId": "notepad" }`. Each command is applied
    /// in order, then windows, groups and monitors are printed along with any
    /// invariant violations.
    #[command(after_long_help = r#"Examples:
  deskshell simulate session.json
  deskshell simulate session.json --json
  deskshell simulate session.json --events
  cat session.json | deskshell simulate -"#)]
    Simulate {
        /// Path to the script, or `-` to read from stdin.
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output the final state as JSON.
        #[arg(long, short)]
        json: bool,

        /// Include the emitted change events.
        #[arg(long, short)]
        events: bool,
    },

    /// List the grid layout templates.
    ///
    /// Shows built-in and configured templates with their cells.
    Templates {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Output Deskshell configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(deskshell completions --shell zsh)"
    ///   deskshell completions --shell fish > ~/.config/fish/completions/deskshell.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Loads the configuration the command should run with.
    fn load_config(&self) -> Result<DeskshellConfig, DeskshellError> {
        let custom = self.config_path();
        if let Some(path) = &custom
            && !path.exists()
        {
            return Err(DeskshellError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let (config, _) = config::load_or_default(custom.as_deref())?;
        Ok(config)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), DeskshellError> {
        match &self.command {
            Commands::Config(cmd) => config_cmd::execute(cmd),

            Commands::Simulate { script, json, events } => {
                let config = self.load_config()?;
                simulate::execute(config, script, *json, *events)
            }

            Commands::Templates { json } => {
                let config = self.load_config()?;
                templates::execute(&config, *json)
            }

            Commands::Schema => {
                println!("{}", crate::schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "deskshell", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_verifies() { Cli::command().debug_assert(); }

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["deskshell", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from(["deskshell", "simulate", "session.json", "--json"]).unwrap();
        match cli.command {
            Commands::Simulate { script, json, events } => {
                assert_eq!(script, PathBuf::from("session.json"));
                assert!(json);
                assert!(!events);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_simulate_requires_script() {
        assert!(Cli::try_parse_from(["deskshell", "simulate"]).is_err());
    }

    #[test]
    fn test_cli_parses_global_config() {
        let cli = Cli::try_parse_from(["deskshell", "templates", "-c", "/tmp/desk.jsonc"]).unwrap();
        assert_eq!(cli.config_path(), Some(PathBuf::from("/tmp/desk.jsonc")));
        assert!(matches!(cli.command, Commands::Templates { json: false }));
    }

    #[test]
    fn test_cli_parses_config_init() {
        let cli = Cli::try_parse_from(["deskshell", "config", "init", "--force", "--stdout"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: true, stdout: true, path: None })
        ));
    }

    #[test]
    fn test_cli_parses_completions() {
        let cli = Cli::try_parse_from(["deskshell", "completions", "--shell", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["deskshell", "tile"]).is_err());
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let cli = Cli::try_parse_from([
            "deskshell",
            "templates",
            "--config",
            "/nonexistent/deskshell/config.jsonc",
        ])
        .unwrap();
        let err = cli.execute().unwrap_err();
        assert!(matches!(err, DeskshellError::ConfigError(_)));
    }
}
