//! Error types for Deskshell.
//!
//! Each engine concern has its own `thiserror` enum. This module provides the
//! crate-level error the CLI returns, with conversions from each of them.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::desktop::{GridError, GroupError, RegistryError};

/// Errors surfaced by the command-line interface.
///
/// Serializes as `{ "kind": ..., "message": ... }` for `--json` output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum DeskshellError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// A simulation script could not be read or parsed.
    #[error("Script error: {0}")]
    ScriptError(String),
    /// A layout operation failed.
    #[error("Layout error: {0}")]
    LayoutError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DeskshellError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for DeskshellError {
    fn from(err: serde_json::Error) -> Self { Self::ScriptError(err.to_string()) }
}

impl From<ConfigError> for DeskshellError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<GridError> for DeskshellError {
    fn from(err: GridError) -> Self { Self::LayoutError(err.to_string()) }
}

impl From<GroupError> for DeskshellError {
    fn from(err: GroupError) -> Self { Self::LayoutError(err.to_string()) }
}

impl From<RegistryError> for DeskshellError {
    fn from(err: RegistryError) -> Self { Self::LayoutError(err.to_string()) }
}
