//! Configuration module for Deskshell.
//!
//! Configuration is loaded once by the host and passed explicitly into
//! `Desktop::new`. Nothing in the engine reads it from a global.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, DeskshellConfig, EventsConfig, GridCellConfig, GridConfig, GridTemplateConfig,
    InteractionConfig, MonitorsConfig, SnapConfig, WindowsConfig, config_paths, load_config,
    load_config_from_path, parse_config,
};

/// Loads configuration, falling back to defaults when no file exists.
///
/// `custom` overrides the search paths. Returns the configuration and the
/// path it was read from.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be read or parsed, or if an
/// explicitly requested file does not exist.
pub fn load_or_default(
    custom: Option<&Path>,
) -> Result<(DeskshellConfig, Option<PathBuf>), ConfigError> {
    let result = custom.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "desktop: loaded configuration");
            Ok((config, Some(path)))
        }
        Err(ConfigError::NotFound) if custom.is_none() => {
            tracing::debug!("desktop: no configuration file, using defaults");
            Ok((DeskshellConfig::default(), None))
        }
        Err(err) => Err(err),
    }
}
