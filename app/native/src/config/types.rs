//! Configuration types for Deskshell.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::desktop::geometry::{Insets, Rect, Size};
use crate::desktop::types::MonitorId;

// ============================================================================
// Snap
// ============================================================================

/// Snapping behaviour for interactive drags and resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    /// Enable or disable all snapping.
    pub enabled: bool,

    /// Distance in pixels at which an edge snaps.
    pub threshold: f64,

    /// Distance in pixels a snapped edge must move to un-snap.
    /// Values below `threshold` are raised to it.
    pub release_distance: f64,

    /// Area excluded from half/quarter zone geometry (e.g. menu bar, dock).
    pub zone_insets: Insets,

    /// Align windows to the edges of their neighbours.
    pub window_snapping: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: constants::snap::ACTIVATION_THRESHOLD,
            release_distance: constants::snap::RELEASE_DISTANCE,
            zone_insets: Insets::zero(),
            window_snapping: true,
        }
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Window sizing defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowsConfig {
    /// Minimum width for every window, unless its app asks for more.
    pub min_width: f64,

    /// Minimum height for every window, unless its app asks for more.
    pub min_height: f64,

    /// Chrome kept clear of maximized windows.
    pub maximize_insets: Insets,
}

impl WindowsConfig {
    #[must_use]
    pub const fn min_size(&self) -> Size { Size::new(self.min_width, self.min_height) }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            min_width: constants::window::MIN_WIDTH,
            min_height: constants::window::MIN_HEIGHT,
            maximize_insets: Insets::new(
                constants::window::MAXIMIZE_INSET_TOP,
                0.0,
                constants::window::MAXIMIZE_INSET_BOTTOM,
                0.0,
            ),
        }
    }
}

// ============================================================================
// Monitors
// ============================================================================

/// Monitor enumeration fallbacks and user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorsConfig {
    /// Bounds of the synthetic monitor used when enumeration is unavailable.
    pub viewport: Rect,

    /// Display names keyed by monitor id. Applied over platform names.
    pub names: BTreeMap<MonitorId, String>,

    /// Preferred primary monitor, used when it is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<MonitorId>,
}

impl Default for MonitorsConfig {
    fn default() -> Self {
        Self {
            viewport: Rect::new(
                0.0,
                0.0,
                constants::monitor::VIEWPORT_WIDTH,
                constants::monitor::VIEWPORT_HEIGHT,
            ),
            names: BTreeMap::new(),
            primary: None,
        }
    }
}

// ============================================================================
// Interaction
// ============================================================================

/// Pointer interaction tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    /// Minimum milliseconds between committed drag/resize frames.
    pub frame_interval_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self { Self { frame_interval_ms: constants::timing::FRAME_INTERVAL_MS } }
}

// ============================================================================
// Grid
// ============================================================================

const fn default_span() -> u32 { 1 }

/// A named cell of a grid template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridCellConfig {
    /// Unique id within the template.
    pub id: String,

    /// Columns covered by the cell.
    #[serde(default = "default_span")]
    pub col_span: u32,

    /// Rows covered by the cell.
    #[serde(default = "default_span")]
    pub row_span: u32,
}

impl GridCellConfig {
    #[must_use]
    pub fn new(id: &str, col_span: u32, row_span: u32) -> Self {
        Self { id: id.to_string(), col_span, row_span }
    }
}

/// A grid template. Cells are placed row-major into the first free slot
/// that fits their span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridTemplateConfig {
    /// Unique layout id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<GridCellConfig>,
}

/// Grid layout catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Layout selected at startup. Defaults to the first template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<String>,

    /// Available templates. Invalid templates are skipped with a warning.
    pub templates: Vec<GridTemplateConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        let cell = GridCellConfig::new;
        Self {
            default_layout: None,
            templates: vec![
                GridTemplateConfig {
                    id: "halves".to_string(),
                    name: "Halves".to_string(),
                    columns: 2,
                    rows: 1,
                    cells: vec![cell("left", 1, 1), cell("right", 1, 1)],
                },
                GridTemplateConfig {
                    id: "thirds".to_string(),
                    name: "Thirds".to_string(),
                    columns: 3,
                    rows: 1,
                    cells: vec![cell("left", 1, 1), cell("center", 1, 1), cell("right", 1, 1)],
                },
                GridTemplateConfig {
                    id: "quarters".to_string(),
                    name: "Quarters".to_string(),
                    columns: 2,
                    rows: 2,
                    cells: vec![
                        cell("top-left", 1, 1),
                        cell("top-right", 1, 1),
                        cell("bottom-left", 1, 1),
                        cell("bottom-right", 1, 1),
                    ],
                },
                GridTemplateConfig {
                    id: "main-stack".to_string(),
                    name: "Main and stack".to_string(),
                    columns: 3,
                    rows: 2,
                    cells: vec![cell("main", 2, 2), cell("stack-top", 1, 1), cell("stack-bottom", 1, 1)],
                },
            ],
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Change notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct EventsConfig {
    /// Events buffered per subscriber.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self { Self { capacity: constants::events::CHANNEL_CAPACITY } }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DeskshellConfig {
    /// JSON schema reference, ignored by the loader.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub snap: SnapConfig,
    pub windows: WindowsConfig,
    pub monitors: MonitorsConfig,
    pub interaction: InteractionConfig,
    pub grid: GridConfig,
    pub events: EventsConfig,
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at $DESKSHELL_CONFIG or ~/.config/deskshell/config.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

const APP_DIR: &str = "deskshell";

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$DESKSHELL_CONFIG` (with `~` expanded)
/// 2. `$XDG_CONFIG_HOME/deskshell/config.jsonc` or `config.json`
/// 3. `~/.config/deskshell/config.jsonc` or `config.json`
/// 4. The platform config directory (e.g. `~/Library/Application Support/deskshell/`)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(custom) = std::env::var(constants::env::CONFIG_PATH)
        && !custom.is_empty()
    {
        paths.push(PathBuf::from(shellexpand::tilde(&custom).as_ref()));
    }

    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_DIR));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_DIR));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_DIR));
    }

    paths
}

/// Parses configuration from JSONC text.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the text is not valid configuration.
pub fn parse_config(text: &str) -> Result<DeskshellConfig, ConfigError> {
    let reader = json_comments::StripComments::new(text.as_bytes());
    Ok(serde_json::from_reader(reader)?)
}

/// Loads configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read, and
/// `ConfigError::ParseError` if it contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(DeskshellConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: DeskshellConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

/// Loads configuration from the first existing file in `config_paths()`.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the error from reading the first file found.
pub fn load_config() -> Result<(DeskshellConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}
