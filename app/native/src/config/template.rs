//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// Every commented value is the built-in default.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Deskshell Configuration File
// ============================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Snapping
  // ============================================================================
  // "snap": {
  //   // Enable or disable snapping during drag and resize
  //   "enabled": true,
  //
  //   // Distance in pixels at which a window edge snaps
  //   "threshold": 20,
  //
  //   // Distance in pixels a snapped edge must travel to un-snap
  //   "releaseDistance": 32,
  //
  //   // Area excluded from half/quarter zone geometry
  //   "zoneInsets": { "top": 0, "right": 0, "bottom": 0, "left": 0 },
  //
  //   // Align windows to the edges of neighbouring windows
  //   "windowSnapping": true
  // },

  // ============================================================================
  // Windows
  // ============================================================================
  // "windows": {
  //   // Minimum window size in pixels
  //   "minWidth": 200,
  //   "minHeight": 120,
  //
  //   // Chrome kept clear of maximized windows (menu bar, dock)
  //   "maximizeInsets": { "top": 28, "right": 0, "bottom": 80, "left": 0 }
  // },

  // ============================================================================
  // Monitors
  // ============================================================================
  // "monitors": {
  //   // Synthetic monitor used when the platform cannot enumerate displays
  //   "viewport": { "x": 0, "y": 0, "width": 1920, "height": 1080 },
  //
  //   // Display names keyed by monitor id
  //   "names": { "1": "Left" },
  //
  //   // Preferred primary monitor id
  //   "primary": 1
  // },

  // ============================================================================
  // Interaction
  // ============================================================================
  // "interaction": {
  //   // Minimum milliseconds between committed drag/resize frames
  //   "frameIntervalMs": 16
  // },

  // ============================================================================
  // Grid Layouts
  // ============================================================================
  // "grid": {
  //   // Layout selected at startup (defaults to the first template)
  //   "defaultLayout": "halves",
  //
  //   // Cells are placed row-major into the first free slot that fits
  //   "templates": [
  //     {
  //       "id": "main-stack",
  //       "name": "Main and stack",
  //       "columns": 3,
  //       "rows": 2,
  //       "cells": [
  //         { "id": "main", "colSpan": 2, "rowSpan": 2 },
  //         { "id": "stack-top" },
  //         { "id": "stack-bottom" }
  //       ]
  //     }
  //   ]
  // },

  // ============================================================================
  // Change Notifications
  // ============================================================================
  // "events": {
  //   // Events buffered per subscriber
  //   "capacity": 256
  // }
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
