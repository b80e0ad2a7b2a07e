//! Default tuning constants for the layout engine.
//!
//! These are the values used when the configuration file does not override
//! them. Thresholds are fixed numbers so snapping and tie-breaks stay
//! deterministic.
//!
//! # Organization
//!
//! - `env` - Environment variable names
//! - `snap` - Snap thresholds
//! - `window` - Window sizing and chrome
//! - `timing` - Interaction throttling
//! - `grid` - Grid cell tracking
//! - `monitor` - Fallback monitor
//! - `events` - Change notification channel

/// Environment variable names.
pub mod env {
    /// Overrides the configuration file search paths.
    pub const CONFIG_PATH: &str = "DESKSHELL_CONFIG";

    /// `tracing-subscriber` filter directives for the CLI.
    pub const LOG_FILTER: &str = "DESKSHELL_LOG";
}

/// Snap thresholds (pixels).
pub mod snap {
    /// Distance at which an edge starts snapping.
    pub const ACTIVATION_THRESHOLD: f64 = 20.0;

    /// Distance an already snapped edge must travel to un-snap.
    pub const RELEASE_DISTANCE: f64 = 32.0;
}

/// Window sizing and chrome (pixels).
pub mod window {
    /// Smallest width a window can be resized to.
    pub const MIN_WIDTH: f64 = 200.0;

    /// Smallest height a window can be resized to.
    pub const MIN_HEIGHT: f64 = 120.0;

    /// Menu bar reserved above maximized windows.
    pub const MAXIMIZE_INSET_TOP: f64 = 28.0;

    /// Dock reserved below maximized windows.
    pub const MAXIMIZE_INSET_BOTTOM: f64 = 80.0;

    /// Size used when an app descriptor has no default size.
    pub const FALLBACK_WIDTH: f64 = 640.0;

    /// Size used when an app descriptor has no default size.
    pub const FALLBACK_HEIGHT: f64 = 480.0;
}

/// Interaction timing.
pub mod timing {
    /// Minimum interval between committed drag/resize frames (ms).
    ///
    /// One frame at 60Hz.
    pub const FRAME_INTERVAL_MS: u64 = 16;
}

/// Grid cell tracking.
pub mod grid {
    /// How far (pixels) a window may drift from its cell frame and still
    /// hold the cell.
    pub const CELL_TOLERANCE: f64 = 0.5;
}

/// Synthetic monitor used when enumeration is unavailable.
pub mod monitor {
    /// Id of the synthetic viewport monitor.
    pub const FALLBACK_ID: u32 = 0;

    /// Name of the synthetic viewport monitor.
    pub const FALLBACK_NAME: &str = "Viewport";

    pub const VIEWPORT_WIDTH: f64 = 1920.0;
    pub const VIEWPORT_HEIGHT: f64 = 1080.0;
}

/// Change notification channel.
pub mod events {
    /// Events buffered per subscriber before the slowest one starts lagging.
    pub const CHANNEL_CAPACITY: usize = 256;
}
