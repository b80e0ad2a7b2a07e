//! Window and multi-monitor layout engine.
//!
//! This module tracks every open window's identity, geometry, stacking,
//! grouping and monitor placement for a browser-hosted virtual desktop, and
//! adjusts interactive drags and resizes with edge, zone and window snapping.
//!
//! # Components
//!
//! - `monitor` - Virtual monitors and the containing-monitor queries
//! - `snap` - Pure snap computation for in-progress geometry
//! - `grid` - Grid templates, cell occupancy and cell geometry
//! - `store` - Window records, stacking, focus and lifecycle
//! - `groups` - Tab groups layered on the store
//! - `interaction` - Pointer and keyboard sessions with per-frame throttling
//! - `shell` - The [`Desktop`] facade owning one of each
//!
//! # Data Flow
//!
//! ```text
//! pointer/keys ──▶ InteractionController ──▶ WindowStateStore ──▶ EventBus
//!                                              │  ▲
//!                        SnapEngine ◀──────────┘  │
//!                        MonitorRegistry ─────────┘
//! ```
//!
//! Each component is the only writer of its own records. Cross-component
//! writes go through the owner's API: the group manager sets back-references
//! with [`WindowStateStore::set_group`] and the grid places windows with
//! [`WindowStateStore::place_window`].
//!
//! # Invariants
//!
//! After every operation:
//!
//! 1. At most one window is focused.
//! 2. z-indices are unique and the focused window is the topmost visible one.
//! 3. Window and group membership references agree in both directions.
//! 4. No group is empty.
//! 5. A window's monitor contains its centre, or is the nearest monitor.
//!
//! [`Desktop::validate`] reports violations and [`Desktop::heal`] repairs
//! group and monitor drift.

pub mod commands;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod groups;
pub mod interaction;
pub mod monitor;
pub mod registry;
pub mod shell;
pub mod snap;
pub mod store;
pub mod throttle;
pub mod types;

pub use commands::{CommandOutcome, DesktopCommand, GroupRef};
pub use events::{DesktopEvent, EventBus};
pub use geometry::{Insets, Point, Rect, ResizeEdge, Size};
pub use grid::{ArrangeReport, GridError, LayoutGridEngine};
pub use groups::{GroupError, GroupManager};
pub use interaction::{InteractionController, KeyInput};
pub use monitor::{
    Monitor, MonitorChange, MonitorDescriptor, MonitorRegistry, MonitorSource, MonitorSourceError,
    StaticMonitorSource,
};
pub use registry::{AppDescriptor, AppRegistry, RegistryError, StaticAppRegistry};
pub use shell::Desktop;
pub use snap::{SnapEngine, SnapKind, SnapResult, SnapZone};
pub use store::{OpenArgs, WindowStateStore};
pub use types::{
    ComponentId, FocusState, GroupId, InvariantViolation, LifecycleState, MonitorId, Window,
    WindowGroup, WindowId,
};
