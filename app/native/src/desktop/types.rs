//! Core entity types for the desktop layout engine.
//!
//! These types form a relational structure kept as flat, id-keyed records:
//! - `Window` is owned by the store and keyed by `WindowId`
//! - `WindowGroup` is owned by the group manager and keyed by `GroupId` (UUID v7)
//! - `Monitor` is owned by the monitor registry and keyed by `MonitorId`
//!
//! Relations:
//! - `Window.group_id` → `WindowGroup.id`
//! - `WindowGroup.window_ids` → list of `Window.id`
//! - `Window.monitor_id` → `Monitor.id`

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use super::geometry::{Rect, Size};
use super::snap::SnapKind;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an open window, allocated sequentially by the store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Identifier of a virtual monitor, assigned by the platform.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct MonitorId(pub u32);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Identifier of a tab group (UUID v7, so ids sort by creation time).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Allocates a fresh group id.
    #[must_use]
    pub fn new() -> Self { Self(Uuid::now_v7()) }
}

impl Default for GroupId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Key of an application in the app registry (e.g. `"notepad"`).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self { Self(id) }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Inline capacity for group member lists.
pub const GROUP_INLINE_CAP: usize = 8;

/// Member list of a tab group.
pub type WindowIdList = SmallVec<[WindowId; GROUP_INLINE_CAP]>;

// ============================================================================
// Window
// ============================================================================

/// Lifecycle of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// What the user may do to a window, copied from the app descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub resizable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
}

impl Default for Capabilities {
    fn default() -> Self { Self { resizable: true, minimizable: true, maximizable: true } }
}

/// An open application window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: WindowId,

    /// Application this window hosts.
    pub component_id: ComponentId,

    /// Title bar text.
    pub title: String,

    /// Icon key for the dock and title bar.
    pub icon: String,

    /// Committed geometry in desktop space.
    pub geometry: Rect,

    /// Stacking order; unique across all windows.
    pub z_index: u32,

    pub lifecycle: LifecycleState,

    /// Whether this window has keyboard focus.
    pub focused: bool,

    /// Tab group this window belongs to, if any.
    pub group_id: Option<GroupId>,

    /// Monitor whose bounds contain the window centre (or the nearest one).
    pub monitor_id: Option<MonitorId>,

    pub capabilities: Capabilities,

    /// Minimum geometry size.
    pub min_size: Size,

    /// Geometry before maximizing. Present exactly while the window is
    /// maximized, including when it is minimized on top of a maximize.
    pub restore_geometry: Option<Rect>,

    /// Snap applied by the last committed move or resize.
    pub snap: Option<SnapKind>,
}

impl Window {
    #[must_use]
    pub const fn is_minimized(&self) -> bool { matches!(self.lifecycle, LifecycleState::Minimized) }

    #[must_use]
    pub const fn is_maximized(&self) -> bool { matches!(self.lifecycle, LifecycleState::Maximized) }

    /// Visible windows take part in focus succession and window snapping.
    #[must_use]
    pub const fn is_visible(&self) -> bool { !self.is_minimized() }

    #[must_use]
    pub const fn is_grouped(&self) -> bool { self.group_id.is_some() }
}

// ============================================================================
// Focus
// ============================================================================

/// Global focus state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub focused_window_id: Option<WindowId>,
    pub focused_monitor_id: Option<MonitorId>,
}

impl FocusState {
    #[must_use]
    pub const fn new() -> Self { Self { focused_window_id: None, focused_monitor_id: None } }
}

// ============================================================================
// Window Group
// ============================================================================

/// A set of windows presented as tabs of one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGroup {
    pub id: GroupId,
    pub name: String,

    /// Ordered, unique, and never empty while the group exists.
    pub window_ids: WindowIdList,

    pub active_window_id: WindowId,

    /// All members are minimized while collapsed.
    pub collapsed: bool,

    /// Display order among groups.
    pub order: u32,
}

impl WindowGroup {
    #[must_use]
    pub fn contains(&self, window_id: WindowId) -> bool { self.window_ids.contains(&window_id) }

    #[must_use]
    pub fn len(&self) -> usize { self.window_ids.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.window_ids.is_empty() }
}

// ============================================================================
// Invariant Violations
// ============================================================================

/// A broken cross-component invariant found by validation.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InvariantViolation {
    #[error("more than one window is focused: {windows:?}")]
    MultipleFocused { windows: Vec<WindowId> },

    #[error("windows {first} and {second} share z-index {z_index}")]
    DuplicateZIndex { z_index: u32, first: WindowId, second: WindowId },

    #[error("focused window {focused} is below visible window {topmost}")]
    FocusedNotTopmost { focused: WindowId, topmost: WindowId },

    #[error("window {window_id} references missing or non-member group {group_id}")]
    DanglingGroupReference { window_id: WindowId, group_id: GroupId },

    #[error("group {group_id} lists window {window_id} which does not point back")]
    MissingBackReference { group_id: GroupId, window_id: WindowId },

    #[error("group {group_id} has no windows")]
    EmptyGroup { group_id: GroupId },

    #[error("window {window_id} is assigned to monitor {actual:?} but belongs on {expected:?}")]
    MonitorMismatch {
        window_id: WindowId,
        expected: Option<MonitorId>,
        actual: Option<MonitorId>,
    },
}
