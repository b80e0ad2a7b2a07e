//! Window state store.
//!
//! The store is the only writer of window records. It owns identity, geometry,
//! stacking, focus, lifecycle and monitor assignment.
//!
//! # Stacking and Focus
//!
//! Every focus raises the window to `max(z_index) + 1`, so z-indices are
//! unique and grow monotonically until the counter is exhausted, at which
//! point the stack is renumbered from 1 in its current order. The focused
//! window is always the topmost visible window: when it closes or minimizes,
//! focus passes to the visible window with the highest z-index (never to
//! insertion order) without bumping its z-index.
//!
//! # Geometry Commits
//!
//! Moves and resizes go through one commit path: the proposed geometry is
//! snapped (when a [`SnapEngine`] is supplied), sanitized, written, and the
//! window's monitor is re-evaluated from its centre.

use std::collections::BTreeMap;

use eyeball::{Observable, Subscriber};
use serde::{Deserialize, Serialize};

use super::events::{DesktopEvent, EventBus};
use super::geometry::{Insets, Point, Rect, Size};
use super::groups::GroupManager;
use super::monitor::{Monitor, MonitorRegistry};
use super::registry::AppRegistry;
use super::snap::{SnapEngine, SnapRequest};
use super::types::{
    ComponentId, FocusState, GroupId, InvariantViolation, LifecycleState, MonitorId, Window,
    WindowId,
};
use crate::config::WindowsConfig;

// ============================================================================
// Types
// ============================================================================

/// Optional overrides when opening a window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenArgs {
    /// Title to use instead of the app's title.
    pub title: Option<String>,
    /// Geometry to use instead of the app's default size and position.
    pub geometry: Option<Rect>,
}

/// Collaborators a geometry commit consults.
#[derive(Clone, Copy)]
pub struct CommitContext<'a> {
    pub monitors: &'a MonitorRegistry,
    /// `None` commits without snapping.
    pub snap: Option<&'a SnapEngine>,
}

impl<'a> CommitContext<'a> {
    #[must_use]
    pub const fn snapped(monitors: &'a MonitorRegistry, snap: &'a SnapEngine) -> Self {
        Self { monitors, snap: Some(snap) }
    }

    #[must_use]
    pub const fn unsnapped(monitors: &'a MonitorRegistry) -> Self { Self { monitors, snap: None } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CommitKind {
    Move,
    Resize,
    /// Programmatic placement; keeps the size of fixed-size windows.
    Place,
}

// ============================================================================
// WindowStateStore
// ============================================================================

/// Central authority for window entities.
pub struct WindowStateStore {
    /// Windows keyed by id.
    windows: BTreeMap<WindowId, Window>,

    /// Next id to allocate.
    next_id: u64,

    /// Global focus state.
    focus: Observable<FocusState>,

    /// Configured minimum size for every window.
    min_size: Size,

    /// Chrome kept clear of maximized windows.
    maximize_insets: Insets,

    events: EventBus,
}

impl WindowStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: &WindowsConfig, events: EventBus) -> Self {
        Self {
            windows: BTreeMap::new(),
            next_id: 1,
            focus: Observable::new(FocusState::new()),
            min_size: config.min_size(),
            maximize_insets: config.maximize_insets,
            events,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Snapshot of a window.
    #[must_use]
    pub fn get_window(&self, id: WindowId) -> Option<Window> { self.windows.get(&id).cloned() }

    /// Borrow a window.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> { self.windows.get(&id) }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool { self.windows.contains_key(&id) }

    /// Windows in id order.
    pub fn windows(&self) -> impl Iterator<Item = &Window> { self.windows.values() }

    /// Snapshots of all windows, bottom to top.
    #[must_use]
    pub fn windows_by_z(&self) -> Vec<Window> {
        let mut windows: Vec<Window> = self.windows.values().cloned().collect();
        windows.sort_by_key(|w| w.z_index);
        windows
    }

    #[must_use]
    pub fn len(&self) -> usize { self.windows.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    #[must_use]
    pub fn focused_window_id(&self) -> Option<WindowId> {
        Observable::get(&self.focus).focused_window_id
    }

    #[must_use]
    pub fn focus_state(&self) -> FocusState { Observable::get(&self.focus).clone() }

    /// Subscribes to focus changes.
    #[must_use]
    pub fn subscribe_focus(&self) -> Subscriber<FocusState> { Observable::subscribe(&self.focus) }

    /// Highest z-index in use (0 when empty).
    #[must_use]
    pub fn max_z_index(&self) -> u32 { self.windows.values().map(|w| w.z_index).max().unwrap_or(0) }

    /// The visible window with the highest z-index.
    #[must_use]
    pub fn topmost_visible(&self) -> Option<WindowId> {
        self.windows.values().filter(|w| w.is_visible()).max_by_key(|w| w.z_index).map(|w| w.id)
    }

    // ========================================================================
    // Open / Close
    // ========================================================================

    /// Opens a window for `component_id`.
    ///
    /// Returns `None` (and logs) when the app registry does not know the id.
    pub fn open(
        &mut self,
        component_id: &ComponentId,
        args: OpenArgs,
        apps: &dyn AppRegistry,
        monitors: &MonitorRegistry,
    ) -> Option<WindowId> {
        let descriptor = match apps.lookup(component_id) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(error = %err, "desktop: cannot open window");
                return None;
            }
        };

        let min_size = descriptor.min_size.map_or(self.min_size, |app_min| {
            Size::new(app_min.width.max(self.min_size.width), app_min.height.max(self.min_size.height))
        });
        let primary = monitors.get_primary_monitor();
        let geometry = args
            .geometry
            .unwrap_or_else(|| {
                let offset = descriptor.default_position.unwrap_or_default();
                Rect::from_parts(
                    primary.bounds.origin().offset(offset.x, offset.y),
                    descriptor.default_size,
                )
            })
            .sanitized(min_size, primary.bounds.origin());

        let id = WindowId(self.next_id);
        self.next_id += 1;
        let z_index = self.next_z_index();

        let window = Window {
            id,
            component_id: descriptor.id,
            title: args.title.unwrap_or(descriptor.title),
            icon: descriptor.icon,
            geometry,
            z_index,
            lifecycle: LifecycleState::Normal,
            focused: false,
            group_id: None,
            monitor_id: Some(monitors.monitor_for_rect(&geometry).id),
            capabilities: descriptor.capabilities,
            min_size,
            restore_geometry: None,
            snap: None,
        };
        self.windows.insert(id, window);

        let focus_change = self.apply_focus(Some(id));
        if let Some(window) = self.get_window(id) {
            tracing::debug!(window_id = %id, component = %window.component_id, "desktop: window opened");
            self.events.emit(DesktopEvent::WindowOpened { window });
        }
        self.emit_focus(focus_change);
        Some(id)
    }

    /// Closes a window, handing focus to the topmost remaining visible window.
    ///
    /// Group membership is cleaned up through `groups`. Stale id: `None`.
    pub fn close(&mut self, id: WindowId, groups: &mut GroupManager) -> Option<Window> {
        let window = self.windows.remove(&id)?;

        if let Some(group_id) = window.group_id {
            groups.forget_window(id, group_id);
        }
        tracing::debug!(window_id = %id, "desktop: window closed");
        self.events.emit(DesktopEvent::WindowClosed {
            window_id: id,
            component_id: window.component_id.clone(),
        });

        if self.focused_window_id() == Some(id) {
            let successor = self.topmost_visible();
            let change = self.apply_focus(successor);
            self.emit_focus(change);
        }
        Some(window)
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Focuses a window, restoring it first if minimized. Stale id: false.
    pub fn focus(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };

        if window.is_minimized() {
            self.update_window(id, unminimize);
        }
        self.raise(id);
        let change = self.apply_focus(Some(id));
        self.emit_focus(change);
        true
    }

    /// Moves a window above every other window.
    fn raise(&mut self, id: WindowId) {
        let max = self.max_z_index();
        let top_is_unique = self.windows.values().filter(|w| w.z_index == max).count() == 1;
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if window.z_index == max && top_is_unique {
            return;
        }
        let z_index = self.next_z_index();
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        window.z_index = z_index;
        let snapshot = window.clone();
        self.events.emit(DesktopEvent::WindowChanged { window: snapshot });
    }

    /// A z-index above every window. Renumbers the stack first when the
    /// counter would overflow.
    fn next_z_index(&mut self) -> u32 {
        match self.max_z_index().checked_add(1) {
            Some(next) => next,
            None => self.compact_z_indices() + 1,
        }
    }

    /// Renumbers z-indices to `1..=n`, keeping their order. Returns `n`.
    fn compact_z_indices(&mut self) -> u32 {
        let mut order: Vec<(u32, WindowId)> = self.windows.values().map(|w| (w.z_index, w.id)).collect();
        order.sort_unstable();

        let mut top = 0;
        for (z_index, (previous, id)) in (1..).zip(order) {
            top = z_index;
            if previous == z_index {
                continue;
            }
            if let Some(window) = self.windows.get_mut(&id) {
                window.z_index = z_index;
                let snapshot = window.clone();
                self.events.emit(DesktopEvent::WindowChanged { window: snapshot });
            }
        }
        tracing::debug!(windows = top, "desktop: z-order compacted");
        top
    }

    /// Sets the focus flags and observable; returns `(previous, next)` if it changed.
    fn apply_focus(&mut self, next: Option<WindowId>) -> Option<(Option<WindowId>, Option<WindowId>)> {
        let next = next.filter(|id| self.windows.contains_key(id));
        for window in self.windows.values_mut() {
            window.focused = Some(window.id) == next;
        }

        let previous = self.focused_window_id();
        let monitor = next.and_then(|id| self.windows.get(&id)).and_then(|w| w.monitor_id);
        let state = FocusState { focused_window_id: next, focused_monitor_id: monitor };
        if *Observable::get(&self.focus) != state {
            Observable::set(&mut self.focus, state);
        }
        (previous != next).then_some((previous, next))
    }

    fn emit_focus(&self, change: Option<(Option<WindowId>, Option<WindowId>)>) {
        if let Some((previous, window_id)) = change {
            self.events.emit(DesktopEvent::WindowFocused { window_id, previous });
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Moves a window, snapping when `ctx` carries a snap engine.
    pub fn move_window(&mut self, id: WindowId, position: Point, ctx: &CommitContext<'_>) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        let proposed = window.geometry.with_origin(position);
        self.commit(id, proposed, CommitKind::Move, ctx)
    }

    /// Moves a window to a full frame, snapping when `ctx` carries a snap
    /// engine. Pointer drags commit through here so each proposal keeps the
    /// size the drag started with.
    pub fn move_window_to(&mut self, id: WindowId, frame: Rect, ctx: &CommitContext<'_>) -> bool {
        self.commit(id, frame, CommitKind::Move, ctx)
    }

    /// Resizes a window keeping its origin.
    pub fn resize_window(&mut self, id: WindowId, size: Size, ctx: &CommitContext<'_>) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        let proposed = window.geometry.with_size(size);
        self.commit(id, proposed, CommitKind::Resize, ctx)
    }

    /// Resizes a window to a full frame, for north and west handles.
    pub fn resize_window_to(&mut self, id: WindowId, frame: Rect, ctx: &CommitContext<'_>) -> bool {
        self.commit(id, frame, CommitKind::Resize, ctx)
    }

    /// Places a window at `frame` without snapping.
    ///
    /// Fixed-size windows are moved but keep their size.
    pub fn place_window(&mut self, id: WindowId, frame: Rect, monitors: &MonitorRegistry) -> bool {
        self.commit(id, frame, CommitKind::Place, &CommitContext::unsnapped(monitors))
    }

    fn commit(
        &mut self,
        id: WindowId,
        proposed: Rect,
        kind: CommitKind,
        ctx: &CommitContext<'_>,
    ) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        if window.is_minimized() || window.is_maximized() {
            tracing::debug!(window_id = %id, lifecycle = ?window.lifecycle, "desktop: geometry change refused");
            return false;
        }
        let proposed = match kind {
            CommitKind::Resize if !window.capabilities.resizable => return false,
            CommitKind::Place if !window.capabilities.resizable => proposed.with_size(window.geometry.size()),
            _ => proposed,
        };

        let monitor = ctx.monitors.monitor_for_rect(&proposed);
        let (frame, snap) = match ctx.snap {
            Some(engine) => {
                let others: Vec<Rect> = self
                    .windows
                    .values()
                    .filter(|w| w.id != id && w.is_visible() && w.monitor_id == Some(monitor.id))
                    .map(|w| w.geometry)
                    .collect();
                let result = engine.snap(&SnapRequest {
                    geometry: proposed,
                    others: &others,
                    monitor_bounds: monitor.bounds,
                    is_resizing: kind == CommitKind::Resize,
                    min_size: window.min_size,
                    previous: window.snap,
                });
                (result.frame(), result.kind)
            }
            None => (proposed.sanitized(window.min_size, monitor.bounds.origin()), None),
        };

        let monitor_id = ctx.monitors.monitor_for_rect(&frame).id;
        let previous_monitor = window.monitor_id;
        self.update_window(id, |w| {
            w.geometry = frame;
            w.snap = snap;
            w.monitor_id = Some(monitor_id);
        });
        if previous_monitor != Some(monitor_id) {
            tracing::debug!(window_id = %id, monitor_id = %monitor_id, "desktop: window changed monitor");
            self.sync_focus_monitor(id);
        }
        true
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Minimizes a window; focus passes to the topmost visible window.
    pub fn minimize(&mut self, id: WindowId) -> bool {
        match self.windows.get(&id) {
            Some(window) if window.capabilities.minimizable => self.set_minimized(id),
            _ => false,
        }
    }

    /// Minimizes regardless of capabilities, for group collapse.
    pub(crate) fn set_minimized(&mut self, id: WindowId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.update_window(id, |w| w.lifecycle = LifecycleState::Minimized);
        if self.focused_window_id() == Some(id) {
            let successor = self.topmost_visible();
            let change = self.apply_focus(successor);
            self.emit_focus(change);
        }
        true
    }

    /// Restores a minimized window (and focuses it) or un-maximizes a
    /// maximized one. A window minimized while maximized returns to maximized.
    pub fn restore(&mut self, id: WindowId, monitors: &MonitorRegistry) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        match window.lifecycle {
            LifecycleState::Minimized => self.focus(id),
            LifecycleState::Maximized => self.unmaximize(id, monitors),
            LifecycleState::Normal => true,
        }
    }

    /// Maximizes a window to its monitor's bounds minus the chrome insets.
    pub fn maximize(&mut self, id: WindowId, monitors: &MonitorRegistry) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        if !window.capabilities.maximizable || window.is_minimized() {
            return false;
        }
        if window.is_maximized() {
            return true;
        }

        let monitor = window
            .monitor_id
            .and_then(|monitor_id| monitors.get_monitor(monitor_id))
            .unwrap_or_else(|| monitors.monitor_for_rect(&window.geometry));
        let frame = self.maximized_frame(&monitor, window.min_size);
        self.update_window(id, |w| {
            w.restore_geometry = Some(w.geometry);
            w.geometry = frame;
            w.lifecycle = LifecycleState::Maximized;
            w.monitor_id = Some(monitor.id);
            w.snap = None;
        });
        true
    }

    /// Returns a maximized window to its cached geometry.
    pub fn unmaximize(&mut self, id: WindowId, monitors: &MonitorRegistry) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        if !window.is_maximized() {
            return false;
        }

        let geometry = window.restore_geometry.unwrap_or(window.geometry);
        let monitor_id = monitors.monitor_for_rect(&geometry).id;
        self.update_window(id, |w| {
            w.geometry = geometry;
            w.restore_geometry = None;
            w.lifecycle = LifecycleState::Normal;
            w.monitor_id = Some(monitor_id);
        });
        self.sync_focus_monitor(id);
        true
    }

    /// Maximizes a normal window or restores a maximized one.
    pub fn toggle_maximize(&mut self, id: WindowId, monitors: &MonitorRegistry) -> bool {
        match self.windows.get(&id) {
            Some(window) if window.is_maximized() => self.unmaximize(id, monitors),
            Some(_) => self.maximize(id, monitors),
            None => false,
        }
    }

    fn maximized_frame(&self, monitor: &Monitor, min_size: Size) -> Rect {
        let frame = monitor.bounds.inset(&self.maximize_insets);
        frame.with_size(frame.size().at_least(min_size))
    }

    // ========================================================================
    // Groups / Monitors
    // ========================================================================

    /// Sets the group back-reference. Called by the group manager.
    pub fn set_group(&mut self, id: WindowId, group_id: Option<GroupId>) -> bool {
        self.update_window(id, |w| w.group_id = group_id)
    }

    /// Re-evaluates monitor assignment after the monitor set changed.
    ///
    /// Windows left entirely off every monitor are pulled inside the primary
    /// monitor; maximized windows are re-fitted to their monitor. Returns the
    /// ids of windows that changed.
    pub fn reassign_monitors(&mut self, monitors: &MonitorRegistry) -> Vec<WindowId> {
        let primary = monitors.get_primary_monitor();
        let on_screen = |rect: &Rect| monitors.iter().any(|m| m.bounds.intersects(rect));
        let mut changed = Vec::new();

        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            let Some(window) = self.windows.get(&id) else {
                continue;
            };

            let mut geometry = window.geometry;
            let mut restore_geometry = window.restore_geometry;
            if let Some(restore) = restore_geometry
                && !on_screen(&restore)
            {
                restore_geometry = Some(restore.clamped_within(&primary.bounds));
            }

            let monitor = if window.is_maximized() {
                let monitor = window
                    .monitor_id
                    .and_then(|monitor_id| monitors.get_monitor(monitor_id))
                    .unwrap_or_else(|| monitors.monitor_for_rect(&geometry));
                geometry = self.maximized_frame(&monitor, window.min_size);
                monitor
            } else if on_screen(&geometry) {
                monitors.monitor_for_rect(&geometry)
            } else {
                geometry = geometry.clamped_within(&primary.bounds);
                primary.clone()
            };

            let updated = window.geometry != geometry
                || window.restore_geometry != restore_geometry
                || window.monitor_id != Some(monitor.id);
            if updated {
                self.update_window(id, |w| {
                    w.geometry = geometry;
                    w.restore_geometry = restore_geometry;
                    w.monitor_id = Some(monitor.id);
                });
                changed.push(id);
            }
        }

        if let Some(id) = self.focused_window_id() {
            self.sync_focus_monitor(id);
        }
        if !changed.is_empty() {
            tracing::info!(count = changed.len(), "desktop: windows reassigned to monitors");
        }
        changed
    }

    fn sync_focus_monitor(&mut self, id: WindowId) {
        if self.focused_window_id() != Some(id) {
            return;
        }
        let monitor = self.windows.get(&id).and_then(|w| w.monitor_id);
        if Observable::get(&self.focus).focused_monitor_id != monitor {
            let mut state = Observable::get(&self.focus).clone();
            state.focused_monitor_id = monitor;
            Observable::set(&mut self.focus, state);
        }
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Applies `f` to a window and announces the change. Stale id: false.
    ///
    /// Identity, focus and stacking are owned by `focus` and survive `f`.
    pub fn update_window<F>(&mut self, id: WindowId, f: F) -> bool
    where F: FnOnce(&mut Window) {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        let before = window.clone();
        f(window);
        window.id = before.id;
        window.focused = before.focused;
        window.z_index = before.z_index;
        if window.is_minimized() {
            window.focused = false;
        }

        if *window != before {
            let snapshot = window.clone();
            self.events.emit(DesktopEvent::WindowChanged { window: snapshot });
        }
        true
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Checks focus, stacking and monitor-assignment invariants.
    #[must_use]
    pub fn check_invariants(&self, monitors: &MonitorRegistry) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let focused: Vec<WindowId> = self.windows.values().filter(|w| w.focused).map(|w| w.id).collect();
        if focused.len() > 1 {
            violations.push(InvariantViolation::MultipleFocused { windows: focused.clone() });
        }

        let by_z = self.windows_by_z();
        for pair in by_z.windows(2) {
            if pair[0].z_index == pair[1].z_index {
                violations.push(InvariantViolation::DuplicateZIndex {
                    z_index: pair[0].z_index,
                    first: pair[0].id,
                    second: pair[1].id,
                });
            }
        }

        if let (Some(&focused), Some(topmost)) = (focused.first(), self.topmost_visible())
            && focused != topmost
        {
            violations.push(InvariantViolation::FocusedNotTopmost { focused, topmost });
        }

        for window in self.windows.values() {
            let expected: Option<MonitorId> = Some(monitors.monitor_for_rect(&window.geometry).id);
            if window.monitor_id != expected {
                violations.push(InvariantViolation::MonitorMismatch {
                    window_id: window.id,
                    expected,
                    actual: window.monitor_id,
                });
            }
        }

        violations
    }
}

/// Leaves the minimized state, returning to maximized when the window was
/// minimized on top of a maximize.
fn unminimize(window: &mut Window) {
    window.lifecycle = if window.restore_geometry.is_some() {
        LifecycleState::Maximized
    } else {
        LifecycleState::Normal
    };
}
