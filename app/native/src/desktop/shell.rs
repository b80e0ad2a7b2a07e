//! The desktop facade.
//!
//! [`Desktop`] owns one instance of every component together with the event
//! bus and configuration. It forwards operations to the owning component and
//! wires the flows that cross components: closing a window ends its pointer
//! session and frees its grid cell before the store and group manager clean
//! up; a monitor change re-evaluates every window's monitor. After any
//! operation that can move, resize, minimize or maximize windows, grid cells
//! whose window left the cell frame are freed.

use std::time::{Duration, Instant};

use super::commands::{CommandOutcome, DesktopCommand, GroupRef};
use super::events::{DesktopEvent, EventBus};
use super::geometry::{Point, Rect, ResizeEdge, Size};
use super::grid::{ArrangeReport, GridCell, GridError, LayoutGridEngine};
use super::groups::{GroupError, GroupManager};
use super::interaction::{InteractionController, KeyInput, Targets};
use super::monitor::{MonitorChange, MonitorDescriptor, MonitorRegistry, MonitorSource, MonitorSourceError};
use super::registry::{AppRegistry, StaticAppRegistry};
use super::snap::SnapEngine;
use super::store::{CommitContext, OpenArgs, WindowStateStore};
use super::throttle::FrameThrottle;
use super::types::{ComponentId, GroupId, InvariantViolation, MonitorId, Window, WindowGroup, WindowId};
use crate::config::DeskshellConfig;

/// A headless virtual desktop.
pub struct Desktop {
    config: DeskshellConfig,
    events: EventBus,
    apps: Box<dyn AppRegistry>,
    monitors: MonitorRegistry,
    snap: SnapEngine,
    store: WindowStateStore,
    groups: GroupManager,
    grid: LayoutGridEngine,
    interaction: InteractionController,

    /// Origin for command timestamps.
    epoch: Instant,
}

impl Desktop {
    /// Creates a desktop with the built-in applications.
    #[must_use]
    pub fn new(config: DeskshellConfig) -> Self {
        Self::with_registry(config, Box::new(StaticAppRegistry::with_defaults()))
    }

    /// Creates a desktop backed by a custom application registry.
    #[must_use]
    pub fn with_registry(config: DeskshellConfig, apps: Box<dyn AppRegistry>) -> Self {
        let events = EventBus::new(config.events.capacity);
        let min_size = config.windows.min_size();
        let desktop = Self {
            monitors: MonitorRegistry::new(&config.monitors, events.clone()),
            snap: SnapEngine::new(&config.snap, min_size),
            store: WindowStateStore::new(&config.windows, events.clone()),
            groups: GroupManager::new(events.clone()),
            grid: LayoutGridEngine::from_config(&config.grid, config.windows.maximize_insets),
            interaction: InteractionController::new(FrameThrottle::from_millis(
                config.interaction.frame_interval_ms,
            )),
            apps,
            events,
            config,
            epoch: Instant::now(),
        };
        tracing::info!(
            apps = desktop.apps.component_ids().len(),
            layouts = desktop.grid.templates().len(),
            "desktop: initialized"
        );
        desktop
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub const fn config(&self) -> &DeskshellConfig { &self.config }

    /// Subscribes to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DesktopEvent> { self.events.subscribe() }

    #[must_use]
    pub const fn monitors(&self) -> &MonitorRegistry { &self.monitors }

    #[must_use]
    pub const fn store(&self) -> &WindowStateStore { &self.store }

    #[must_use]
    pub const fn groups(&self) -> &GroupManager { &self.groups }

    #[must_use]
    pub const fn grid(&self) -> &LayoutGridEngine { &self.grid }

    #[must_use]
    pub const fn snap_engine(&self) -> &SnapEngine { &self.snap }

    #[must_use]
    pub const fn interaction(&self) -> &InteractionController { &self.interaction }

    #[must_use]
    pub fn apps(&self) -> &dyn AppRegistry { self.apps.as_ref() }

    /// Window snapshots, bottom to top.
    #[must_use]
    pub fn windows(&self) -> Vec<Window> { self.store.windows_by_z() }

    #[must_use]
    pub fn get_window(&self, id: WindowId) -> Option<Window> { self.store.get_window(id) }

    #[must_use]
    pub fn focused_window_id(&self) -> Option<WindowId> { self.store.focused_window_id() }

    // ========================================================================
    // Windows
    // ========================================================================

    pub fn open_window(&mut self, component_id: &str, args: OpenArgs) -> Option<WindowId> {
        self.store.open(&ComponentId::from(component_id), args, self.apps.as_ref(), &self.monitors)
    }

    /// Closes a window. Stale id: false.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.interaction.end_for_window(id);
        self.grid.release_window(id);
        self.store.close(id, &mut self.groups).is_some()
    }

    pub fn focus_window(&mut self, id: WindowId) -> bool { self.store.focus(id) }

    /// Moves a window with snapping.
    pub fn move_window(&mut self, id: WindowId, position: Point) -> bool {
        let ctx = CommitContext::snapped(&self.monitors, &self.snap);
        let moved = self.store.move_window(id, position, &ctx);
        self.release_displaced_cells();
        moved
    }

    /// Resizes a window with snapping.
    pub fn resize_window(&mut self, id: WindowId, size: Size) -> bool {
        let ctx = CommitContext::snapped(&self.monitors, &self.snap);
        let resized = self.store.resize_window(id, size, &ctx);
        self.release_displaced_cells();
        resized
    }

    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        let minimized = self.store.minimize(id);
        self.release_displaced_cells();
        minimized
    }

    pub fn restore_window(&mut self, id: WindowId) -> bool { self.store.restore(id, &self.monitors) }

    pub fn maximize_window(&mut self, id: WindowId) -> bool {
        let maximized = self.store.maximize(id, &self.monitors);
        self.release_displaced_cells();
        maximized
    }

    pub fn unmaximize_window(&mut self, id: WindowId) -> bool { self.store.unmaximize(id, &self.monitors) }

    pub fn toggle_maximize(&mut self, id: WindowId) -> bool {
        let toggled = self.store.toggle_maximize(id, &self.monitors);
        self.release_displaced_cells();
        toggled
    }

    fn release_displaced_cells(&mut self) { self.grid.release_displaced(&self.store, &self.monitors); }

    // ========================================================================
    // Pointer and Keyboard
    // ========================================================================

    fn interact<R>(&mut self, f: impl FnOnce(&mut InteractionController, &mut Targets<'_>) -> R) -> R {
        let mut targets = Targets { store: &mut self.store, monitors: &self.monitors, snap: &self.snap };
        let result = f(&mut self.interaction, &mut targets);
        self.release_displaced_cells();
        result
    }

    pub fn begin_move(&mut self, id: WindowId, pointer: Point) -> bool {
        self.interact(|controller, targets| controller.begin_move(id, pointer, targets))
    }

    pub fn begin_resize(&mut self, id: WindowId, edge: ResizeEdge, pointer: Point) -> bool {
        self.interact(|controller, targets| controller.begin_resize(id, edge, pointer, targets))
    }

    pub fn pointer_move(&mut self, pointer: Point, now: Instant) -> bool {
        self.interact(|controller, targets| controller.pointer_move(pointer, now, targets))
    }

    pub fn animation_frame(&mut self, now: Instant) -> bool {
        self.interact(|controller, targets| controller.animation_frame(now, targets))
    }

    pub fn pointer_up(&mut self) -> Option<Rect> {
        self.interact(|controller, targets| controller.pointer_up(targets))
    }

    /// Escape or lost pointer capture.
    pub fn cancel_interaction(&mut self) -> bool {
        self.interact(|controller, targets| controller.cancel(targets))
    }

    pub fn key_input(&mut self, key: KeyInput) -> bool {
        self.interact(|controller, targets| controller.key_input(key, targets))
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NoWindows` when no listed window is open.
    pub fn create_group(&mut self, name: &str, window_ids: &[WindowId]) -> Result<GroupId, GroupError> {
        self.groups.create_group(name, window_ids, &mut self.store)
    }

    pub fn add_window_to_group(&mut self, window_id: WindowId, group_id: GroupId) -> bool {
        self.groups.add_window_to_group(window_id, group_id, &mut self.store)
    }

    pub fn remove_window_from_group(&mut self, window_id: WindowId) -> bool {
        self.groups.remove_window_from_group(window_id, &mut self.store)
    }

    pub fn set_active_window_in_group(&mut self, group_id: GroupId, window_id: WindowId) -> bool {
        self.groups.set_active_window_in_group(group_id, window_id, &mut self.store)
    }

    pub fn collapse_group(&mut self, group_id: GroupId) -> bool {
        let collapsed = self.groups.collapse_group(group_id, &mut self.store);
        self.release_displaced_cells();
        collapsed
    }

    pub fn expand_group(&mut self, group_id: GroupId) -> bool {
        self.groups.expand_group(group_id, &mut self.store)
    }

    /// Closes a group and all of its windows.
    pub fn close_group(&mut self, group_id: GroupId) -> bool {
        let Some(group) = self.groups.get_group(group_id) else {
            return false;
        };
        for &id in &group.window_ids {
            self.interaction.end_for_window(id);
            self.grid.release_window(id);
        }
        self.groups.close_group(group_id, &mut self.store)
    }

    #[must_use]
    pub fn get_group(&self, group_id: GroupId) -> Option<WindowGroup> { self.groups.get_group(group_id) }

    fn resolve_group(&self, group: &GroupRef) -> Option<GroupId> {
        match group {
            GroupRef::Id(id) => self.groups.get_group(*id).map(|g| g.id),
            GroupRef::Name(name) => self.groups.find_by_name(name),
        }
    }

    // ========================================================================
    // Grid
    // ========================================================================

    /// Selects a grid layout.
    ///
    /// # Errors
    ///
    /// Returns `GridError::UnknownLayout` for an unknown id.
    pub fn select_layout(&mut self, layout_id: &str) -> Result<(), GridError> { self.grid.select_layout(layout_id) }

    pub fn set_grid_monitor(&mut self, monitor_id: MonitorId) -> bool {
        self.grid.set_active_monitor(monitor_id, &self.monitors)
    }

    #[must_use]
    pub fn get_available_cells(&self) -> Vec<GridCell> { self.grid.get_available_cells() }

    /// Places a window in a grid cell.
    ///
    /// # Errors
    ///
    /// See [`LayoutGridEngine::assign_window_to_cell`].
    pub fn assign_window_to_cell(&mut self, window_id: WindowId, cell_id: &str) -> Result<Rect, GridError> {
        self.grid.assign_window_to_cell(window_id, cell_id, &mut self.store, &self.monitors)
    }

    /// Fills free cells with windows in order.
    ///
    /// # Errors
    ///
    /// Returns `GridError::NoActiveLayout` when no layout is selected.
    pub fn auto_arrange_windows(&mut self, window_ids: &[WindowId]) -> Result<ArrangeReport, GridError> {
        self.grid.auto_arrange_windows(window_ids, &mut self.store, &self.monitors)
    }

    // ========================================================================
    // Monitors
    // ========================================================================

    /// Re-enumerates monitors and re-evaluates window placement.
    ///
    /// This is the only suspension point of the engine. The result is applied
    /// as one discrete step once the source resolves.
    pub async fn refresh_monitors(&mut self, source: &dyn MonitorSource) -> (MonitorChange, Vec<WindowId>) {
        let result = source.enumerate().await;
        self.apply_monitors(result)
    }

    /// Applies an enumeration result and re-evaluates window placement.
    pub fn apply_monitors(
        &mut self,
        result: Result<Vec<MonitorDescriptor>, MonitorSourceError>,
    ) -> (MonitorChange, Vec<WindowId>) {
        let change = self.monitors.apply_enumeration(result);
        let reassigned = if change.is_empty() { Vec::new() } else { self.store.reassign_monitors(&self.monitors) };
        self.release_displaced_cells();
        (change, reassigned)
    }

    pub fn set_primary_monitor(&mut self, id: MonitorId) -> bool {
        let changed = self.monitors.set_primary_monitor(id);
        self.release_displaced_cells();
        changed
    }

    pub fn rename_monitor(&mut self, id: MonitorId, name: &str) -> bool { self.monitors.rename_monitor(id, name) }

    /// Updates the browser viewport backing the fallback monitor.
    pub fn set_viewport(&mut self, bounds: Rect) -> bool {
        if !self.monitors.set_viewport(bounds) {
            return false;
        }
        self.store.reassign_monitors(&self.monitors);
        self.release_displaced_cells();
        true
    }

    // ========================================================================
    // Consistency
    // ========================================================================

    /// Checks every cross-component invariant.
    #[must_use]
    pub fn validate(&self) -> Vec<InvariantViolation> {
        let mut violations = self.store.check_invariants(&self.monitors);
        violations.extend(self.groups.check_invariants(&self.store));
        violations
    }

    /// Repairs group membership drift and stale monitor and grid cell
    /// assignments.
    ///
    /// Returns the number of repairs.
    pub fn heal(&mut self) -> usize {
        let repairs = self.groups.heal(&mut self.store) + self.store.reassign_monitors(&self.monitors).len();
        repairs + self.grid.release_displaced(&self.store, &self.monitors).len()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    fn at(&self, ms: u64) -> Instant { self.epoch + Duration::from_millis(ms) }

    /// Applies one command.
    pub fn dispatch(&mut self, command: DesktopCommand) -> CommandOutcome {
        tracing::trace!(?command, "desktop: dispatch");
        let group_outcome = |desktop: &mut Self, group: &GroupRef, f: fn(&mut Self, GroupId) -> bool| {
            desktop.resolve_group(group).map_or(CommandOutcome::Ignored, |id| CommandOutcome::from_bool(f(desktop, id)))
        };

        match command {
            DesktopCommand::Open { component_id, title, geometry } => {
                match self.open_window(component_id.as_str(), OpenArgs { title, geometry }) {
                    Some(window_id) => CommandOutcome::Opened { window_id },
                    None => CommandOutcome::Failed { error: format!("unknown component '{component_id}'") },
                }
            }
            DesktopCommand::Close { window_id } => CommandOutcome::from_bool(self.close_window(window_id)),
            DesktopCommand::Focus { window_id } => CommandOutcome::from_bool(self.focus_window(window_id)),
            DesktopCommand::Move { window_id, x, y } => {
                CommandOutcome::from_bool(self.move_window(window_id, Point::new(x, y)))
            }
            DesktopCommand::Resize { window_id, width, height } => {
                CommandOutcome::from_bool(self.resize_window(window_id, Size::new(width, height)))
            }
            DesktopCommand::Minimize { window_id } => CommandOutcome::from_bool(self.minimize_window(window_id)),
            DesktopCommand::Restore { window_id } => CommandOutcome::from_bool(self.restore_window(window_id)),
            DesktopCommand::Maximize { window_id } => CommandOutcome::from_bool(self.maximize_window(window_id)),
            DesktopCommand::Unmaximize { window_id } => {
                CommandOutcome::from_bool(self.unmaximize_window(window_id))
            }
            DesktopCommand::ToggleMaximize { window_id } => {
                CommandOutcome::from_bool(self.toggle_maximize(window_id))
            }

            DesktopCommand::BeginMove { window_id, pointer } => {
                CommandOutcome::from_bool(self.begin_move(window_id, pointer))
            }
            DesktopCommand::BeginResize { window_id, edge, pointer } => {
                CommandOutcome::from_bool(self.begin_resize(window_id, edge, pointer))
            }
            DesktopCommand::PointerMove { pointer, at_ms } => {
                let now = self.at(at_ms);
                let active = self.interaction.is_active();
                self.pointer_move(pointer, now);
                CommandOutcome::from_bool(active)
            }
            DesktopCommand::AnimationFrame { at_ms } => {
                let now = self.at(at_ms);
                CommandOutcome::from_bool(self.animation_frame(now))
            }
            DesktopCommand::PointerUp => {
                self.pointer_up().map_or(CommandOutcome::Ignored, |frame| CommandOutcome::Placed { frame })
            }
            DesktopCommand::LostCapture => CommandOutcome::from_bool(self.cancel_interaction()),
            DesktopCommand::Key { key } => CommandOutcome::from_bool(self.key_input(key)),

            DesktopCommand::CreateGroup { name, window_ids } => match self.create_group(&name, &window_ids) {
                Ok(group_id) => CommandOutcome::GroupCreated { group_id },
                Err(err) => CommandOutcome::Failed { error: err.to_string() },
            },
            DesktopCommand::AddToGroup { window_id, group } => match self.resolve_group(&group) {
                Some(group_id) => CommandOutcome::from_bool(self.add_window_to_group(window_id, group_id)),
                None => CommandOutcome::Ignored,
            },
            DesktopCommand::RemoveFromGroup { window_id } => {
                CommandOutcome::from_bool(self.remove_window_from_group(window_id))
            }
            DesktopCommand::SetActiveInGroup { group, window_id } => match self.resolve_group(&group) {
                Some(group_id) => CommandOutcome::from_bool(self.set_active_window_in_group(group_id, window_id)),
                None => CommandOutcome::Ignored,
            },
            DesktopCommand::CollapseGroup { group } => group_outcome(self, &group, Self::collapse_group),
            DesktopCommand::ExpandGroup { group } => group_outcome(self, &group, Self::expand_group),
            DesktopCommand::CloseGroup { group } => group_outcome(self, &group, Self::close_group),

            DesktopCommand::SelectLayout { layout_id } => match self.select_layout(&layout_id) {
                Ok(()) => CommandOutcome::Done,
                Err(err) => CommandOutcome::Failed { error: err.to_string() },
            },
            DesktopCommand::SetGridMonitor { monitor_id } => {
                CommandOutcome::from_bool(self.set_grid_monitor(monitor_id))
            }
            DesktopCommand::AssignCell { window_id, cell_id } => {
                match self.assign_window_to_cell(window_id, &cell_id) {
                    Ok(frame) => CommandOutcome::Placed { frame },
                    Err(err) => CommandOutcome::Failed { error: err.to_string() },
                }
            }
            DesktopCommand::AutoArrange { window_ids } => match self.auto_arrange_windows(&window_ids) {
                Ok(report) => CommandOutcome::Arranged { report },
                Err(err) => CommandOutcome::Failed { error: err.to_string() },
            },

            DesktopCommand::SetMonitors { monitors } => {
                let (change, reassigned) = self.apply_monitors(Ok(monitors));
                CommandOutcome::MonitorsUpdated { change, reassigned }
            }
            DesktopCommand::SetPrimaryMonitor { monitor_id } => {
                CommandOutcome::from_bool(self.set_primary_monitor(monitor_id))
            }
            DesktopCommand::RenameMonitor { monitor_id, name } => {
                CommandOutcome::from_bool(self.rename_monitor(monitor_id, &name))
            }
            DesktopCommand::SetViewport { bounds } => CommandOutcome::from_bool(self.set_viewport(bounds)),

            DesktopCommand::Heal => CommandOutcome::Healed { repairs: self.heal() },
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::desktop::events::drain;
    use crate::desktop::monitor::StaticMonitorSource;

    fn desktop() -> Desktop { Desktop::new(DeskshellConfig::default()) }

    fn open(desktop: &mut Desktop, component: &str) -> WindowId {
        desktop.open_window(component, OpenArgs::default()).unwrap()
    }

    mod flow_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_close_releases_grid_cell() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            desktop.assign_window_to_cell(a, "left").unwrap();

            assert!(desktop.close_window(a));
            assert_eq!(desktop.get_available_cells().len(), 2);
            assert!(!desktop.close_window(a));
        }

        #[test]
        fn test_leaving_cell_frees_it() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            let b = open(&mut desktop, "files");
            desktop.auto_arrange_windows(&[a, b]).unwrap();
            assert!(desktop.get_available_cells().is_empty());

            assert!(desktop.move_window(a, Point::new(300.0, 200.0)));
            let free: Vec<String> = desktop.get_available_cells().into_iter().map(|c| c.id).collect();
            assert_eq!(free, ["left"]);

            assert!(desktop.maximize_window(b));
            assert_eq!(desktop.get_available_cells().len(), 2);
        }

        #[test]
        fn test_dragging_off_cell_frees_it() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            desktop.assign_window_to_cell(a, "right").unwrap();

            assert!(desktop.begin_move(a, Point::new(1200.0, 40.0)));
            desktop.pointer_move(Point::new(1000.0, 240.0), Instant::now());
            desktop.pointer_up();

            assert_eq!(desktop.grid().cell_for_window(a), None);
            assert_eq!(desktop.get_available_cells().len(), 2);
        }

        #[test]
        fn test_close_during_drag_wins() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            desktop.begin_move(a, Point::new(200.0, 90.0));
            desktop.close_window(a);

            assert!(!desktop.interaction().is_active());
            assert!(!desktop.pointer_move(Point::new(400.0, 300.0), Instant::now()));
            assert!(desktop.validate().is_empty());
        }

        #[test]
        fn test_close_group_releases_cells() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            let b = open(&mut desktop, "files");
            let group = desktop.create_group("Pair", &[a, b]).unwrap();
            desktop.auto_arrange_windows(&[a, b]).unwrap();

            assert!(desktop.close_group(group));
            assert!(desktop.windows().is_empty());
            assert_eq!(desktop.get_available_cells().len(), 2);
        }

        #[test]
        fn test_monitor_refresh_reassigns_windows() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            let source = StaticMonitorSource::new(vec![
                MonitorDescriptor::new(MonitorId(7), Rect::new(0.0, 0.0, 2560.0, 1440.0)).primary(),
            ]);

            let (change, reassigned) = block_on(desktop.refresh_monitors(&source));
            assert_eq!(change.added, vec![MonitorId(7)]);
            assert_eq!(reassigned, vec![a]);
            assert_eq!(desktop.get_window(a).unwrap().monitor_id, Some(MonitorId(7)));
            assert!(desktop.validate().is_empty());
        }

        #[test]
        fn test_events_reach_subscribers() {
            let mut desktop = desktop();
            let mut rx = desktop.subscribe();
            let a = open(&mut desktop, "notepad");
            desktop.close_window(a);

            let names: Vec<&str> = drain(&mut rx).iter().map(DesktopEvent::name).collect();
            assert_eq!(names, vec!["windowOpened", "windowFocused", "windowClosed", "windowFocused"]);
        }
    }

    mod dispatch_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_dispatch_script() {
            let mut desktop = desktop();
            let script: Vec<DesktopCommand> = serde_json::from_str(
                r#"[
                    { "op": "open", "componentId": "notepad" },
                    { "op": "open", "componentId": "files" },
                    { "op": "createGroup", "name": "Work", "windowIds": [1, 2] },
                    { "op": "collapseGroup", "group": "Work" },
                    { "op": "expandGroup", "group": "Work" },
                    { "op": "assignCell", "windowId": 2, "cellId": "right" },
                    { "op": "close", "windowId": 9 }
                ]"#,
            )
            .unwrap();

            let outcomes: Vec<CommandOutcome> = script.into_iter().map(|c| desktop.dispatch(c)).collect();
            assert_eq!(outcomes[0], CommandOutcome::Opened { window_id: WindowId(1) });
            assert!(matches!(outcomes[2], CommandOutcome::GroupCreated { .. }));
            assert_eq!(outcomes[3], CommandOutcome::Done);
            assert_eq!(outcomes[5], CommandOutcome::Placed { frame: Rect::new(960.0, 28.0, 960.0, 972.0) });
            assert_eq!(outcomes[6], CommandOutcome::Ignored);
            assert!(desktop.validate().is_empty());
        }

        #[test]
        fn test_dispatch_unknown_component_fails() {
            let mut desktop = desktop();
            let outcome = desktop.dispatch(DesktopCommand::Open {
                component_id: ComponentId::from("doom"),
                title: None,
                geometry: None,
            });
            assert!(matches!(outcome, CommandOutcome::Failed { ref error } if error.contains("doom")));
        }

        #[test]
        fn test_dispatch_unknown_group_is_ignored() {
            let mut desktop = desktop();
            let outcome = desktop.dispatch(DesktopCommand::CollapseGroup { group: GroupRef::Name("nope".into()) });
            assert_eq!(outcome, CommandOutcome::Ignored);
        }

        #[test]
        fn test_dispatch_drag_with_timestamps() {
            let mut desktop = desktop();
            let a = open(&mut desktop, "notepad");
            desktop.dispatch(DesktopCommand::BeginMove { window_id: a, pointer: Point::new(300.0, 90.0) });
            desktop.dispatch(DesktopCommand::PointerMove { pointer: Point::new(500.0, 290.0), at_ms: 0 });
            desktop.dispatch(DesktopCommand::PointerMove { pointer: Point::new(520.0, 300.0), at_ms: 5 });
            let outcome = desktop.dispatch(DesktopCommand::PointerUp);
            assert_eq!(outcome, CommandOutcome::Placed { frame: Rect::new(340.0, 290.0, 640.0, 480.0) });
        }
    }

    #[test]
    fn test_heal_repairs_dangling_group_reference() {
        let mut desktop = desktop();
        let a = open(&mut desktop, "notepad");
        desktop.store.set_group(a, Some(GroupId::new()));
        assert_eq!(desktop.validate().len(), 1);
        assert_eq!(desktop.heal(), 1);
        assert!(desktop.validate().is_empty());
    }
}
