//! End-to-end scenarios for the desktop engine.
//!
//! These drive a headless [`Desktop`] through its public API the way a host
//! would: open windows, drag them with pointer events, group them, and change
//! the monitor set underneath them.

use std::time::{Duration, Instant};

use deskshell_lib::config::DeskshellConfig;
use deskshell_lib::desktop::events::drain;
use deskshell_lib::desktop::{
    CommandOutcome, Desktop, DesktopCommand, DesktopEvent, KeyInput, LifecycleState, MonitorDescriptor,
    MonitorId, OpenArgs, Point, Rect, ResizeEdge, SnapKind, SnapZone, StaticMonitorSource, WindowId,
};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn desktop() -> Desktop { Desktop::new(DeskshellConfig::default()) }

fn open_at(desktop: &mut Desktop, component: &str, geometry: Rect) -> WindowId {
    let args = OpenArgs { geometry: Some(geometry), ..OpenArgs::default() };
    desktop.open_window(component, args).unwrap()
}

fn geometry(desktop: &Desktop, id: WindowId) -> Rect { desktop.get_window(id).unwrap().geometry }

fn dual_monitors() -> Vec<MonitorDescriptor> {
    vec![
        MonitorDescriptor::new(MonitorId(1), Rect::new(0.0, 0.0, 1920.0, 1080.0)).primary(),
        MonitorDescriptor::new(MonitorId(2), Rect::new(1920.0, 0.0, 2560.0, 1440.0)),
    ]
}

/// Drags `id` from `grab` by `(dx, dy)` in one frame and releases.
fn drag(desktop: &mut Desktop, id: WindowId, grab: Point, dx: f64, dy: f64) -> Option<Rect> {
    assert!(desktop.begin_move(id, grab));
    desktop.pointer_move(Point::new(grab.x + dx, grab.y + dy), Instant::now());
    desktop.pointer_up()
}

// ============================================================================
// Stacking and focus
// ============================================================================

#[test]
fn test_z_order_is_unique_and_focus_is_topmost() {
    let mut desktop = desktop();
    let ids: Vec<WindowId> = ["notepad", "files", "calculator"]
        .iter()
        .map(|c| desktop.open_window(c, OpenArgs::default()).unwrap())
        .collect();

    desktop.focus_window(ids[0]);

    let windows = desktop.windows();
    let mut z: Vec<u32> = windows.iter().map(|w| w.z_index).collect();
    z.dedup();
    assert_eq!(z.len(), 3);
    assert_eq!(windows.last().map(|w| w.id), Some(ids[0]));
    assert_eq!(windows.iter().filter(|w| w.focused).count(), 1);
    assert_eq!(desktop.focused_window_id(), Some(ids[0]));
    assert!(desktop.validate().is_empty());
}

#[test]
fn test_closing_focused_window_focuses_next_topmost() {
    let mut desktop = desktop();
    let w1 = desktop.open_window("notepad", OpenArgs::default()).unwrap();
    let w2 = desktop.open_window("files", OpenArgs::default()).unwrap();
    let w3 = desktop.open_window("calculator", OpenArgs::default()).unwrap();
    assert_eq!(desktop.focused_window_id(), Some(w3));

    assert!(desktop.close_window(w3));
    assert_eq!(desktop.focused_window_id(), Some(w2));

    assert!(desktop.close_window(w2));
    assert_eq!(desktop.focused_window_id(), Some(w1));

    assert!(!desktop.close_window(w3));
    assert!(desktop.validate().is_empty());
}

#[test]
fn test_minimized_windows_are_skipped_by_succession() {
    let mut desktop = desktop();
    let w1 = desktop.open_window("notepad", OpenArgs::default()).unwrap();
    let w2 = desktop.open_window("files", OpenArgs::default()).unwrap();
    let w3 = desktop.open_window("notepad", OpenArgs::default()).unwrap();

    assert!(desktop.minimize_window(w2));
    assert!(desktop.close_window(w3));
    assert_eq!(desktop.focused_window_id(), Some(w1));
    assert_eq!(desktop.get_window(w2).unwrap().lifecycle, LifecycleState::Minimized);

    assert!(desktop.restore_window(w2));
    assert_eq!(desktop.focused_window_id(), Some(w2));
    assert!(desktop.validate().is_empty());
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn test_groups_never_become_empty() {
    let mut desktop = desktop();
    let w1 = desktop.open_window("notepad", OpenArgs::default()).unwrap();
    let w2 = desktop.open_window("files", OpenArgs::default()).unwrap();

    let group = desktop.create_group("Work", &[w1, w2]).unwrap();
    assert_eq!(desktop.get_group(group).unwrap().active_window_id, w1);

    assert!(desktop.remove_window_from_group(w1));
    assert_eq!(desktop.get_group(group).unwrap().active_window_id, w2);

    assert!(desktop.close_window(w2));
    assert!(desktop.get_group(group).is_none());
    assert!(desktop.groups().is_empty());
    assert_eq!(desktop.get_window(w1).unwrap().group_id, None);
    assert!(desktop.validate().is_empty());
}

#[test]
fn test_collapse_and_expand_group() {
    let mut desktop = desktop();
    let w1 = desktop.open_window("notepad", OpenArgs::default()).unwrap();
    let w2 = desktop.open_window("files", OpenArgs::default()).unwrap();
    let group = desktop.create_group("Work", &[w1, w2]).unwrap();

    assert!(desktop.collapse_group(group));
    assert!(desktop.windows().iter().all(|w| w.lifecycle == LifecycleState::Minimized));
    assert_eq!(desktop.focused_window_id(), None);

    assert!(desktop.expand_group(group));
    assert!(desktop.windows().iter().all(|w| w.lifecycle == LifecycleState::Normal));
    assert_eq!(desktop.focused_window_id(), Some(w1));
    assert!(desktop.validate().is_empty());
}

#[test]
fn test_close_group_closes_members() {
    let mut desktop = desktop();
    let w1 = desktop.open_window("notepad", OpenArgs::default()).unwrap();
    let w2 = desktop.open_window("files", OpenArgs::default()).unwrap();
    let w3 = desktop.open_window("calculator", OpenArgs::default()).unwrap();
    let group = desktop.create_group("Work", &[w1, w2]).unwrap();

    assert!(desktop.close_group(group));
    assert_eq!(desktop.windows().iter().map(|w| w.id).collect::<Vec<_>>(), [w3]);
    assert!(desktop.groups().is_empty());
}

// ============================================================================
// Snapping
// ============================================================================

#[test]
fn test_snap_is_idempotent() {
    let desktop = desktop();
    let engine = desktop.snap_engine();
    let monitor = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    let others = [Rect::new(700.0, 100.0, 400.0, 300.0)];
    let proposed = Rect::new(12.0, 95.0, 640.0, 480.0);

    let first = engine.calculate_snap(proposed, &others, monitor, false);
    let second = engine.calculate_snap(proposed, &others, monitor, false);
    assert_eq!(first, second);

    // Snapping the result again changes nothing.
    let again = engine.calculate_snap(first.frame(), &others, monitor, false);
    assert_eq!(again.frame(), first.frame());
}

#[test]
fn test_drag_near_left_edge_snaps_to_zero() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));

    let frame = drag(&mut desktop, id, Point::new(400.0, 210.0), -288.0, 0.0).unwrap();
    assert_eq!(frame, Rect::new(0.0, 200.0, 640.0, 480.0));
    assert_eq!(geometry(&desktop, id).x, 0.0);
}

#[test]
fn test_drag_past_left_edge_fills_left_half() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));

    let frame = drag(&mut desktop, id, Point::new(400.0, 210.0), -400.0, 0.0).unwrap();
    assert_eq!(frame, Rect::new(0.0, 0.0, 960.0, 1080.0));

    let window = desktop.get_window(id).unwrap();
    assert!(matches!(window.snap, Some(SnapKind::Zone { zone: SnapZone::LeftHalf })));
}

#[test]
fn test_dragging_out_of_zone_restores_window_size() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));
    let start = Instant::now();

    assert!(desktop.begin_move(id, Point::new(400.0, 210.0)));
    assert!(desktop.pointer_move(Point::new(0.0, 210.0), start));
    assert_eq!(geometry(&desktop, id), Rect::new(0.0, 0.0, 960.0, 1080.0));

    assert!(desktop.pointer_move(Point::new(600.0, 210.0), start + Duration::from_millis(20)));
    assert_eq!(desktop.pointer_up(), Some(Rect::new(500.0, 200.0, 640.0, 480.0)));
    assert_eq!(desktop.get_window(id).unwrap().snap, None);

    // A later drag starts from the restored size.
    let frame = drag(&mut desktop, id, Point::new(600.0, 210.0), 100.0, 50.0).unwrap();
    assert_eq!(frame, Rect::new(600.0, 250.0, 640.0, 480.0));
}

#[test]
fn test_right_zone_releases_after_release_distance() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(1000.0, 200.0, 640.0, 480.0));
    let start = Instant::now();
    let at = |ms: u64| start + Duration::from_millis(ms);

    assert!(desktop.begin_move(id, Point::new(1100.0, 210.0)));

    // Right edge 30px past the monitor: the zone engages.
    assert!(desktop.pointer_move(Point::new(1410.0, 210.0), at(0)));
    assert_eq!(geometry(&desktop, id), Rect::new(960.0, 0.0, 960.0, 1080.0));

    // Back to 10px past: still inside the hold depth.
    assert!(desktop.pointer_move(Point::new(1390.0, 210.0), at(20)));
    assert_eq!(geometry(&desktop, id), Rect::new(960.0, 0.0, 960.0, 1080.0));

    // 10px short of the edge: the zone lets go and the edge snap takes over
    // with the window's own width.
    assert!(desktop.pointer_move(Point::new(1370.0, 210.0), at(40)));
    assert_eq!(desktop.pointer_up(), Some(Rect::new(1280.0, 200.0, 640.0, 480.0)));
}

#[test]
fn test_snap_engine_half_screen_zone() {
    let desktop = desktop();
    let result = desktop.snap_engine().calculate_snap(
        Rect::new(-100.0, 300.0, 640.0, 480.0),
        &[],
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        false,
    );
    assert!(result.snapped);
    assert_eq!(result.frame(), Rect::new(0.0, 0.0, 960.0, 1080.0));
}

#[test]
fn test_resize_snaps_edge_to_monitor() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));

    assert!(desktop.begin_resize(id, ResizeEdge::East, Point::new(940.0, 400.0)));
    desktop.pointer_move(Point::new(1910.0, 400.0), Instant::now());
    let frame = desktop.pointer_up().unwrap();

    assert_eq!(frame.right(), 1920.0);
    assert_eq!(frame.x, 300.0);
}

// ============================================================================
// Interaction
// ============================================================================

#[test]
fn test_cancel_restores_last_committed_geometry() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));
    let start = Instant::now();

    assert!(desktop.begin_move(id, Point::new(400.0, 210.0)));
    assert!(desktop.pointer_move(Point::new(500.0, 310.0), start));
    let committed = geometry(&desktop, id);
    assert_eq!(committed, Rect::new(400.0, 300.0, 640.0, 480.0));

    // Inside the same frame: held back, not committed.
    assert!(!desktop.pointer_move(Point::new(600.0, 410.0), start + Duration::from_millis(4)));
    assert_eq!(geometry(&desktop, id), committed);

    assert!(desktop.key_input(KeyInput::Escape));
    assert_eq!(geometry(&desktop, id), committed);
    assert!(!desktop.interaction().is_active());
}

#[test]
fn test_pointer_up_flushes_pending_position() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));
    let start = Instant::now();

    desktop.begin_move(id, Point::new(400.0, 210.0));
    desktop.pointer_move(Point::new(450.0, 260.0), start);
    desktop.pointer_move(Point::new(500.0, 310.0), start + Duration::from_millis(2));

    assert_eq!(desktop.pointer_up(), Some(Rect::new(400.0, 300.0, 640.0, 480.0)));
}

#[test]
fn test_closing_window_mid_drag_ends_session() {
    let mut desktop = desktop();
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));

    desktop.begin_move(id, Point::new(400.0, 210.0));
    assert!(desktop.close_window(id));
    assert!(!desktop.interaction().is_active());
    assert_eq!(desktop.pointer_up(), None);
}

// ============================================================================
// Monitors
// ============================================================================

#[test]
fn test_move_reassigns_monitor() {
    let mut desktop = desktop();
    desktop.apply_monitors(Ok(dual_monitors()));
    let id = open_at(&mut desktop, "notepad", Rect::new(300.0, 200.0, 640.0, 480.0));
    assert_eq!(desktop.get_window(id).unwrap().monitor_id, Some(MonitorId(1)));

    assert!(desktop.move_window(id, Point::new(2200.0, 300.0)));
    assert_eq!(desktop.get_window(id).unwrap().monitor_id, Some(MonitorId(2)));
    assert!(desktop.validate().is_empty());
}

#[test]
fn test_unplugged_monitor_pulls_windows_back() {
    let mut desktop = desktop();
    block_on(desktop.refresh_monitors(&StaticMonitorSource::new(dual_monitors())));
    let id = open_at(&mut desktop, "notepad", Rect::new(2400.0, 300.0, 640.0, 480.0));

    let (change, reassigned) =
        block_on(desktop.refresh_monitors(&StaticMonitorSource::new(dual_monitors()[..1].to_vec())));
    assert_eq!(change.removed, [MonitorId(2)]);
    assert_eq!(reassigned, [id]);

    let window = desktop.get_window(id).unwrap();
    assert_eq!(window.monitor_id, Some(MonitorId(1)));
    assert!(Rect::new(0.0, 0.0, 1920.0, 1080.0).contains_point(window.geometry.center()));
}

#[test]
fn test_unavailable_enumeration_falls_back_to_viewport() {
    let mut desktop = desktop();
    let (change, _) = block_on(desktop.refresh_monitors(&StaticMonitorSource::unavailable()));

    assert!(change.fallback);
    assert!(desktop.monitors().is_fallback());
    assert_eq!(desktop.monitors().get_primary_monitor().bounds, Rect::new(0.0, 0.0, 1920.0, 1080.0));
}

// ============================================================================
// Grid
// ============================================================================

#[test]
fn test_auto_arrange_reports_overflow() {
    let mut desktop = desktop();
    let ids: Vec<WindowId> =
        (0..3).map(|_| desktop.open_window("notepad", OpenArgs::default()).unwrap()).collect();

    let report = desktop.auto_arrange_windows(&ids).unwrap();
    assert_eq!(report.placed, [(ids[0], "left".to_string()), (ids[1], "right".to_string())]);
    assert_eq!(report.skipped, [ids[2]]);
    assert!(desktop.get_available_cells().is_empty());

    // Closing a placed window frees its cell.
    desktop.close_window(ids[0]);
    let free: Vec<String> = desktop.get_available_cells().into_iter().map(|c| c.id).collect();
    assert_eq!(free, ["left"]);
}

// ============================================================================
// Commands and events
// ============================================================================

#[test]
fn test_scripted_session_emits_events() {
    let mut desktop = desktop();
    let mut events = desktop.subscribe();

    let script = r#"[
        { "op": "open", "componentId": "notepad", "geometry": { "x": 300, "y": 200, "width": 640, "height": 480 } },
        { "op": "open", "componentId": "files" },
        { "op": "beginMove", "windowId": 1, "pointer": { "x": 400, "y": 210 } },
        { "op": "pointerMove", "pointer": { "x": 112, "y": 210 }, "atMs": 0 },
        { "op": "pointerUp" },
        { "op": "selectLayout", "layoutId": "quarters" },
        { "op": "assignCell", "windowId": 2, "cellId": "bottom-right" },
        { "op": "createGroup", "name": "Docs", "windowIds": [1, 2] }
    ]"#;
    let commands: Vec<DesktopCommand> = serde_json::from_str(script).unwrap();
    let outcomes: Vec<CommandOutcome> = commands.into_iter().map(|c| desktop.dispatch(c)).collect();

    assert!(outcomes.iter().all(CommandOutcome::is_applied), "{outcomes:?}");
    assert_eq!(outcomes[4], CommandOutcome::Placed { frame: Rect::new(0.0, 200.0, 640.0, 480.0) });
    assert_eq!(outcomes[6], CommandOutcome::Placed { frame: Rect::new(960.0, 514.0, 960.0, 486.0) });

    let events = drain(&mut events);
    let opened = events.iter().filter(|e| matches!(e, DesktopEvent::WindowOpened { .. })).count();
    assert_eq!(opened, 2);
    assert!(events.iter().any(|e| matches!(e, DesktopEvent::GroupChanged { group: Some(_), .. })));
    assert!(desktop.validate().is_empty());
}
