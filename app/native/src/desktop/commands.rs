//! Serializable commands for driving a [`Desktop`](super::Desktop).
//!
//! Hosts such as the dock, the `simulate` CLI command and tests describe what
//! should happen as data. Pointer timestamps are milliseconds since the
//! desktop was created, so a replayed script is deterministic.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, ResizeEdge};
use super::grid::ArrangeReport;
use super::interaction::KeyInput;
use super::monitor::{MonitorChange, MonitorDescriptor};
use super::types::{ComponentId, GroupId, MonitorId, WindowId};

/// A group addressed by id or by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(GroupId),
    Name(String),
}

/// One operation on the desktop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DesktopCommand {
    // Windows
    Open {
        component_id: ComponentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        geometry: Option<Rect>,
    },
    Close { window_id: WindowId },
    Focus { window_id: WindowId },
    Move { window_id: WindowId, x: f64, y: f64 },
    Resize { window_id: WindowId, width: f64, height: f64 },
    Minimize { window_id: WindowId },
    Restore { window_id: WindowId },
    Maximize { window_id: WindowId },
    Unmaximize { window_id: WindowId },
    ToggleMaximize { window_id: WindowId },

    // Pointer and keyboard
    BeginMove { window_id: WindowId, pointer: Point },
    BeginResize { window_id: WindowId, edge: ResizeEdge, pointer: Point },
    PointerMove { pointer: Point, at_ms: u64 },
    AnimationFrame { at_ms: u64 },
    PointerUp,
    LostCapture,
    Key { key: KeyInput },

    // Groups
    CreateGroup { name: String, window_ids: Vec<WindowId> },
    AddToGroup { window_id: WindowId, group: GroupRef },
    RemoveFromGroup { window_id: WindowId },
    SetActiveInGroup { group: GroupRef, window_id: WindowId },
    CollapseGroup { group: GroupRef },
    ExpandGroup { group: GroupRef },
    CloseGroup { group: GroupRef },

    // Grid
    SelectLayout { layout_id: String },
    SetGridMonitor { monitor_id: MonitorId },
    AssignCell { window_id: WindowId, cell_id: String },
    AutoArrange { window_ids: Vec<WindowId> },

    // Monitors
    SetMonitors { monitors: Vec<MonitorDescriptor> },
    SetPrimaryMonitor { monitor_id: MonitorId },
    RenameMonitor { monitor_id: MonitorId, name: String },
    SetViewport { bounds: Rect },

    // Maintenance
    Heal,
}

/// What a command did.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandOutcome {
    /// Applied.
    Done,
    /// Stale reference or refused by a capability; nothing changed.
    Ignored,
    Opened { window_id: WindowId },
    GroupCreated { group_id: GroupId },
    Placed { frame: Rect },
    Arranged { report: ArrangeReport },
    MonitorsUpdated { change: MonitorChange, reassigned: Vec<WindowId> },
    Healed { repairs: usize },
    Failed { error: String },
}

impl CommandOutcome {
    #[must_use]
    pub const fn from_bool(applied: bool) -> Self { if applied { Self::Done } else { Self::Ignored } }

    /// `false` for `Ignored` and `Failed`.
    #[must_use]
    pub const fn is_applied(&self) -> bool { !matches!(self, Self::Ignored | Self::Failed { .. }) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_script() {
        let json = r#"[
            { "op": "open", "componentId": "notepad" },
            { "op": "move", "windowId": 1, "x": 10, "y": 20 },
            { "op": "beginResize", "windowId": 1, "edge": "south-east", "pointer": { "x": 1, "y": 2 } },
            { "op": "pointerUp" },
            { "op": "key", "key": "escape" },
            { "op": "createGroup", "name": "Work", "windowIds": [1, 2] },
            { "op": "collapseGroup", "group": "Work" }
        ]"#;
        let commands: Vec<DesktopCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 7);
        assert_eq!(
            commands[0],
            DesktopCommand::Open {
                component_id: ComponentId::from("notepad"),
                title: None,
                geometry: None
            }
        );
        assert_eq!(commands[1], DesktopCommand::Move { window_id: WindowId(1), x: 10.0, y: 20.0 });
        assert_eq!(
            commands[6],
            DesktopCommand::CollapseGroup { group: GroupRef::Name("Work".to_string()) }
        );
    }

    #[test]
    fn test_group_ref_prefers_uuid() {
        let id = GroupId::new();
        let json = format!("\"{id}\"");
        assert_eq!(serde_json::from_str::<GroupRef>(&json).unwrap(), GroupRef::Id(id));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(serde_json::from_str::<DesktopCommand>(r#"{ "op": "explode" }"#).is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(CommandOutcome::Opened { window_id: WindowId(3) }).unwrap();
        assert_eq!(json, serde_json::json!({ "result": "opened", "windowId": 3 }));
        assert!(!CommandOutcome::from_bool(false).is_applied());
    }
}
