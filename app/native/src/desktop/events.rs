//! Change notifications for hosts.
//!
//! Every component holds a clone of the same [`EventBus`]. Subscribers receive
//! owned snapshots over a `tokio::sync::broadcast` channel, so they can never
//! mutate engine state. Emitting with no subscribers is a no-op.

use serde::Serialize;
use tokio::sync::broadcast;

use super::monitor::Monitor;
use super::types::{ComponentId, GroupId, MonitorId, Window, WindowGroup, WindowId};

/// A change to desktop state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DesktopEvent {
    /// A window was opened.
    #[serde(rename_all = "camelCase")]
    WindowOpened { window: Window },

    /// A window was closed.
    #[serde(rename_all = "camelCase")]
    WindowClosed { window_id: WindowId, component_id: ComponentId },

    /// Focus moved. `window_id` is `None` when nothing is focused.
    #[serde(rename_all = "camelCase")]
    WindowFocused { window_id: Option<WindowId>, previous: Option<WindowId> },

    /// A window's geometry, lifecycle, group or monitor changed.
    #[serde(rename_all = "camelCase")]
    WindowChanged { window: Window },

    /// A group changed. `group` is `None` once it has been removed.
    #[serde(rename_all = "camelCase")]
    GroupChanged { group_id: GroupId, group: Option<WindowGroup> },

    /// The monitor set changed.
    #[serde(rename_all = "camelCase")]
    MonitorsChanged { monitors: Vec<Monitor>, added: Vec<MonitorId>, removed: Vec<MonitorId> },
}

impl DesktopEvent {
    /// Short name for logs and CLI output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WindowOpened { .. } => "windowOpened",
            Self::WindowClosed { .. } => "windowClosed",
            Self::WindowFocused { .. } => "windowFocused",
            Self::WindowChanged { .. } => "windowChanged",
            Self::GroupChanged { .. } => "groupChanged",
            Self::MonitorsChanged { .. } => "monitorsChanged",
        }
    }
}

/// Broadcast sender shared by all components.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DesktopEvent>,
}

impl EventBus {
    /// Creates a bus buffering `capacity` events per subscriber (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DesktopEvent> { self.sender.subscribe() }

    #[must_use]
    pub fn receiver_count(&self) -> usize { self.sender.receiver_count() }

    /// Emits an event to all current subscribers.
    pub fn emit(&self, event: DesktopEvent) {
        if self.sender.receiver_count() == 0 {
            return;
        }
        tracing::trace!(event = event.name(), "desktop: emit");
        // Only fails when every receiver was dropped in between.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self { Self::new(crate::constants::events::CHANNEL_CAPACITY) }
}

/// Drains every event currently buffered in `receiver`.
///
/// Lagged receivers skip what they missed and keep draining.
pub fn drain(receiver: &mut broadcast::Receiver<DesktopEvent>) -> Vec<DesktopEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "desktop: event subscriber lagged");
            }
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                break;
            }
        }
    }
    events
}
