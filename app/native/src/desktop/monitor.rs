//! Monitor registry.
//!
//! Holds the current set of virtual monitors and answers containment queries.
//! Enumeration comes from an asynchronous [`MonitorSource`] supplied by the
//! platform; its result is applied as one discrete state transition
//! ([`MonitorRegistry::apply_enumeration`]), so the registry never observes a
//! half-applied enumeration.
//!
//! When the platform cannot enumerate (or reports nothing usable) the registry
//! holds one synthetic primary monitor covering the viewport, and the desktop
//! stays fully interactive.
//!
//! Exactly one monitor is primary at all times.

use std::collections::BTreeMap;

use eyeball_im::ObservableVector;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::events::{DesktopEvent, EventBus};
use super::geometry::{Point, Rect};
use super::types::MonitorId;
use crate::config::MonitorsConfig;
use crate::constants;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Orientation implied by a rectangle's aspect.
    #[must_use]
    pub fn from_bounds(bounds: &Rect) -> Self {
        if bounds.height > bounds.width { Self::Portrait } else { Self::Landscape }
    }
}

/// A virtual monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,

    /// Bounds in desktop space.
    pub bounds: Rect,

    pub scale_factor: f64,
    pub orientation: Orientation,
    pub is_primary: bool,
}

/// A monitor as reported by the platform. Missing fields get defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorDescriptor {
    pub id: MonitorId,
    #[serde(default)]
    pub name: Option<String>,
    pub bounds: Rect,
    #[serde(default)]
    pub scale_factor: Option<f64>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub is_primary: bool,
}

impl MonitorDescriptor {
    /// Descriptor with only an id and bounds.
    #[must_use]
    pub const fn new(id: MonitorId, bounds: Rect) -> Self {
        Self { id, name: None, bounds, scale_factor: None, orientation: None, is_primary: false }
    }

    /// Marks this descriptor as the platform's primary monitor.
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Why the platform could not enumerate monitors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MonitorSourceError {
    #[error("monitor enumeration is not available")]
    Unavailable,
    #[error("monitor enumeration failed: {0}")]
    Failed(String),
}

/// Platform capability that enumerates monitors.
///
/// This is the only suspension point of the engine.
pub trait MonitorSource {
    /// Enumerates the currently connected monitors.
    fn enumerate(&self) -> LocalBoxFuture<'_, Result<Vec<MonitorDescriptor>, MonitorSourceError>>;
}

/// A source returning a fixed list, for hosts without real enumeration and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticMonitorSource {
    monitors: Option<Vec<MonitorDescriptor>>,
}

impl StaticMonitorSource {
    #[must_use]
    pub const fn new(monitors: Vec<MonitorDescriptor>) -> Self { Self { monitors: Some(monitors) } }

    /// A source whose enumeration always reports `Unavailable`.
    #[must_use]
    pub const fn unavailable() -> Self { Self { monitors: None } }
}

impl MonitorSource for StaticMonitorSource {
    fn enumerate(&self) -> LocalBoxFuture<'_, Result<Vec<MonitorDescriptor>, MonitorSourceError>> {
        let result = self.monitors.clone().ok_or(MonitorSourceError::Unavailable);
        Box::pin(futures::future::ready(result))
    }
}

/// Summary of one applied enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorChange {
    pub added: Vec<MonitorId>,
    pub removed: Vec<MonitorId>,
    /// Bounds, scale or primary of a surviving monitor changed.
    pub updated: Vec<MonitorId>,
    /// The registry is showing the synthetic viewport monitor.
    pub fallback: bool,
}

impl MonitorChange {
    /// Whether anything observable changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

// ============================================================================
// MonitorRegistry
// ============================================================================

/// The single writer of monitor state.
pub struct MonitorRegistry {
    /// Monitors in enumeration order.
    monitors: ObservableVector<Monitor>,

    /// Bounds of the synthetic monitor.
    viewport: Rect,

    /// User renames, surviving re-enumeration.
    custom_names: BTreeMap<MonitorId, String>,

    /// User-chosen primary, surviving re-enumeration.
    preferred_primary: Option<MonitorId>,

    fallback: bool,

    events: EventBus,
}

impl MonitorRegistry {
    /// Creates a registry holding only the synthetic viewport monitor.
    #[must_use]
    pub fn new(config: &MonitorsConfig, events: EventBus) -> Self {
        let mut registry = Self {
            monitors: ObservableVector::new(),
            viewport: config.viewport,
            custom_names: config.names.clone(),
            preferred_primary: config.primary,
            fallback: true,
            events,
        };
        registry.monitors.push_back(registry.fallback_monitor());
        registry
    }

    fn fallback_monitor(&self) -> Monitor {
        let id = MonitorId(constants::monitor::FALLBACK_ID);
        let bounds = if self.viewport.is_valid() {
            self.viewport
        } else {
            Rect::new(0.0, 0.0, constants::monitor::VIEWPORT_WIDTH, constants::monitor::VIEWPORT_HEIGHT)
        };
        Monitor {
            id,
            name: self
                .custom_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| constants::monitor::FALLBACK_NAME.to_string()),
            bounds,
            scale_factor: 1.0,
            orientation: Orientation::from_bounds(&bounds),
            is_primary: true,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All monitors in enumeration order.
    #[must_use]
    pub fn get_monitors(&self) -> Vec<Monitor> { self.monitors.iter().cloned().collect() }

    /// Iterates monitors without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &Monitor> { self.monitors.iter() }

    #[must_use]
    pub fn len(&self) -> usize { self.monitors.len() }

    /// Never true: the fallback monitor stands in for an empty enumeration.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.monitors.is_empty() }

    /// Whether the synthetic viewport monitor is in use.
    #[must_use]
    pub const fn is_fallback(&self) -> bool { self.fallback }

    #[must_use]
    pub fn get_monitor(&self, id: MonitorId) -> Option<Monitor> {
        self.monitors.iter().find(|m| m.id == id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: MonitorId) -> bool { self.monitors.iter().any(|m| m.id == id) }

    fn monitor_index(&self, id: MonitorId) -> Option<usize> {
        self.monitors.iter().position(|m| m.id == id)
    }

    /// The primary monitor.
    #[must_use]
    pub fn get_primary_monitor(&self) -> Monitor {
        self.monitors
            .iter()
            .find(|m| m.is_primary)
            .or_else(|| self.monitors.iter().next())
            .cloned()
            .unwrap_or_else(|| self.fallback_monitor())
    }

    /// The monitor containing `point`, else the primary monitor.
    #[must_use]
    pub fn get_monitor_for_point(&self, point: Point) -> Monitor {
        self.monitors
            .iter()
            .find(|m| m.bounds.contains_point(point))
            .cloned()
            .unwrap_or_else(|| self.get_primary_monitor())
    }

    /// The monitor containing the centre of `rect`, else the nearest one.
    ///
    /// Ties go to the monitor listed first.
    #[must_use]
    pub fn monitor_for_rect(&self, rect: &Rect) -> Monitor {
        let center = rect.center();
        if !center.is_finite() {
            return self.get_primary_monitor();
        }
        if let Some(monitor) = self.monitors.iter().find(|m| m.bounds.contains_point(center)) {
            return monitor.clone();
        }

        let mut nearest: Option<(&Monitor, f64)> = None;
        for monitor in self.monitors.iter() {
            let distance = monitor.bounds.distance_to_point(center);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((monitor, distance));
            }
        }
        nearest.map_or_else(|| self.get_primary_monitor(), |(monitor, _)| monitor.clone())
    }

    // ========================================================================
    // User Preferences
    // ========================================================================

    /// Makes `id` the primary monitor. Stale id: no-op returning false.
    pub fn set_primary_monitor(&mut self, id: MonitorId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.preferred_primary = Some(id);

        let before = self.get_monitors();
        self.apply_primary(id);
        let updated = changed_ids(&before, &self.get_monitors());
        if !updated.is_empty() {
            tracing::info!(monitor_id = %id, "desktop: primary monitor changed");
            self.emit_change(Vec::new(), Vec::new());
        }
        true
    }

    /// Renames a monitor. Stale id: no-op returning false.
    pub fn rename_monitor(&mut self, id: MonitorId, name: &str) -> bool {
        let Some(idx) = self.monitor_index(id) else {
            return false;
        };
        self.custom_names.insert(id, name.to_string());

        let mut monitor = self.monitors[idx].clone();
        if monitor.name != name {
            monitor.name = name.to_string();
            self.monitors.set(idx, monitor);
            self.emit_change(Vec::new(), Vec::new());
        }
        true
    }

    /// Updates the viewport used by the synthetic monitor.
    pub fn set_viewport(&mut self, viewport: Rect) -> bool {
        if !viewport.is_valid() {
            return false;
        }
        self.viewport = viewport;
        if self.fallback {
            let monitor = self.fallback_monitor();
            if self.monitors.iter().next() != Some(&monitor) {
                self.monitors.clear();
                self.monitors.push_back(monitor);
                self.emit_change(Vec::new(), Vec::new());
            }
        }
        true
    }

    fn apply_primary(&mut self, id: MonitorId) {
        for idx in 0..self.monitors.len() {
            let is_primary = self.monitors[idx].id == id;
            if self.monitors[idx].is_primary != is_primary {
                let mut monitor = self.monitors[idx].clone();
                monitor.is_primary = is_primary;
                self.monitors.set(idx, monitor);
            }
        }
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Enumerates monitors from `source` and applies the result.
    pub async fn refresh(&mut self, source: &dyn MonitorSource) -> MonitorChange {
        let result = source.enumerate().await;
        self.apply_enumeration(result)
    }

    /// Applies an enumeration result as one state transition.
    ///
    /// Invalid descriptors (non-finite or empty bounds) and duplicate ids are
    /// dropped. If nothing usable remains, or enumeration failed, the registry
    /// falls back to the synthetic viewport monitor.
    pub fn apply_enumeration(
        &mut self,
        result: Result<Vec<MonitorDescriptor>, MonitorSourceError>,
    ) -> MonitorChange {
        let next = match result {
            Ok(descriptors) => self.normalize(descriptors),
            Err(err) => {
                tracing::warn!(error = %err, "desktop: monitor enumeration unavailable, using viewport");
                Vec::new()
            }
        };

        let (next, fallback) = if next.is_empty() {
            if self.monitors.is_empty() || !self.fallback {
                tracing::warn!("desktop: no monitors reported, using viewport");
            }
            (vec![self.fallback_monitor()], true)
        } else {
            (next, false)
        };

        let before = self.get_monitors();
        let added: Vec<MonitorId> =
            next.iter().filter(|m| !before.iter().any(|b| b.id == m.id)).map(|m| m.id).collect();
        let removed: Vec<MonitorId> =
            before.iter().filter(|b| !next.iter().any(|m| m.id == b.id)).map(|b| b.id).collect();

        for id in &removed {
            if let Some(idx) = self.monitor_index(*id) {
                self.monitors.remove(idx);
            }
        }
        for monitor in &next {
            self.upsert_monitor(monitor.clone());
        }
        // Keep enumeration order.
        if self.get_monitors() != next {
            self.monitors.clear();
            for monitor in &next {
                self.monitors.push_back(monitor.clone());
            }
        }
        self.fallback = fallback;

        let after = self.get_monitors();
        let updated = changed_ids(&before, &after);
        let change = MonitorChange { added, removed, updated, fallback };

        if !change.is_empty() {
            tracing::info!(
                count = after.len(),
                added = change.added.len(),
                removed = change.removed.len(),
                fallback,
                "desktop: monitors changed"
            );
            self.emit_change(change.added.clone(), change.removed.clone());
        }
        change
    }

    fn upsert_monitor(&mut self, monitor: Monitor) {
        if let Some(idx) = self.monitor_index(monitor.id) {
            if self.monitors[idx] != monitor {
                self.monitors.set(idx, monitor);
            }
        } else {
            self.monitors.push_back(monitor);
        }
    }

    /// Turns descriptors into monitors with user preferences applied.
    fn normalize(&self, descriptors: Vec<MonitorDescriptor>) -> Vec<Monitor> {
        let mut monitors: Vec<Monitor> = Vec::with_capacity(descriptors.len());
        let mut platform_primary = None;

        for descriptor in descriptors {
            if !descriptor.bounds.is_valid() {
                tracing::warn!(monitor_id = %descriptor.id, "desktop: dropping monitor with invalid bounds");
                continue;
            }
            if monitors.iter().any(|m| m.id == descriptor.id) {
                tracing::warn!(monitor_id = %descriptor.id, "desktop: dropping duplicate monitor");
                continue;
            }
            if descriptor.is_primary && platform_primary.is_none() {
                platform_primary = Some(descriptor.id);
            }

            let ordinal = monitors.len() + 1;
            let name = self
                .custom_names
                .get(&descriptor.id)
                .cloned()
                .or(descriptor.name)
                .unwrap_or_else(|| format!("Display {ordinal}"));
            let scale_factor = descriptor
                .scale_factor
                .filter(|scale| scale.is_finite() && *scale > 0.0)
                .unwrap_or(1.0);

            monitors.push(Monitor {
                id: descriptor.id,
                name,
                bounds: descriptor.bounds,
                scale_factor,
                orientation: descriptor
                    .orientation
                    .unwrap_or_else(|| Orientation::from_bounds(&descriptor.bounds)),
                is_primary: false,
            });
        }

        let primary = self
            .preferred_primary
            .filter(|id| monitors.iter().any(|m| m.id == *id))
            .or(platform_primary)
            .or_else(|| monitors.first().map(|m| m.id));
        for monitor in &mut monitors {
            monitor.is_primary = Some(monitor.id) == primary;
        }
        monitors
    }

    fn emit_change(&self, added: Vec<MonitorId>, removed: Vec<MonitorId>) {
        self.events.emit(DesktopEvent::MonitorsChanged {
            monitors: self.get_monitors(),
            added,
            removed,
        });
    }
}

/// Ids present in both lists whose monitor differs.
fn changed_ids(before: &[Monitor], after: &[Monitor]) -> Vec<MonitorId> {
    after
        .iter()
        .filter(|m| before.iter().any(|b| b.id == m.id && *b != **m))
        .map(|m| m.id)
        .collect()
}
