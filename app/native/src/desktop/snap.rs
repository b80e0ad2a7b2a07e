//! Snap engine: adjusts in-progress drag/resize geometry.
//!
//! The engine is a pure function of its inputs. Everything it needs, including
//! the snap applied on the previous frame (for hysteresis), is passed in, so
//! the same request always produces the same result.
//!
//! # Priority
//!
//! The first rule that matches wins:
//!
//! 1. **Monitor edge**: a window edge within the threshold of the matching
//!    monitor edge is clamped exactly onto it. While moving the window is
//!    shifted; while resizing the edge itself moves.
//! 2. **Zone** (moves only): a window pushed past the left or right monitor
//!    edge by more than the threshold fills the left/right half of the usable
//!    bounds, or a quarter when it is also pushed past the top or bottom edge.
//!    A window inside an activation zone is never edge-clamped.
//! 3. **Window** (moves only): an edge within the threshold of another
//!    visible window's edge aligns to it. Only the position changes.
//! 4. Nothing matched: the geometry is returned unchanged.
//!
//! # Hysteresis
//!
//! A snap that was applied on the previous frame is held with the larger
//! release distance instead of the activation threshold.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{Insets, Point, Rect, Size};
use crate::config::SnapConfig;

// ============================================================================
// Snap Kinds
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalEdge {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum VerticalEdge {
    Top,
    Bottom,
}

/// Screen-edge activation zones and the fraction of the usable bounds they fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SnapZone {
    LeftHalf,
    RightHalf,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SnapZone {
    /// Geometry this zone gives a window inside `usable`.
    #[must_use]
    pub fn frame(self, usable: &Rect) -> Rect {
        let half_w = usable.width / 2.0;
        let half_h = usable.height / 2.0;
        let mid_x = usable.x + half_w;
        let mid_y = usable.y + half_h;

        match self {
            Self::LeftHalf => Rect::new(usable.x, usable.y, half_w, usable.height),
            Self::RightHalf => Rect::new(mid_x, usable.y, half_w, usable.height),
            Self::TopLeft => Rect::new(usable.x, usable.y, half_w, half_h),
            Self::TopRight => Rect::new(mid_x, usable.y, half_w, half_h),
            Self::BottomLeft => Rect::new(usable.x, mid_y, half_w, half_h),
            Self::BottomRight => Rect::new(mid_x, mid_y, half_w, half_h),
        }
    }

    const fn horizontal(self) -> HorizontalEdge {
        match self {
            Self::LeftHalf | Self::TopLeft | Self::BottomLeft => HorizontalEdge::Left,
            Self::RightHalf | Self::TopRight | Self::BottomRight => HorizontalEdge::Right,
        }
    }

    const fn vertical(self) -> Option<VerticalEdge> {
        match self {
            Self::LeftHalf | Self::RightHalf => None,
            Self::TopLeft | Self::TopRight => Some(VerticalEdge::Top),
            Self::BottomLeft | Self::BottomRight => Some(VerticalEdge::Bottom),
        }
    }

    const fn from_edges(horizontal: HorizontalEdge, vertical: Option<VerticalEdge>) -> Self {
        match (horizontal, vertical) {
            (HorizontalEdge::Left, None) => Self::LeftHalf,
            (HorizontalEdge::Right, None) => Self::RightHalf,
            (HorizontalEdge::Left, Some(VerticalEdge::Top)) => Self::TopLeft,
            (HorizontalEdge::Right, Some(VerticalEdge::Top)) => Self::TopRight,
            (HorizontalEdge::Left, Some(VerticalEdge::Bottom)) => Self::BottomLeft,
            (HorizontalEdge::Right, Some(VerticalEdge::Bottom)) => Self::BottomRight,
        }
    }
}

/// Which rule produced a snap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapKind {
    MonitorEdge { horizontal: Option<HorizontalEdge>, vertical: Option<VerticalEdge> },
    Zone { zone: SnapZone },
    Window { horizontal: bool, vertical: bool },
}

// ============================================================================
// Request / Result
// ============================================================================

/// Everything the engine looks at for one snap decision.
#[derive(Clone, Copy, Debug)]
pub struct SnapRequest<'a> {
    /// Proposed geometry before snapping.
    pub geometry: Rect,
    /// Visible windows on the same monitor, excluding the one being snapped.
    pub others: &'a [Rect],
    /// Bounds of the monitor the window is on.
    pub monitor_bounds: Rect,
    pub is_resizing: bool,
    /// Smallest size the window may take.
    pub min_size: Size,
    /// Snap applied on the previous frame of the same interaction.
    pub previous: Option<SnapKind>,
}

/// Adjusted geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapResult {
    pub position: Point,
    pub size: Size,
    pub snapped: bool,
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    const fn unsnapped(rect: Rect) -> Self {
        Self { position: rect.origin(), size: rect.size(), snapped: false, kind: None }
    }

    const fn snapped(rect: Rect, kind: SnapKind) -> Self {
        Self { position: rect.origin(), size: rect.size(), snapped: true, kind: Some(kind) }
    }

    /// The adjusted geometry as a rectangle.
    #[must_use]
    pub const fn frame(&self) -> Rect { Rect::from_parts(self.position, self.size) }
}

// ============================================================================
// SnapEngine
// ============================================================================

/// Computes snapped geometry with fixed, deterministic thresholds.
#[derive(Clone, Debug)]
pub struct SnapEngine {
    enabled: bool,
    threshold: f64,
    release_distance: f64,
    zone_insets: Insets,
    window_snapping: bool,
    min_size: Size,
}

impl SnapEngine {
    /// Creates an engine from configuration.
    ///
    /// A release distance smaller than the threshold is raised to it so that
    /// holding a snap is never harder than acquiring one.
    #[must_use]
    pub fn new(config: &SnapConfig, min_size: Size) -> Self {
        let threshold = config.threshold.max(0.0);
        Self {
            enabled: config.enabled,
            threshold,
            release_distance: config.release_distance.max(threshold),
            zone_insets: config.zone_insets,
            window_snapping: config.window_snapping,
            min_size,
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 { self.threshold }

    #[must_use]
    pub const fn release_distance(&self) -> f64 { self.release_distance }

    /// Usable bounds used by zone snapping.
    #[must_use]
    pub fn usable_bounds(&self, monitor_bounds: &Rect) -> Rect {
        monitor_bounds.inset(&self.zone_insets)
    }

    /// Snaps a proposed geometry with no previous snap and the default minimum size.
    #[must_use]
    pub fn calculate_snap(
        &self,
        geometry: Rect,
        others: &[Rect],
        monitor_bounds: Rect,
        is_resizing: bool,
    ) -> SnapResult {
        self.snap(&SnapRequest {
            geometry,
            others,
            monitor_bounds,
            is_resizing,
            min_size: self.min_size,
            previous: None,
        })
    }

    /// Snaps a proposed geometry.
    #[must_use]
    pub fn snap(&self, request: &SnapRequest<'_>) -> SnapResult {
        let monitor = request.monitor_bounds;
        let rect = request.geometry.sanitized(request.min_size, monitor.origin());

        if !self.enabled || !monitor.is_valid() {
            return SnapResult::unsnapped(rect);
        }

        // A snap from the previous frame is held with the release distance.
        if !request.is_resizing {
            match request.previous {
                Some(SnapKind::Zone { zone }) if self.zone_holds(&rect, &monitor, zone) => {
                    return self.zone_result(zone, &monitor, request.min_size);
                }
                Some(SnapKind::Window { .. }) if self.window_snapping => {
                    if let Some(result) =
                        snap_to_windows(&rect, request.others, self.release_distance)
                    {
                        return result;
                    }
                }
                _ => {}
            }
        }

        let zone = if request.is_resizing { None } else { self.zone_for(&rect, &monitor) };

        if zone.is_none()
            && let Some(result) = self.snap_to_monitor_edges(&rect, &monitor, request)
        {
            return result;
        }

        if let Some(zone) = zone {
            return self.zone_result(zone, &monitor, request.min_size);
        }

        if !request.is_resizing
            && self.window_snapping
            && let Some(result) = snap_to_windows(&rect, request.others, self.threshold)
        {
            return result;
        }

        SnapResult::unsnapped(rect)
    }

    // ------------------------------------------------------------------------
    // Rule 1: monitor edges
    // ------------------------------------------------------------------------

    fn edge_threshold(&self, previous: Option<SnapKind>, edge: EdgeRef) -> f64 {
        let held = match (previous, edge) {
            (Some(SnapKind::MonitorEdge { horizontal, .. }), EdgeRef::Horizontal(e)) => {
                horizontal == Some(e)
            }
            (Some(SnapKind::MonitorEdge { vertical, .. }), EdgeRef::Vertical(e)) => {
                vertical == Some(e)
            }
            _ => false,
        };
        if held { self.release_distance } else { self.threshold }
    }

    fn snap_to_monitor_edges(
        &self,
        rect: &Rect,
        monitor: &Rect,
        request: &SnapRequest<'_>,
    ) -> Option<SnapResult> {
        let previous = request.previous;
        let t_left = self.edge_threshold(previous, EdgeRef::Horizontal(HorizontalEdge::Left));
        let t_right = self.edge_threshold(previous, EdgeRef::Horizontal(HorizontalEdge::Right));
        let t_top = self.edge_threshold(previous, EdgeRef::Vertical(VerticalEdge::Top));
        let t_bottom = self.edge_threshold(previous, EdgeRef::Vertical(VerticalEdge::Bottom));

        let d_left = rect.x - monitor.x;
        let d_right = monitor.right() - rect.right();
        let d_top = rect.y - monitor.y;
        let d_bottom = monitor.bottom() - rect.bottom();

        let mut out = *rect;
        let mut horizontal = None;
        let mut vertical = None;

        if request.is_resizing {
            let min = request.min_size;
            if d_left.abs() <= t_left && rect.right() - monitor.x >= min.width {
                out.width = rect.right() - monitor.x;
                out.x = monitor.x;
                horizontal = Some(HorizontalEdge::Left);
            }
            if d_right.abs() <= t_right && monitor.right() - out.x >= min.width {
                out.width = monitor.right() - out.x;
                horizontal = horizontal.or(Some(HorizontalEdge::Right));
            }
            if d_top.abs() <= t_top && rect.bottom() - monitor.y >= min.height {
                out.height = rect.bottom() - monitor.y;
                out.y = monitor.y;
                vertical = Some(VerticalEdge::Top);
            }
            if d_bottom.abs() <= t_bottom && monitor.bottom() - out.y >= min.height {
                out.height = monitor.bottom() - out.y;
                vertical = vertical.or(Some(VerticalEdge::Bottom));
            }
        } else {
            horizontal = nearest_edge(d_left, t_left, d_right, t_right)
                .map(|left| if left { HorizontalEdge::Left } else { HorizontalEdge::Right });
            match horizontal {
                Some(HorizontalEdge::Left) => out.x = monitor.x,
                Some(HorizontalEdge::Right) => out.x = monitor.right() - rect.width,
                None => {}
            }

            vertical = nearest_edge(d_top, t_top, d_bottom, t_bottom)
                .map(|top| if top { VerticalEdge::Top } else { VerticalEdge::Bottom });
            match vertical {
                Some(VerticalEdge::Top) => out.y = monitor.y,
                Some(VerticalEdge::Bottom) => out.y = monitor.bottom() - rect.height,
                None => {}
            }
        }

        if horizontal.is_none() && vertical.is_none() {
            return None;
        }
        Some(SnapResult::snapped(out, SnapKind::MonitorEdge { horizontal, vertical }))
    }

    // ------------------------------------------------------------------------
    // Rule 2: zones
    // ------------------------------------------------------------------------

    /// Zone activated by pushing the window past the monitor edges.
    fn zone_for(&self, rect: &Rect, monitor: &Rect) -> Option<SnapZone> {
        zone_with_depth(rect, monitor, self.threshold)
    }

    fn zone_holds(&self, rect: &Rect, monitor: &Rect, zone: SnapZone) -> bool {
        let depth = (2.0f64.mul_add(self.threshold, -self.release_distance)).max(0.0);
        let overshoot = Overshoot::of(rect, monitor);
        let horizontal = match zone.horizontal() {
            HorizontalEdge::Left => overshoot.left > depth,
            HorizontalEdge::Right => overshoot.right > depth,
        };
        let vertical = match zone.vertical() {
            None => true,
            Some(VerticalEdge::Top) => overshoot.top > depth,
            Some(VerticalEdge::Bottom) => overshoot.bottom > depth,
        };
        horizontal && vertical
    }

    fn zone_result(&self, zone: SnapZone, monitor: &Rect, min_size: Size) -> SnapResult {
        let frame = zone.frame(&self.usable_bounds(monitor));
        let frame = frame.with_size(frame.size().at_least(min_size));
        SnapResult::snapped(frame, SnapKind::Zone { zone })
    }
}

#[derive(Clone, Copy)]
enum EdgeRef {
    Horizontal(HorizontalEdge),
    Vertical(VerticalEdge),
}

/// How far each window edge is pushed past the matching monitor edge.
struct Overshoot {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Overshoot {
    fn of(rect: &Rect, monitor: &Rect) -> Self {
        Self {
            left: monitor.x - rect.x,
            right: rect.right() - monitor.right(),
            top: monitor.y - rect.y,
            bottom: rect.bottom() - monitor.bottom(),
        }
    }
}

fn zone_with_depth(rect: &Rect, monitor: &Rect, depth: f64) -> Option<SnapZone> {
    let overshoot = Overshoot::of(rect, monitor);
    let horizontal = if overshoot.left > depth {
        HorizontalEdge::Left
    } else if overshoot.right > depth {
        HorizontalEdge::Right
    } else {
        return None;
    };
    let vertical = if overshoot.top > depth {
        Some(VerticalEdge::Top)
    } else if overshoot.bottom > depth {
        Some(VerticalEdge::Bottom)
    } else {
        None
    };
    Some(SnapZone::from_edges(horizontal, vertical))
}

/// Picks the closer of two opposite edges within their thresholds.
///
/// Returns `Some(true)` for the first edge; ties go to the first edge.
fn nearest_edge(first: f64, first_threshold: f64, second: f64, second_threshold: f64) -> Option<bool> {
    let first_ok = first.abs() <= first_threshold;
    let second_ok = second.abs() <= second_threshold;
    match (first_ok, second_ok) {
        (true, true) => Some(first.abs() <= second.abs()),
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

// ----------------------------------------------------------------------------
// Rule 3: other windows
// ----------------------------------------------------------------------------

/// Smallest offset within `threshold`, earliest candidate winning ties.
fn closest_offset(candidates: impl IntoIterator<Item = f64>, threshold: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for offset in candidates {
        if offset.abs() > threshold {
            continue;
        }
        if best.is_none_or(|current| offset.abs() < current.abs()) {
            best = Some(offset);
        }
    }
    best
}

fn snap_to_windows(rect: &Rect, others: &[Rect], threshold: f64) -> Option<SnapResult> {
    let valid = || others.iter().filter(|other| other.is_valid());

    let dx = closest_offset(
        valid()
            .filter(|o| rect.y < o.bottom() && o.y < rect.bottom())
            .flat_map(|o| {
                [o.right() - rect.x, o.x - rect.right(), o.x - rect.x, o.right() - rect.right()]
            }),
        threshold,
    );
    let dy = closest_offset(
        valid()
            .filter(|o| rect.x < o.right() && o.x < rect.right())
            .flat_map(|o| {
                [o.bottom() - rect.y, o.y - rect.bottom(), o.y - rect.y, o.bottom() - rect.bottom()]
            }),
        threshold,
    );

    if dx.is_none() && dy.is_none() {
        return None;
    }
    let out = rect.offset(dx.unwrap_or(0.0), dy.unwrap_or(0.0));
    Some(SnapResult::snapped(out, SnapKind::Window { horizontal: dx.is_some(), vertical: dy.is_some() }))
}
