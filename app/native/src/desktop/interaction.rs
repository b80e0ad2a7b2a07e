//! Pointer and keyboard interaction with windows.
//!
//! The controller turns title-bar drags and resize-handle drags into store
//! commits. It holds only transient session state: where the pointer started,
//! the frame at that moment, the last committed frame and the latest proposal
//! not yet committed.
//!
//! Proposals are computed from the cumulative pointer delta, never by adding
//! per-event deltas, so skipped frames cannot accumulate drift. Commits are
//! throttled to one per frame; pointer-up always flushes the pending proposal.
//! Escape or a lost pointer capture drops the pending proposal and leaves the
//! window at the last committed frame.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, ResizeEdge, resize_rect};
use super::monitor::MonitorRegistry;
use super::snap::SnapEngine;
use super::store::{CommitContext, WindowStateStore};
use super::throttle::FrameThrottle;
use super::types::WindowId;

// ============================================================================
// Types
// ============================================================================

/// What a pointer session changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "edge", rename_all = "camelCase")]
pub enum InteractionKind {
    Move,
    Resize(ResizeEdge),
}

/// Keyboard shortcuts the controller understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyInput {
    /// Cancel the active drag or resize.
    Escape,
    /// Maximize or restore the focused window.
    ToggleMaximize,
}

/// An in-progress drag or resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSession {
    pub window_id: WindowId,
    pub kind: InteractionKind,
    pub pointer_start: Point,
    pub frame_start: Rect,
    pub last_committed: Rect,
    pub pending: Option<Rect>,
}

/// Components a session commits through.
pub struct Targets<'a> {
    pub store: &'a mut WindowStateStore,
    pub monitors: &'a MonitorRegistry,
    pub snap: &'a SnapEngine,
}

// ============================================================================
// InteractionController
// ============================================================================

/// Drives at most one pointer session at a time.
#[derive(Debug, Default)]
pub struct InteractionController {
    session: Option<PointerSession>,
    throttle: FrameThrottle,
}

impl InteractionController {
    #[must_use]
    pub const fn new(throttle: FrameThrottle) -> Self { Self { session: None, throttle } }

    #[must_use]
    pub const fn session(&self) -> Option<&PointerSession> { self.session.as_ref() }

    #[must_use]
    pub const fn is_active(&self) -> bool { self.session.is_some() }

    /// Pointer-down on a title bar: focuses the window and starts a drag.
    ///
    /// Maximized windows are focused but not dragged. Returns whether a
    /// session started.
    pub fn begin_move(&mut self, window_id: WindowId, pointer: Point, targets: &mut Targets<'_>) -> bool {
        self.begin(window_id, InteractionKind::Move, pointer, targets)
    }

    /// Pointer-down on a resize handle. Fixed-size windows do not resize.
    pub fn begin_resize(
        &mut self,
        window_id: WindowId,
        edge: ResizeEdge,
        pointer: Point,
        targets: &mut Targets<'_>,
    ) -> bool {
        self.begin(window_id, InteractionKind::Resize(edge), pointer, targets)
    }

    fn begin(
        &mut self,
        window_id: WindowId,
        kind: InteractionKind,
        pointer: Point,
        targets: &mut Targets<'_>,
    ) -> bool {
        if self.session.is_some() {
            self.pointer_up(targets);
        }
        if !targets.store.focus(window_id) {
            return false;
        }
        let Some(window) = targets.store.window(window_id) else {
            return false;
        };
        if window.is_maximized() || !pointer.is_finite() {
            return false;
        }
        if matches!(kind, InteractionKind::Resize(_)) && !window.capabilities.resizable {
            return false;
        }

        self.session = Some(PointerSession {
            window_id,
            kind,
            pointer_start: pointer,
            frame_start: window.geometry,
            last_committed: window.geometry,
            pending: None,
        });
        self.throttle.reset();
        tracing::debug!(window_id = %window_id, kind = ?kind, "desktop: pointer session started");
        true
    }

    /// Pointer movement. Commits when the frame throttle allows, otherwise
    /// keeps the proposal pending. Returns whether a commit happened.
    pub fn pointer_move(&mut self, pointer: Point, now: Instant, targets: &mut Targets<'_>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !pointer.is_finite() {
            return false;
        }

        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        let proposed = match session.kind {
            InteractionKind::Move => session.frame_start.offset(dx, dy),
            InteractionKind::Resize(edge) => {
                let min = targets.store.window(session.window_id).map(|w| w.min_size).unwrap_or_default();
                resize_rect(session.frame_start, edge, dx, dy, min)
            }
        };
        session.pending = Some(proposed);

        if self.throttle.should_process(now) {
            return self.commit_pending(targets);
        }
        false
    }

    /// Animation-frame tick: commits a pending proposal once a frame has passed.
    pub fn animation_frame(&mut self, now: Instant, targets: &mut Targets<'_>) -> bool {
        let has_pending = self.session.is_some_and(|s| s.pending.is_some());
        if has_pending && self.throttle.should_process(now) {
            return self.commit_pending(targets);
        }
        false
    }

    /// Pointer release: flushes the pending proposal and ends the session.
    ///
    /// Returns the window's final frame.
    pub fn pointer_up(&mut self, targets: &mut Targets<'_>) -> Option<Rect> {
        self.commit_pending(targets);
        let session = self.session.take()?;
        self.throttle.reset();
        targets.store.window(session.window_id).map(|w| w.geometry)
    }

    /// Escape or lost capture: drops the pending proposal and leaves the
    /// window at the last committed frame.
    pub fn cancel(&mut self, targets: &mut Targets<'_>) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        self.throttle.reset();

        let current = targets.store.window(session.window_id).map(|w| w.geometry);
        if current.is_some_and(|geometry| geometry != session.last_committed) {
            targets.store.place_window(session.window_id, session.last_committed, targets.monitors);
        }
        tracing::debug!(window_id = %session.window_id, "desktop: pointer session cancelled");
        true
    }

    /// Handles a keyboard shortcut. Returns whether it had an effect.
    pub fn key_input(&mut self, key: KeyInput, targets: &mut Targets<'_>) -> bool {
        match key {
            KeyInput::Escape => self.cancel(targets),
            KeyInput::ToggleMaximize => {
                self.cancel(targets);
                targets
                    .store
                    .focused_window_id()
                    .is_some_and(|id| targets.store.toggle_maximize(id, targets.monitors))
            }
        }
    }

    /// Ends the session if it belongs to `window_id`, without committing.
    ///
    /// Used when the window closes mid-drag.
    pub fn end_for_window(&mut self, window_id: WindowId) -> bool {
        if self.session.is_some_and(|s| s.window_id == window_id) {
            self.session = None;
            self.throttle.reset();
            return true;
        }
        false
    }

    fn commit_pending(&mut self, targets: &mut Targets<'_>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(proposed) = session.pending.take() else {
            return false;
        };

        let ctx = CommitContext::snapped(targets.monitors, targets.snap);
        let committed = match session.kind {
            InteractionKind::Move => targets.store.move_window_to(session.window_id, proposed, &ctx),
            InteractionKind::Resize(_) => targets.store.resize_window_to(session.window_id, proposed, &ctx),
        };

        match targets.store.window(session.window_id) {
            Some(window) if committed => {
                session.last_committed = window.geometry;
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!(window_id = %session.window_id, "desktop: window closed during pointer session");
                self.session = None;
                false
            }
        }
    }
}
