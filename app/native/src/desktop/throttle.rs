//! Per-frame throttling for drag and resize commits.
//!
//! Pointer events arrive far more often than the screen refreshes. Commits
//! within one frame interval of the last processed commit are skipped; the
//! caller keeps the latest proposal pending and flushes it on pointer-up, so
//! the final position is never dropped.
//!
//! The throttle takes `now` as an argument instead of reading the clock, which
//! keeps it deterministic under test.

use std::time::{Duration, Instant};

// ============================================================================
// FrameThrottle
// ============================================================================

/// Allows at most one commit per frame interval.
#[derive(Clone, Copy, Debug)]
pub struct FrameThrottle {
    /// Minimum time between processed commits.
    interval: Duration,
    /// When the last commit was processed.
    last_processed: Option<Instant>,
}

impl FrameThrottle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self { Self { interval, last_processed: None } }

    /// Throttle with an interval in milliseconds.
    #[must_use]
    pub const fn from_millis(interval_ms: u64) -> Self { Self::new(Duration::from_millis(interval_ms)) }

    #[must_use]
    pub const fn interval(&self) -> Duration { self.interval }

    /// Returns `true` if a commit at `now` should be processed, and records it.
    pub fn should_process(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_processed
            && now.saturating_duration_since(last) < self.interval
        {
            return false;
        }
        self.last_processed = Some(now);
        true
    }

    /// Records a commit processed outside `should_process`, e.g. a flush.
    pub fn mark(&mut self, now: Instant) { self.last_processed = Some(now); }

    /// Forgets the last commit, so the next one is always processed.
    pub fn reset(&mut self) { self.last_processed = None; }
}

impl Default for FrameThrottle {
    fn default() -> Self { Self::from_millis(crate::constants::timing::FRAME_INTERVAL_MS) }
}
