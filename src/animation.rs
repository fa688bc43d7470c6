//! Animated actions, timers and cooldown gating.
//!
//! Nothing here spawns threads or blocks. An [`AnimatedAction`] is polled
//! once per tick with the tick's timestamp and steps its sprite-sheet column
//! when enough wall time has passed.

use std::time::{Duration, Instant};

use crate::entities::Entity;
use crate::session::Stage;

/// Runs when a destroy-on-finish animation completes.
pub type Completion = fn(&mut Entity, &mut Stage);

/// Configuration for one animated sequence on a sheet row.
#[derive(Clone, Copy, Debug, Default)]
pub struct Action {
    pub row: u32,
    pub looping: bool,
    pub destroy_on_finish: bool,
    pub rollback_row: Option<u32>,
    pub on_complete: Option<Completion>,
}

impl Action {
    pub fn new(row: u32) -> Self {
        Self {
            row,
            ..Self::default()
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn destroy_on_finish(mut self) -> Self {
        self.destroy_on_finish = true;
        self
    }

    /// After a non-looping pass, fall back to `row` and loop there.
    pub fn rollback_to(mut self, row: u32) -> Self {
        self.rollback_row = Some(row);
        self
    }

    pub fn on_complete(mut self, completion: Completion) -> Self {
        self.on_complete = Some(completion);
        self
    }
}

/// What happened when a non-looping pass wrapped.
#[derive(Clone, Copy, Debug)]
pub struct Finished {
    pub destroy: bool,
    pub on_complete: Option<Completion>,
}

/// Sprite-sheet row/column state machine. At most one sequence is active;
/// arming a new one overwrites the previous configuration.
#[derive(Clone, Debug, Default)]
pub struct AnimatedAction {
    action: Action,
    column: u32,
    step: u32,
    playing: bool,
    last_change: Option<Instant>,
}

impl AnimatedAction {
    pub fn arm(&mut self, action: Action, frame_count: u32, now: Instant) {
        debug_assert!(frame_count > 0, "animation armed on an empty sprite sheet");
        if frame_count == 0 {
            return;
        }
        self.action = action;
        self.column = 0;
        self.step = 1;
        self.playing = true;
        self.last_change = Some(now);
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn row(&self) -> u32 {
        self.action.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Steps the column once the per-frame period (`frame_time / frame_count`)
    /// has elapsed. Returns `Some` when a non-looping pass wraps.
    pub fn advance(&mut self, now: Instant, frame_time: Duration, frame_count: u32) -> Option<Finished> {
        if !self.playing || frame_count == 0 {
            return None;
        }
        let period = frame_time / frame_count;
        let since = self
            .last_change
            .map_or(Duration::MAX, |last| now.saturating_duration_since(last));
        if since <= period {
            return None;
        }

        let mut finished = None;
        if self.step >= frame_count {
            self.step = 0;
            if !self.action.looping {
                self.playing = false;
                finished = Some(Finished {
                    destroy: self.action.destroy_on_finish,
                    on_complete: self.action.on_complete,
                });
            }
        }
        self.last_change = Some(now);
        self.column = self.step;
        self.step += 1;

        if finished.is_some() {
            if let Some(row) = self.action.rollback_row {
                self.arm(Action::new(row).looping(), frame_count, now);
            }
        }
        finished
    }
}

// ── Timers ────────────────────────────────────────────────────────────────────

/// One-shot or repeating deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    period: Duration,
    anchor: Instant,
    continuous: bool,
}

impl Timer {
    pub fn new(period: Duration, continuous: bool, now: Instant) -> Self {
        Self {
            period,
            anchor: now,
            continuous,
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// True once the period has passed. Repeating timers re-anchor to `now`,
    /// not to the missed deadline.
    pub fn check(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.anchor) < self.period {
            return false;
        }
        if self.continuous {
            self.anchor = now;
        }
        true
    }
}

/// True when at least `ticks` frame intervals of wall time have passed since
/// `stamp`.
pub fn is_expired(stamp: Instant, ticks: u32, frame_interval: Duration, now: Instant) -> bool {
    now.saturating_duration_since(stamp) >= frame_interval * ticks
}
