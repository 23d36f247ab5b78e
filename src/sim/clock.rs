//! Fixed-step scheduling for the animation driver
//!
//! The host feeds wall-clock frame deltas in; the ticker hands back how many
//! driver ticks are due and for which run. Cancelling drops the pending time
//! and the token, so nothing scheduled before a reset can fire after it.

use super::state::RunToken;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, MAX_TICK_MS, TICK_MS};

#[derive(Debug, Clone)]
pub struct Ticker {
    /// Seconds per tick
    step: f32,
    accumulator: f32,
    armed: Option<RunToken>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_MS)
    }
}

impl Ticker {
    /// Cadence is clamped to 20-50 ms
    pub fn new(tick_ms: u32) -> Self {
        let tick_ms = tick_ms.clamp(TICK_MS, MAX_TICK_MS);
        Self {
            step: tick_ms as f32 / 1000.0,
            accumulator: 0.0,
            armed: None,
        }
    }

    pub fn step_secs(&self) -> f32 {
        self.step
    }

    /// Start delivering ticks for `token`
    pub fn arm(&mut self, token: RunToken) {
        self.armed = Some(token);
        self.accumulator = 0.0;
    }

    /// Forget the armed run and any time already accumulated for it
    pub fn cancel(&mut self) {
        self.armed = None;
        self.accumulator = 0.0;
    }

    pub fn armed(&self) -> Option<RunToken> {
        self.armed
    }

    /// Feed a frame delta; returns the run and number of ticks now due
    pub fn advance(&mut self, dt: f32) -> Option<(RunToken, u32)> {
        let token = self.armed?;
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut due = 0;
        while self.accumulator >= self.step && due < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            due += 1;
        }
        Some((token, due))
    }
}
