//! Platform helpers for the host
//!
//! The simulation only ever advances in whole fixed ticks. These helpers turn
//! what the host actually has (uneven frame times, raw accelerometer
//! readings) into what the simulation wants.

use std::time::Duration;

use glam::Vec3;

use crate::consts::STANDARD_GRAVITY;

/// Maximum number of ticks run for a single frame, to avoid a spiral of death
pub const MAX_TICKS_PER_FRAME: u32 = 5;

/// Fixed-rate tick pacing with an accumulator
#[derive(Debug, Clone)]
pub struct TickClock {
    tick: Duration,
    accumulator: Duration,
    paused: bool,
    ticks_run: u64,
}

impl TickClock {
    pub fn new(tick_ms: u32) -> Self {
        Self {
            tick: Duration::from_millis(tick_ms.max(1) as u64),
            accumulator: Duration::ZERO,
            paused: false,
            ticks_run: 0,
        }
    }

    /// Feed one frame's elapsed time, returns the number of ticks to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        if self.paused {
            return 0;
        }

        // A long stall (backgrounded app, debugger) must not queue up a burst
        let cap = self.tick * MAX_TICKS_PER_FRAME;
        self.accumulator = (self.accumulator + frame_time).min(cap);

        let mut ticks = 0;
        while self.accumulator >= self.tick && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        self.ticks_run += ticks as u64;
        ticks
    }

    /// How far into the next tick we are, in [0, 1), for interpolated drawing
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.tick.as_secs_f32()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.accumulator = Duration::ZERO;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }
}

/// Throw power from an accelerometer reading taken at release.
///
/// The phone's excess over one standard gravity, scaled by `throw_factor`.
/// A phone at rest throws with no power.
pub fn throw_power(accel: Vec3, throw_factor: f32) -> f32 {
    (throw_factor * (accel.length() / STANDARD_GRAVITY - 1.0)).abs()
}
