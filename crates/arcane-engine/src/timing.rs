//! Fixed-timestep accumulator.
//!
//! Turns variable frame deltas into a whole number of fixed simulation
//! ticks, with caps that keep a slow frame from snowballing.

/// Largest frame delta accepted, in seconds.
const MAX_FRAME_DT: f32 = 0.25;

/// Most ticks run for a single frame.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Accumulates frame time and hands out fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: f32,
    accumulator: f32,
    total_ticks: u64,
    dropped: f32,
}

impl FixedTimestep {
    /// Creates a timestep running `tick_rate` ticks per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            total_ticks: 0,
            dropped: 0.0,
        }
    }

    /// Seconds per tick.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Ticks handed out so far.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.total_ticks as f32 * self.fixed_dt
    }

    /// Seconds of frame time discarded by the caps.
    #[must_use]
    pub fn dropped(&self) -> f32 {
        self.dropped
    }

    /// Fraction of a tick left in the accumulator, for interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }

    /// Adds a frame delta and returns how many ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        let clamped = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.dropped += frame_dt.max(0.0) - clamped;
        self.accumulator += clamped;

        let mut count = 0;
        while self.accumulator >= self.fixed_dt && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // still behind after the cap; give up on the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.dropped += self.accumulator;
            self.accumulator = 0.0;
        }

        self.total_ticks += u64::from(count);
        count
    }
}
