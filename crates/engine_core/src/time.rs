//! Time management for the simulation loop.

use std::time::Duration;

/// Manages frame timing and the fixed-step accumulator that drives physics ticks.
#[derive(Debug)]
pub struct Time {
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for physics (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
    /// Upper bound on fixed steps consumed per frame.
    max_steps_per_frame: u32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
            max_steps_per_frame: 8,
        }
    }

    /// Advance by the duration of the frame just presented.
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Drain the accumulator into a number of fixed steps, capped at
    /// `max_steps_per_frame`. Excess time past the cap is dropped.
    pub fn consume_fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while steps < self.max_steps_per_frame && self.should_fixed_update() {
            steps += 1;
        }
        if steps == self.max_steps_per_frame && self.accumulator >= self.fixed_timestep {
            log::debug!(
                "Dropping {:.3}s of simulation time after {} steps",
                self.accumulator.as_secs_f32(),
                steps
            );
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }

    /// Set how many fixed steps a single frame may run.
    pub fn set_max_steps_per_frame(&mut self, steps: u32) {
        self.max_steps_per_frame = steps.max(1);
    }
}
