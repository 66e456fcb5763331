//! Frame timing for the simulation loop
//!
//! Converts raw wall-clock deltas into the clamped, scaled `dt` handed to
//! `World::update`, and tracks a fixed-timestep accumulator for systems that
//! want to step at a constant rate.

use serde::{Deserialize, Serialize};

/// Configuration for frame timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Per-frame time tracking
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Configuration
    pub config: TimeConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Clamped delta before scaling
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether the clock is paused
    pub paused: bool,
    fixed_accumulator: f32,
}

impl FrameClock {
    /// Create a new clock with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance the clock by the raw delta since the previous frame and return
    /// the `dt` to feed to the simulation.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return 0.0;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
        self.delta_time
    }

    /// Drain the accumulator and return how many fixed steps are due this frame
    pub fn fixed_steps(&mut self) -> u32 {
        if self.config.fixed_timestep <= 0.0 {
            return 0;
        }
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        steps
    }

    /// Interpolation factor between the last two fixed steps
    pub fn fixed_interpolation(&self) -> f32 {
        if self.config.fixed_timestep <= 0.0 {
            return 0.0;
        }
        self.fixed_accumulator / self.config.fixed_timestep
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Set the time scale (0.0 = frozen, 1.0 = normal, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = FrameClock::default();
        let dt = clock.advance(0.016);

        assert_eq!(dt, 0.016);
        assert_eq!(clock.frame_count, 1);

        clock.pause();
        assert_eq!(clock.advance(0.016), 0.0);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn test_advance_clamps_large_delta() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(10.0), 0.25);
        assert_eq!(clock.advance(-1.0), 0.0);
    }

    #[test]
    fn test_time_scale() {
        let mut clock = FrameClock::default();
        clock.set_time_scale(2.0);
        assert_eq!(clock.advance(0.1), 0.2);
        clock.set_time_scale(-3.0);
        assert_eq!(clock.config.time_scale, 0.0);
    }

    #[test]
    fn test_fixed_steps() {
        let mut clock = FrameClock::new(TimeConfig {
            fixed_timestep: 0.1,
            ..Default::default()
        });
        clock.advance(0.25);
        assert_eq!(clock.fixed_steps(), 2);
        assert!((clock.fixed_interpolation() - 0.5).abs() < 1e-4);
        assert_eq!(clock.fixed_steps(), 0);
    }
}
