//! Frame time accumulation.

use std::time::{Duration, Instant};

pub const DEFAULT_TARGET_FPS: u32 = 60;

/// How the per-frame delta is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStep {
    /// Advance by exactly `1 / fps` every frame, regardless of wall time.
    Fixed { fps: u32 },
    /// Advance by the measured wall-clock delta, clamped.
    Measured,
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Fixed {
            fps: DEFAULT_TARGET_FPS,
        }
    }
}

/// Produces per-frame deltas.
///
/// In measured mode the delta is clamped so that a debugger pause or a
/// minimized window does not make the mesh jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: TimeStep,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new(step: TimeStep) -> Self {
        Self {
            step,
            last: Instant::now(),
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn fixed(fps: u32) -> Self {
        Self::new(TimeStep::Fixed { fps })
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Resets the wall-clock baseline (after a resume or a long stall).
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns the delta for this frame in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.step {
            TimeStep::Fixed { fps } => 1.0 / fps.max(1) as f32,
            TimeStep::Measured => now
                .saturating_duration_since(self.last)
                .clamp(self.dt_min, self.dt_max)
                .as_secs_f32(),
        };
        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TimeStep::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_is_reciprocal_of_fps() {
        let mut clock = FrameClock::fixed(60);
        assert_eq!(clock.tick(), 1.0 / 60.0);
        assert_eq!(clock.tick(), 1.0 / 60.0);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        let mut clock = FrameClock::fixed(0);
        assert_eq!(clock.tick(), 1.0);
    }

    #[test]
    fn measured_step_is_clamped() {
        let mut clock = FrameClock::new(TimeStep::Measured);
        let dt = clock.tick();
        assert!(dt >= 0.0001 && dt <= 0.25, "dt out of clamp range: {dt}");
    }
}
