use std::time::{Duration, Instant};

use arcane_core::profiling::profile_function;

/// Frame timing handed to the application every frame.
///
/// Layers receive the delta as their timestep; movement should scale with
/// [`FrameTime::delta_seconds`] to stay frame-rate independent.
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Time elapsed since the last frame
    pub delta: Duration,
    /// Total time elapsed since app start
    pub elapsed: Duration,
    /// Total number of frames produced
    pub frame_count: u64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Builds a frame time with a fixed delta, mostly useful for driving layers in tests.
    pub fn from_delta(delta: Duration) -> Self {
        Self {
            delta,
            elapsed: delta,
            frame_count: 1,
        }
    }

    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct TimeTracker {
    start_time: Instant,
    last_frame_time: Instant,
    frame_count: u64,
}

impl TimeTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        profile_function!();
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        let elapsed = now.duration_since(self.start_time);

        self.last_frame_time = now;
        self.frame_count += 1;

        FrameTime {
            delta,
            elapsed,
            frame_count: self.frame_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_frames() {
        let mut tracker = TimeTracker::new();
        let first = tracker.tick();
        let second = tracker.tick();
        assert_eq!(first.frame_count, 1);
        assert_eq!(second.frame_count, 2);
        assert!(second.elapsed >= first.elapsed);
    }

    #[test]
    fn test_from_delta() {
        let time = FrameTime::from_delta(Duration::from_millis(16));
        assert!((time.delta_seconds() - 0.016).abs() < 1e-6);
    }
}
