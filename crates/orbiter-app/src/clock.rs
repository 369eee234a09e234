//! Wall-clock delta source for the frame loop.

use std::time::Instant;

use tracing::warn;

/// Longest delta handed to the scene, in seconds.
///
/// A window that was hidden or dragged can report several seconds between
/// redraws; the animation then jumps by at most this much.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Measures the time between consecutive redraws.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    previous: Instant,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            previous: now,
            frames: 0,
        }
    }

    /// Restart measurement from now, discarding the time since the last delta.
    pub fn reset(&mut self) {
        self.previous = Instant::now();
    }

    /// Seconds since the previous call (or construction), clamped to
    /// [`MAX_FRAME_TIME`].
    pub fn delta(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    /// [`delta`](Self::delta) with an explicit current instant.
    pub fn delta_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        self.frames += 1;

        if elapsed > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                elapsed * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            return MAX_FRAME_TIME;
        }
        elapsed
    }

    /// Number of deltas handed out so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_delta_measures_elapsed_time() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.delta_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        let dt = clock.delta_at(start + Duration::from_millis(50));
        assert!((dt - 0.034).abs() < 1e-4);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.delta_at(start + Duration::from_secs(3)), MAX_FRAME_TIME);
    }

    #[test]
    fn test_backwards_instant_yields_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.delta_at(start - Duration::from_millis(500)), 0.0);
    }
}
