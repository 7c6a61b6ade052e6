use std::time::Instant;

pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Minimal frame clock - tracks delta time between ticks.
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Delta since the last tick in seconds, advancing the clock.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-rate accounting for the stats overlay: counts frames and produces a
/// smoothed FPS reading once per update interval.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    frames: u32,
    accumulated: f32,
    fps: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frames: 0,
            accumulated: 0.0,
            fps: 0.0,
        }
    }

    /// Record one frame. Returns the refreshed FPS when an interval
    /// completes, None otherwise.
    pub fn update(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames as f32 / self.accumulated;
            self.frames = 0;
            self.accumulated = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    /// Most recent smoothed reading; 0.0 until the first interval completes.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009 && delta <= 0.050);
    }

    #[test]
    fn stats_hold_until_interval() {
        let mut stats = FrameStats::new();

        assert!(stats.update(0.4).is_none());
        assert_eq!(stats.fps(), 0.0);
        assert!(stats.update(0.4).is_none());
    }

    #[test]
    fn stats_average_over_interval() {
        let mut stats = FrameStats::new();

        // 60 frames at ~16.7ms each cross the 1s interval.
        let mut reading = None;
        for _ in 0..60 {
            if let Some(fps) = stats.update(1.0 / 60.0) {
                reading = Some(fps);
            }
        }

        let fps = reading.expect("Interval should have completed");
        assert!((fps - 60.0).abs() < 1.0, "Expected ~60 FPS, got {}", fps);
    }

    #[test]
    fn stats_reset_after_report() {
        let mut stats = FrameStats::new();

        stats.update(1.5);
        assert!(stats.update(0.1).is_none(), "Counter restarts after a report");
        assert!(stats.fps() > 0.0, "Last reading is retained");
    }
}
