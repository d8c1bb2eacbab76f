use std::thread;
use std::time::{Duration, Instant};

use crate::traits::frame_scheduler::FrameScheduler;

const DEFAULT_REFRESH_HZ: f64 = 60.0;
const MIN_REFRESH_HZ: f64 = 1.0;
const MAX_REFRESH_HZ: f64 = 1000.0;

/// Wall-clock scheduler for hosts without their own frame callback.
///
/// Ticks are aligned to a fixed display cadence (60 Hz by default, clamped
/// to 1–1000 Hz). A tick that is already late returns immediately instead
/// of sleeping.
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    frame_interval: Duration,
    next_deadline: Duration,
}

impl RealtimeScheduler {
    pub fn new(refresh_hz: f64) -> Self {
        let hz = if refresh_hz > 0.0 && refresh_hz.is_finite() {
            refresh_hz.clamp(MIN_REFRESH_HZ, MAX_REFRESH_HZ)
        } else {
            DEFAULT_REFRESH_HZ
        };
        let frame_interval = Duration::from_secs_f64(1.0 / hz);
        Self {
            origin: Instant::now(),
            frame_interval,
            next_deadline: frame_interval,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_HZ)
    }
}

impl FrameScheduler for RealtimeScheduler {
    fn next_frame(&mut self) -> Duration {
        let now = self.now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
            self.next_deadline += self.frame_interval;
        } else {
            // Missed one or more frames; realign.
            self.next_deadline = now + self.frame_interval;
        }
        self.now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
