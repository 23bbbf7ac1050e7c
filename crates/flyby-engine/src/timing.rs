//! Frame timing for the demo loop.
//!
//! The simulation always advances in fixed steps. In realtime mode the loop
//! sleeps off whatever is left of each frame's budget; otherwise it runs as
//! fast as it can and [`TickRate`] reports how fast that is.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-step frame clock.
#[derive(Debug)]
pub struct FrameTiming {
    /// Simulated seconds per frame
    fixed_dt: f32,
    /// Wall-clock budget per frame
    frame_budget: Duration,
    /// Sleep off the remaining budget each frame
    realtime: bool,
    /// Start of the current frame
    frame_start: Instant,
    /// Frames completed
    frame: u64,
    /// Simulated seconds elapsed
    sim_time: f64,
}

impl FrameTiming {
    /// Create a clock ticking at `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            fixed_dt: 1.0 / target_fps as f32,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            realtime: false,
            frame_start: Instant::now(),
            frame: 0,
            sim_time: 0.0,
        }
    }

    /// Create with realtime pacing on or off.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Seconds simulated per frame.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds elapsed.
    #[must_use]
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Marks the start of a frame and returns its timestep.
    pub fn begin_frame(&mut self) -> f32 {
        self.frame_start = Instant::now();
        self.fixed_dt
    }

    /// Finishes the frame, sleeping off the remaining budget in realtime mode.
    pub fn end_frame(&mut self) {
        self.frame += 1;
        self.sim_time += f64::from(self.fixed_dt);

        if !self.realtime {
            return;
        }
        let elapsed = self.frame_start.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }
}

/// Wall-clock tick rate over a sliding window.
#[derive(Debug)]
pub struct TickRate {
    /// Recent tick instants
    samples: VecDeque<Instant>,
    /// Window size
    max_samples: usize,
}

impl Default for TickRate {
    fn default() -> Self {
        Self::new(120)
    }
}

impl TickRate {
    /// Create a counter averaging over the last `max_samples` ticks.
    #[must_use]
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(2);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a tick.
    pub fn tick(&mut self) {
        self.samples.push_back(Instant::now());
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    /// Ticks per second, or `0.0` until two ticks are recorded.
    #[must_use]
    pub fn per_second(&self) -> f32 {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let span = last.duration_since(*first).as_secs_f32();
        if span > 0.0 {
            (self.samples.len() - 1) as f32 / span
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timing_creation() {
        let timing = FrameTiming::new(60);
        assert!((timing.fixed_dt() - 1.0 / 60.0).abs() < 0.001);
        assert_eq!(timing.frame(), 0);
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let timing = FrameTiming::new(0);
        assert_eq!(timing.fixed_dt(), 1.0);
    }

    #[test]
    fn test_sim_time_accumulates() {
        let mut timing = FrameTiming::new(50);
        for _ in 0..100 {
            let dt = timing.begin_frame();
            assert!((dt - 0.02).abs() < 1e-6);
            timing.end_frame();
        }
        assert_eq!(timing.frame(), 100);
        assert!((timing.sim_time() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_realtime_paces_frames() {
        let mut timing = FrameTiming::new(100).with_realtime(true);
        let start = Instant::now();
        for _ in 0..3 {
            timing.begin_frame();
            timing.end_frame();
        }
        assert!(start.elapsed() >= Duration::from_millis(29));
    }

    #[test]
    fn test_tick_rate() {
        let mut rate = TickRate::new(10);
        assert_eq!(rate.per_second(), 0.0);

        for _ in 0..5 {
            rate.tick();
            std::thread::sleep(Duration::from_millis(5));
        }

        let per_second = rate.per_second();
        assert!(per_second > 0.0);
        assert!(per_second < 1000.0);
    }
}
