//! Update timers and frame-rate estimation
use std::time::{Duration, Instant};

use crate::config::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Update at a fixed interval.
    Interval,
    /// Update whenever the loop is free, bounded by a short quantum.
    Idle,
}

impl TimerMode {
    pub fn toggled(self) -> Self {
        match self {
            TimerMode::Interval => TimerMode::Idle,
            TimerMode::Idle => TimerMode::Interval,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Interval => "interval timer",
            TimerMode::Idle => "idle timer",
        }
    }
}

/// Decides when the next scene update is due
#[derive(Debug, Clone)]
pub struct FrameClock {
    mode: TimerMode,
    interval: Duration,
    idle: Duration,
    next_tick: Instant,
}

impl FrameClock {
    pub fn new(timing: &TimingConfig, now: Instant) -> Self {
        let interval = Duration::from_millis(timing.interval_ms.max(1));
        Self {
            mode: TimerMode::Interval,
            interval,
            idle: Duration::from_millis(timing.idle_ms.max(1)),
            next_tick: now + interval,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn period(&self) -> Duration {
        match self.mode {
            TimerMode::Interval => self.interval,
            TimerMode::Idle => self.idle,
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        self.mode = self.mode.toggled();
        self.next_tick = now + self.period();
    }

    /// Whether an update is due at `now`; schedules the next one if so.
    ///
    /// A loop that fell behind does not replay the missed ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick += self.period();
        if self.next_tick <= now {
            self.next_tick = now + self.period();
        }
        true
    }

    pub fn time_until_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }
}

/// Frames per second, estimated over windows of at least one second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: Option<u32>,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: None,
        }
    }

    /// Count a finished frame. Returns the new estimate when a window closes.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = (self.frames as f64 / elapsed.as_secs_f64()) as u32;
        self.fps = Some(fps);
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConfig {
        TimingConfig {
            interval_ms: 40,
            idle_ms: 5,
        }
    }

    #[test]
    fn test_interval_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::new(&timing(), start);
        assert!(!clock.poll(start + Duration::from_millis(39)));
        assert!(clock.poll(start + Duration::from_millis(40)));
        assert!(!clock.poll(start + Duration::from_millis(41)));
        assert_eq!(clock.time_until_tick(start + Duration::from_millis(60)), Duration::from_millis(20));
    }

    #[test]
    fn test_no_catch_up_burst() {
        let start = Instant::now();
        let mut clock = FrameClock::new(&timing(), start);
        let late = start + Duration::from_millis(500);
        assert!(clock.poll(late));
        assert!(!clock.poll(late + Duration::from_millis(1)));
        assert!(clock.poll(late + Duration::from_millis(40)));
    }

    #[test]
    fn test_toggle_switches_period() {
        let start = Instant::now();
        let mut clock = FrameClock::new(&timing(), start);
        clock.toggle(start);
        assert_eq!(clock.mode(), TimerMode::Idle);
        assert_eq!(clock.period(), Duration::from_millis(5));
        assert!(clock.poll(start + Duration::from_millis(5)));
        clock.toggle(start);
        assert_eq!(clock.mode(), TimerMode::Interval);
        assert_eq!(TimerMode::Idle.label(), "idle timer");
    }

    #[test]
    fn test_fps_window() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..25 {
            assert_eq!(fps.frame(start + Duration::from_millis(i * 40)), None);
        }
        assert_eq!(fps.frame(start + Duration::from_millis(1000)), Some(25));
        assert_eq!(fps.fps(), Some(25));
        assert_eq!(fps.frame(start + Duration::from_millis(1040)), None);
    }
}
