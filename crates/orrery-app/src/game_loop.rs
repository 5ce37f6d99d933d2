//! Fixed 60 Hz stepping for camera movement and simulation time.
//!
//! Each redraw converts the wall-clock time since the previous one into a
//! whole number of steps; the remainder carries over to the next frame.

use std::time::{Duration, Instant};

use tracing::warn;

pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longer frames (a debugger break, a dragged window) run in slow motion
/// instead of replaying every missed step.
pub const MAX_FRAME_TIME: f64 = 0.25;

#[derive(Debug)]
pub struct GameLoop {
    last_tick: Instant,
    carry: f64,
    frames: u64,
    steps: u64,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            carry: 0.0,
            frames: 0,
            steps: 0,
        }
    }

    /// Steps owed for the wall-clock time since the last tick.
    pub fn tick(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.steps_for(elapsed)
    }

    /// Steps owed for an explicit frame duration.
    pub fn steps_for(&mut self, elapsed: Duration) -> u32 {
        let mut frame_time = elapsed.as_secs_f64();
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame took {:.0} ms, simulating {:.0} ms",
                frame_time * 1e3,
                MAX_FRAME_TIME * 1e3
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.carry += frame_time;
        let whole = (self.carry / FIXED_DT).floor();
        self.carry -= whole * FIXED_DT;
        let steps = whole as u32;

        self.frames += 1;
        self.steps += u64::from(steps);
        steps
    }

    /// Forget time spent away, e.g. after the window regains focus.
    pub fn reset_clock(&mut self) {
        self.last_tick = Instant::now();
        self.carry = 0.0;
    }

    /// Frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Fixed steps handed out so far.
    pub fn step_count(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_one_step_per_sixtieth() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.steps_for(secs(FIXED_DT + 1e-9)), 1);
        assert_eq!(game_loop.steps_for(secs(0.99 * FIXED_DT)), 0);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.steps_for(secs(0.6 * FIXED_DT)), 0);
        assert_eq!(game_loop.steps_for(secs(0.6 * FIXED_DT)), 1);
        // 0.2 carried: 0.7 more falls short, another 0.2 completes a step.
        assert_eq!(game_loop.steps_for(secs(0.7 * FIXED_DT)), 0);
        assert_eq!(game_loop.steps_for(secs(0.2 * FIXED_DT)), 1);
    }

    #[test]
    fn test_slow_frame_catches_up() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.steps_for(secs(3.5 * FIXED_DT)), 3);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut game_loop = GameLoop::new();
        let steps = game_loop.steps_for(secs(5.0));
        let cap = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(steps > 0 && steps <= cap, "{steps} steps");
    }

    #[test]
    fn test_reset_drops_carry() {
        let mut game_loop = GameLoop::new();
        game_loop.steps_for(secs(0.5 * FIXED_DT));
        game_loop.reset_clock();
        assert_eq!(game_loop.steps_for(secs(0.6 * FIXED_DT)), 0);
    }

    #[test]
    fn test_counters() {
        let mut game_loop = GameLoop::default();
        for _ in 0..10 {
            game_loop.steps_for(secs(2.0 * FIXED_DT + 1e-9));
        }
        assert_eq!(game_loop.frame_count(), 10);
        assert_eq!(game_loop.step_count(), 20);
    }
}
