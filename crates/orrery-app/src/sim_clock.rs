//! Simulation time fed to the orbit evaluation.
//!
//! Wall-clock seconds scaled by a runtime multiplier. Changing the multiplier
//! or pausing never makes bodies jump, since time is integrated per frame.

pub const MIN_MULTIPLIER: f64 = 1.0 / 64.0;
pub const MAX_MULTIPLIER: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    elapsed: f64,
    multiplier: f64,
    paused: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            multiplier: 1.0,
            paused: false,
        }
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, real_dt: f64) {
        if !self.paused && real_dt > 0.0 {
            self.elapsed += real_dt * self.multiplier;
        }
    }

    /// Seconds to evaluate the scene at. Kept `f64` so long sessions stay smooth.
    pub fn seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn speed_up(&mut self) -> f64 {
        self.multiplier = (self.multiplier * 2.0).min(MAX_MULTIPLIER);
        self.multiplier
    }

    pub fn slow_down(&mut self) -> f64 {
        self.multiplier = (self.multiplier / 2.0).max(MIN_MULTIPLIER);
        self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_at_real_rate_by_default() {
        let mut clock = SimulationClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.seconds(), 0.75);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut clock = SimulationClock::new();
        clock.advance(1.0);
        assert!(clock.toggle_pause());
        clock.advance(5.0);
        assert_eq!(clock.seconds(), 1.0);
        assert!(!clock.toggle_pause());
        clock.advance(1.0);
        assert_eq!(clock.seconds(), 2.0);
    }

    #[test]
    fn test_multiplier_scales_future_time_only() {
        let mut clock = SimulationClock::new();
        clock.advance(1.0);
        assert_eq!(clock.speed_up(), 2.0);
        clock.advance(1.0);
        assert_eq!(clock.seconds(), 3.0);
    }

    #[test]
    fn test_multiplier_is_clamped() {
        let mut clock = SimulationClock::new();
        for _ in 0..20 {
            clock.speed_up();
        }
        assert_eq!(clock.multiplier(), MAX_MULTIPLIER);
        for _ in 0..40 {
            clock.slow_down();
        }
        assert_eq!(clock.multiplier(), MIN_MULTIPLIER);
    }
}
