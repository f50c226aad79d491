//! Fixed-timestep frame driver

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Converts animation-frame timestamps into a number of simulation ticks
#[derive(Debug, Clone)]
pub struct LoopDriver {
    accumulator: f32,
    last_ms: Option<f64>,
    visible: bool,
}

impl Default for LoopDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopDriver {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_ms: None,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Page visibility changed. Time spent hidden is never simulated.
    pub fn set_visible(&mut self, visible: bool) {
        if visible != self.visible {
            log::debug!("loop {}", if visible { "resumed" } else { "suspended" });
        }
        self.visible = visible;
        self.last_ms = None;
        self.accumulator = 0.0;
    }

    /// Ticks to run for a frame at `now_ms`
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.visible {
            return 0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            // First frame (or first after becoming visible)
            return 1;
        };

        let dt = (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut driver = LoopDriver::new();
        assert_eq!(driver.advance(5000.0), 1);
    }

    #[test]
    fn test_steady_60fps() {
        let mut driver = LoopDriver::new();
        let mut total = driver.advance(0.0);
        for frame in 1..=120 {
            total += driver.advance(frame as f64 * 1000.0 / 60.0);
        }
        assert!((120..=122).contains(&total), "{total}");
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut driver = LoopDriver::new();
        driver.advance(0.0);
        // Two seconds stalled: clamped to MAX_FRAME_DT (six ticks)
        let n = driver.advance(2000.0);
        assert!(n <= MAX_SUBSTEPS);
        assert!((5..=6).contains(&n), "{n}");
    }

    #[test]
    fn test_hidden_runs_nothing() {
        let mut driver = LoopDriver::new();
        driver.advance(0.0);
        driver.advance(16.0);
        driver.set_visible(false);
        assert_eq!(driver.advance(1000.0), 0);
        assert_eq!(driver.advance(60_000.0), 0);

        driver.set_visible(true);
        assert_eq!(driver.advance(120_000.0), 1);
        // Normal pacing after that
        let n = driver.advance(120_000.0 + 1000.0 / 30.0);
        assert!((1..=2).contains(&n));
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut driver = LoopDriver::new();
        driver.advance(1000.0);
        assert_eq!(driver.advance(900.0), 0);
    }
}
