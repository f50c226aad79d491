//! Spawn policies and difficulty ramps
//!
//! Two equivalent ways of gating spawns appear across the games: a Bernoulli
//! draw every tick, or a fixed tick interval. Both expose their mean interval so
//! a difficulty can be expressed either way.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform draw in `[lo, hi)`; a degenerate range yields `lo`
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// How often a spawner fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Fire when a uniform draw falls below `probability`
    PerTick { probability: f64 },
    /// Fire every `every_ticks` ticks, starting on the first poll
    Interval { every_ticks: u64 },
}

impl SpawnPolicy {
    /// Expected ticks between spawns
    pub fn mean_interval(&self) -> f64 {
        match *self {
            SpawnPolicy::PerTick { probability } if probability > 0.0 => 1.0 / probability,
            SpawnPolicy::PerTick { .. } => f64::INFINITY,
            SpawnPolicy::Interval { every_ticks } => every_ticks.max(1) as f64,
        }
    }
}

/// Stateful spawn gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub policy: SpawnPolicy,
    /// Polls so far, offset by `origin`
    counter: u64,
    origin: u64,
}

impl Spawner {
    pub fn new(policy: SpawnPolicy) -> Self {
        Self {
            policy,
            counter: 0,
            origin: 0,
        }
    }

    pub fn per_tick(probability: f64) -> Self {
        Self::new(SpawnPolicy::PerTick { probability })
    }

    pub fn interval(every_ticks: u64) -> Self {
        Self::new(SpawnPolicy::Interval { every_ticks })
    }

    /// Interval spawner whose first fire comes after one full interval
    pub fn interval_delayed(every_ticks: u64) -> Self {
        Self {
            policy: SpawnPolicy::Interval { every_ticks },
            counter: 1,
            origin: 1,
        }
    }

    /// Change the interval without resetting the phase of the counter
    pub fn set_interval(&mut self, every_ticks: u64) {
        self.policy = SpawnPolicy::Interval { every_ticks };
    }

    /// Advance one tick; true when an entity should spawn
    pub fn poll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self.policy {
            SpawnPolicy::PerTick { probability } => {
                probability > 0.0 && rng.random::<f64>() < probability
            }
            SpawnPolicy::Interval { every_ticks } => {
                let fire = self.counter % every_ticks.max(1) == 0;
                self.counter += 1;
                fire
            }
        }
    }

    pub fn reset(&mut self) {
        self.counter = self.origin;
    }

    pub fn mean_interval(&self) -> f64 {
        self.policy.mean_interval()
    }
}

/// Monotonic step function: `base + step * floor(progress / every)`, optionally capped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub base: f32,
    pub step: f32,
    pub every: u64,
    #[serde(default)]
    pub limit: Option<f32>,
}

impl Ramp {
    pub const fn new(base: f32, step: f32, every: u64) -> Self {
        Self {
            base,
            step,
            every,
            limit: None,
        }
    }

    pub const fn with_limit(mut self, limit: f32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value at `progress` (score, kills, ticks...)
    pub fn value_at(&self, progress: u64) -> f32 {
        let steps = progress / self.every.max(1);
        let v = self.base + self.step * steps as f32;
        match self.limit {
            Some(limit) if self.step >= 0.0 => v.min(limit),
            Some(limit) => v.max(limit),
            None => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_interval_fires_on_first_poll() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut s = Spawner::interval(120);
        let fired: Vec<usize> = (0..300).filter(|_| s.poll(&mut rng)).collect();
        assert_eq!(fired, vec![0, 120, 240]);

        // Reset restarts the phase
        s.reset();
        assert!(s.poll(&mut rng));
    }

    #[test]
    fn test_interval_ticks() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut s = Spawner::interval(4);
        let fired: Vec<u32> = (0..10u32).filter(|_| s.poll(&mut rng)).collect();
        assert_eq!(fired, vec![0, 4, 8]);

        let mut s = Spawner::interval_delayed(4);
        let fired: Vec<u32> = (1..=10u32).filter(|_| s.poll(&mut rng)).collect();
        assert_eq!(fired, vec![4, 8]);
    }

    #[test]
    fn test_per_tick_rate_matches_probability() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut s = Spawner::per_tick(0.02);
        let n = 100_000;
        let hits = (0..n).filter(|_| s.poll(&mut rng)).count();
        let rate = hits as f64 / n as f64;
        assert!((rate - 0.02).abs() < 0.003, "rate {rate}");
        assert!((s.mean_interval() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_probability_never_fires() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut s = Spawner::per_tick(0.0);
        assert!((0..1000).all(|_| !s.poll(&mut rng)));
        assert!(s.mean_interval().is_infinite());
    }

    #[test]
    fn test_ramp_runner_speed() {
        let speed = Ramp::new(6.0, 0.5, 50);
        assert_eq!(speed.value_at(0), 6.0);
        assert_eq!(speed.value_at(49), 6.0);
        assert_eq!(speed.value_at(50), 6.5);
        assert_eq!(speed.value_at(120), 7.0);
    }

    #[test]
    fn test_ramp_limit() {
        // Shooter spawn interval: 1000ms - 50ms per level, floored at 500ms
        let interval = Ramp::new(1000.0, -50.0, 1).with_limit(500.0);
        assert_eq!(interval.value_at(1), 950.0);
        assert_eq!(interval.value_at(10), 500.0);
        assert_eq!(interval.value_at(30), 500.0);
    }

    proptest! {
        #[test]
        fn prop_ramp_monotonic(base in 0.0f32..100.0, step in 0.0f32..5.0, every in 1u64..100, a in 0u64..10_000, b in 0u64..10_000) {
            let ramp = Ramp::new(base, step, every);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ramp.value_at(lo) <= ramp.value_at(hi));
        }
    }
}
