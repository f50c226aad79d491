//! Minicade - small browser arcade games on a shared game-loop core
//!
//! Core modules:
//! - `sim`: Deterministic simulation core (entities, collisions, phases, spawning)
//! - `games`: The five games built on the core
//! - `session`: A running game wired to best-score storage and sound cues
//! - `platform`: Loop driver and input adapter
//! - `storage` / `highscores` / `settings`: Durable key-value state
//! - `audio`: Fire-and-forget sound cues

pub mod audio;
pub mod games;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod storage;

pub use games::GameId;
pub use session::Session;
pub use settings::{Difficulty, Settings};

/// Game loop timing constants
pub mod consts {
    /// Fixed simulation rate. Every per-tick constant in the games assumes it.
    pub const TICK_RATE_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta (seconds) fed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Convert a wall-clock duration in milliseconds into whole ticks (at least one)
    #[inline]
    pub const fn ticks_from_ms(ms: u64) -> u64 {
        let ticks = ms.saturating_mul(TICK_RATE_HZ as u64).saturating_add(500) / 1000;
        if ticks == 0 { 1 } else { ticks }
    }
}

#[cfg(test)]
mod tests {
    use super::consts::*;

    #[test]
    fn test_ticks_from_ms() {
        assert_eq!(ticks_from_ms(1000), 60);
        assert_eq!(ticks_from_ms(200), 12);
        assert_eq!(ticks_from_ms(500), 30);
        assert_eq!(ticks_from_ms(0), 1);
        // Absurd tuning values saturate instead of overflowing
        assert_eq!(ticks_from_ms(u64::MAX), u64::MAX / 1000);
    }
}
