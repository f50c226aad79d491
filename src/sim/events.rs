//! Events emitted by update steps
//!
//! The platform layer turns these into sound cues and the session uses
//! `GameOver` to record best scores. Games never call collaborators directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// idle -> running
    Start,
    Jump,
    DoubleJump,
    Land,
    /// Points awarded (the amount added)
    Score(u64),
    SpeedUp,
    /// Lethal contact (runner obstacle, flappy pipe or boundary)
    Collision,
    /// running -> over with the final score
    GameOver { score: u64 },
    /// Pre-start countdown value (3, 2, 1)
    Countdown(u8),
    Go,
    /// Card turned face up
    Flip,
    Match,
    Mismatch,
    /// Every pair found
    Complete,
    Shoot,
    EnemyHit,
    PlayerHit { lives: u32 },
    LevelUp(u32),
    PaddleHit,
    WallHit,
    /// A rally ended; `player` is true when the player won it
    Point { player: bool },
    Paused,
    Resumed,
    Reset,
}
