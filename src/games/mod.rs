//! The five games built on the shared simulation core

pub mod flappy;
pub mod memory;
pub mod runner;
pub mod shooter;
pub mod tennis;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::Minigame;

pub use flappy::{Flappy, FlappyTuning};
pub use memory::{Memory, MemoryTuning};
pub use runner::{Runner, RunnerTuning};
pub use shooter::{Shooter, ShooterTuning};
pub use tennis::{Tennis, TennisTuning};

/// Which game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    #[default]
    Runner,
    Flappy,
    Memory,
    Shooter,
    Tennis,
}

impl GameId {
    pub const ALL: [GameId; 5] = [
        GameId::Runner,
        GameId::Flappy,
        GameId::Memory,
        GameId::Shooter,
        GameId::Tennis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Runner => "runner",
            GameId::Flappy => "flappy",
            GameId::Memory => "memory",
            GameId::Shooter => "shooter",
            GameId::Tennis => "tennis",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "runner" | "dino" => Some(GameId::Runner),
            "flappy" | "bird" => Some(GameId::Flappy),
            "memory" => Some(GameId::Memory),
            "shooter" | "shooting" => Some(GameId::Shooter),
            "tennis" | "pong" => Some(GameId::Tennis),
            _ => None,
        }
    }

    /// Build a fresh idle game with default tuning, applying the user's difficulty preferences
    pub fn create(self, seed: u64, settings: &Settings) -> Box<dyn Minigame> {
        match self {
            GameId::Runner => Box::new(Runner::new(seed)),
            GameId::Flappy => Box::new(Flappy::new(seed)),
            GameId::Memory => {
                let mut game = Memory::new(seed);
                game.set_difficulty(settings.memory_difficulty);
                Box::new(game)
            }
            GameId::Shooter => Box::new(Shooter::new(seed)),
            GameId::Tennis => {
                let mut game = Tennis::new(seed);
                game.set_difficulty(settings.tennis_difficulty);
                Box::new(game)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[test]
    fn test_game_names() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(GameId::from_str("dino"), Some(GameId::Runner));
        assert_eq!(GameId::from_str("chess"), None);
    }

    #[test]
    fn test_create_starts_idle() {
        let settings = Settings::default();
        for id in GameId::ALL {
            let game = id.create(7, &settings);
            assert_eq!(game.id(), id);
            assert_eq!(game.phase(), GamePhase::Idle);
            assert_eq!(game.score(), 0);
        }
    }
}
