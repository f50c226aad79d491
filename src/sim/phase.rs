//! Game-session phase machine
//!
//! ```text
//! idle ──start──▶ running ──terminal──▶ over ──reset──▶ idle
//!                  ▲    │                 └────restart──▶ running
//!            resume│    │pause
//!                  └ paused
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for a start intent
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Simulation frozen, render still runs
    Paused,
    /// Session ended
    Over,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::Over => "over",
        }
    }

    /// Whether `self -> to` is a legal transition
    pub fn can_transition(self, to: GamePhase) -> bool {
        matches!(
            (self, to),
            (GamePhase::Idle, GamePhase::Running)
                | (GamePhase::Running, GamePhase::Paused)
                | (GamePhase::Paused, GamePhase::Running)
                | (GamePhase::Running, GamePhase::Over)
                | (GamePhase::Over, GamePhase::Idle)
                | (GamePhase::Over, GamePhase::Running)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("invalid phase transition {from:?} -> {to:?}")]
    InvalidTransition { from: GamePhase, to: GamePhase },
}

/// Holds the current phase and enforces the transition table.
///
/// At most one transition is accepted per tick; later requests in the same
/// tick are rejected until [`PhaseMachine::begin_tick`] is called again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: GamePhase,
    #[serde(skip)]
    changed_this_tick: bool,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn is(&self, phase: GamePhase) -> bool {
        self.phase == phase
    }

    /// Open a new tick: allows one more transition
    pub fn begin_tick(&mut self) {
        self.changed_this_tick = false;
    }

    /// Whether a transition already happened during the current tick
    pub fn changed_this_tick(&self) -> bool {
        self.changed_this_tick
    }

    /// Attempt a transition
    pub fn transition(&mut self, to: GamePhase) -> Result<GamePhase, PhaseError> {
        let from = self.phase;
        if self.changed_this_tick || !from.can_transition(to) {
            return Err(PhaseError::InvalidTransition { from, to });
        }
        log::debug!("phase {} -> {}", from.as_str(), to.as_str());
        self.phase = to;
        self.changed_this_tick = true;
        Ok(from)
    }

    /// `idle -> running`
    pub fn start(&mut self) -> bool {
        self.try_to(GamePhase::Running, GamePhase::Idle)
    }

    /// `running <-> paused`
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => self.try_to(GamePhase::Paused, GamePhase::Running),
            GamePhase::Paused => self.try_to(GamePhase::Running, GamePhase::Paused),
            _ => false,
        }
    }

    /// `running -> over`. Only the first terminal condition in a tick wins.
    pub fn finish(&mut self) -> bool {
        self.try_to(GamePhase::Over, GamePhase::Running)
    }

    fn try_to(&mut self, to: GamePhase, expected: GamePhase) -> bool {
        if self.phase != expected {
            return false;
        }
        match self.transition(to) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("{e}");
                false
            }
        }
    }
}
