//! A running game wired to its collaborators
//!
//! The session owns the game, the key-value store and the cue sink. Games only
//! emit events; the session turns them into sounds and best-score writes.

use crate::audio::{CueSink, cue_for};
use crate::games::GameId;
use crate::highscores;
use crate::settings::{Difficulty, Settings};
use crate::sim::{GameEvent, GamePhase, Hud, Minigame, ScoreSlot, TickInput, tick};
use crate::storage::KeyValueStore;

pub struct Session {
    game: Box<dyn Minigame>,
    store: Box<dyn KeyValueStore>,
    cues: Box<dyn CueSink>,
    settings: Settings,
    slot: Option<ScoreSlot>,
    best: u64,
    /// Events of the latest tick
    events: Vec<GameEvent>,
}

impl Session {
    /// Wrap an already built game
    pub fn new(game: Box<dyn Minigame>, store: Box<dyn KeyValueStore>, mut cues: Box<dyn CueSink>) -> Self {
        let settings = Settings::load(store.as_ref());
        cues.set_volume(settings.effective_volume());
        let slot = game.score_slot();
        let best = slot.map_or(0, |slot| highscores::load_best(store.as_ref(), slot));
        Self {
            game,
            store,
            cues,
            settings,
            slot,
            best,
            events: Vec::new(),
        }
    }

    /// Build `id` with the stored settings applied
    pub fn launch(id: GameId, seed: u64, store: Box<dyn KeyValueStore>, cues: Box<dyn CueSink>) -> Self {
        let settings = Settings::load(store.as_ref());
        log::info!("Starting {} (seed {seed})", id.as_str());
        Self::new(id.create(seed, &settings), store, cues)
    }

    /// Advance one fixed tick and return the events it produced
    pub fn tick(&mut self, input: &TickInput) -> &[GameEvent] {
        self.events.clear();
        tick(self.game.as_mut(), input, &mut self.events);

        let mut finished = None;
        for event in &self.events {
            if let Some(cue) = cue_for(event) {
                self.cues.play(cue);
            }
            if let GameEvent::GameOver { score } = *event {
                finished = Some(score);
            }
        }
        if let Some(score) = finished {
            self.record(score);
        }

        if let Some(difficulty) = input.difficulty {
            self.remember_difficulty(difficulty);
        }

        // Memory keeps one best per difficulty
        let slot = self.game.score_slot();
        if slot != self.slot {
            self.slot = slot;
            self.best = slot.map_or(0, |slot| highscores::load_best(self.store.as_ref(), slot));
        }

        &self.events
    }

    fn record(&mut self, score: u64) {
        let Some(slot) = self.slot else {
            log::info!("{} over with {score}", self.game.id().as_str());
            return;
        };
        if highscores::record_best(self.store.as_mut(), slot, score) {
            self.best = score;
        }
    }

    fn remember_difficulty(&mut self, difficulty: Difficulty) {
        let entry = match self.game.id() {
            GameId::Memory => &mut self.settings.memory_difficulty,
            GameId::Tennis => &mut self.settings.tennis_difficulty,
            _ => return,
        };
        if *entry != difficulty && self.game.phase() == GamePhase::Idle {
            *entry = difficulty;
            self.settings.save(self.store.as_mut());
        }
    }

    pub fn game(&self) -> &dyn Minigame {
        self.game.as_ref()
    }

    pub fn id(&self) -> GameId {
        self.game.id()
    }

    /// Best score for the current slot (0 when none is kept)
    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    pub fn hud(&self) -> Hud {
        self.game.hud()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.cues.set_volume(settings.effective_volume());
        settings.save(self.store.as_mut());
        self.settings = settings;
    }
}
