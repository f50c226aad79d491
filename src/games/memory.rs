//! Memory / matching cards
//!
//! Click two cards; a pair stays face up, anything else turns back after a
//! short delay. The session ends when every pair is found and the score is
//! computed from elapsed time and moves.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::GameId;
use crate::consts::{TICK_RATE_HZ, ticks_from_ms};
use crate::settings::{Difficulty, PerDifficulty};
use crate::sim::{Aabb, GameEvent, GamePhase, Hud, Minigame, PhaseMachine, ScoreSlot, Scheduler, TickInput};

/// Best scores are stored as a JSON object keyed by difficulty name
pub const SCORE_KEY: &str = "memoryGameBestScores";

/// Gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTuning {
    pub pairs: PerDifficulty<usize>,
    pub multiplier: PerDifficulty<f64>,
    pub columns: usize,
    pub card_size: f32,
    pub card_gap: f32,
    pub base_score: f64,
    /// Seconds before the time bonus runs out
    pub time_bonus_secs: u64,
    pub move_penalty: f64,
    /// Delay before a face-up pair is judged
    pub check_delay_ms: u64,
}

impl Default for MemoryTuning {
    fn default() -> Self {
        Self {
            pairs: PerDifficulty::new(4, 6, 8),
            multiplier: PerDifficulty::new(1.0, 1.5, 2.0),
            columns: 4,
            card_size: 100.0,
            card_gap: 15.0,
            base_score: 1000.0,
            time_bonus_secs: 300,
            move_penalty: 5.0,
            check_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Pair identifier; exactly two cards share it
    pub symbol: usize,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Judge(usize, usize),
}

#[derive(Debug, Clone)]
pub struct Memory {
    tuning: MemoryTuning,
    difficulty: Difficulty,
    rng: Pcg32,
    phases: PhaseMachine,
    timers: Scheduler<Timer>,
    cards: Vec<Card>,
    /// Face-up cards awaiting judgement
    flipped: Vec<usize>,
    matched_pairs: usize,
    moves: u32,
    elapsed_ticks: u64,
    final_score: u64,
}

impl Memory {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, MemoryTuning::default(), Difficulty::Medium)
    }

    pub fn with_tuning(seed: u64, tuning: MemoryTuning, difficulty: Difficulty) -> Self {
        Self::fresh(tuning, difficulty, Pcg32::seed_from_u64(seed))
    }

    fn fresh(tuning: MemoryTuning, difficulty: Difficulty, mut rng: Pcg32) -> Self {
        let pairs = *tuning.pairs.get(difficulty);
        let mut cards: Vec<Card> = (0..pairs)
            .flat_map(|symbol| {
                let card = Card {
                    symbol,
                    face_up: false,
                    matched: false,
                };
                [card, card]
            })
            .collect();
        cards.shuffle(&mut rng);
        log::debug!("dealt {} cards ({})", cards.len(), difficulty.as_str());

        Self {
            tuning,
            difficulty,
            rng,
            phases: PhaseMachine::new(),
            timers: Scheduler::new(),
            cards,
            flipped: Vec::with_capacity(2),
            matched_pairs: 0,
            moves: 0,
            elapsed_ticks: 0,
            final_score: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Whole seconds of running time
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ticks / TICK_RATE_HZ as u64
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    /// Board locked while two cards wait for judgement
    pub fn is_locked(&self) -> bool {
        self.flipped.len() >= 2
    }

    /// Screen rectangle of card `index`
    pub fn card_rect(&self, index: usize) -> Aabb {
        let t = &self.tuning;
        let col = (index % t.columns) as f32;
        let row = (index / t.columns) as f32;
        let pitch = t.card_size + t.card_gap;
        Aabb::new(Vec2::new(col * pitch, row * pitch), Vec2::splat(t.card_size))
    }

    /// Card under `pos`, if any (gaps hit nothing)
    pub fn card_at(&self, pos: Vec2) -> Option<usize> {
        (0..self.cards.len()).find(|&i| {
            let r = self.card_rect(i);
            pos.x >= r.left() && pos.x < r.right() && pos.y >= r.top() && pos.y < r.bottom()
        })
    }

    /// Score the session would get if it ended now
    pub fn projected_score(&self) -> u64 {
        let t = &self.tuning;
        let time_bonus = t.time_bonus_secs.saturating_sub(self.elapsed_secs()) as f64;
        let raw = t.base_score + time_bonus - t.move_penalty * self.moves as f64;
        (raw * t.multiplier.get(self.difficulty)).round().max(0.0) as u64
    }

    /// Turn a card face up. Ignored while locked or on cards already showing.
    pub fn flip(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        if self.is_locked() || self.phases.is(GamePhase::Over) {
            return;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return;
        };
        if card.face_up || card.matched {
            return;
        }

        // First flip starts the session
        if self.phases.is(GamePhase::Idle) && self.phases.start() {
            events.push(GameEvent::Start);
        }

        card.face_up = true;
        self.flipped.push(index);
        events.push(GameEvent::Flip);

        if let &[a, b] = self.flipped.as_slice() {
            self.moves += 1;
            let delay = ticks_from_ms(self.tuning.check_delay_ms);
            self.timers.schedule_in(delay, Timer::Judge(a, b));
        }
    }

    fn judge(&mut self, a: usize, b: usize, events: &mut Vec<GameEvent>) {
        self.flipped.clear();
        if self.cards[a].symbol == self.cards[b].symbol {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.matched_pairs += 1;
            events.push(GameEvent::Match);

            if self.matched_pairs == self.cards.len() / 2 {
                self.final_score = self.projected_score();
                events.push(GameEvent::Complete);
                if self.phases.finish() {
                    events.push(GameEvent::GameOver {
                        score: self.final_score,
                    });
                }
            }
        } else {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
            events.push(GameEvent::Mismatch);
        }
    }
}

impl Minigame for Memory {
    fn id(&self) -> GameId {
        GameId::Memory
    }

    fn phases(&self) -> &PhaseMachine {
        &self.phases
    }

    fn phases_mut(&mut self) -> &mut PhaseMachine {
        &mut self.phases
    }

    fn field(&self) -> Vec2 {
        let t = &self.tuning;
        let rows = self.cards.len().div_ceil(t.columns.max(1));
        let pitch = t.card_size + t.card_gap;
        Vec2::new(t.columns as f32 * pitch - t.card_gap, rows as f32 * pitch - t.card_gap)
    }

    /// Zero until every pair is found
    fn score(&self) -> u64 {
        self.final_score
    }

    fn score_slot(&self) -> Option<ScoreSlot> {
        Some(ScoreSlot::field(SCORE_KEY, self.difficulty.as_str()))
    }

    fn update(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        if self.phases.is(GamePhase::Running) {
            self.elapsed_ticks += 1;
        }

        for timer in self.timers.advance() {
            match timer {
                Timer::Judge(a, b) => self.judge(a, b, events),
            }
        }

        if let Some(pos) = input.click {
            if let Some(index) = self.card_at(pos) {
                self.flip(index, events);
            }
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        let rng = self.rng.clone();
        *self = Self::fresh(self.tuning.clone(), self.difficulty, rng);
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        log::info!("memory difficulty -> {}", difficulty.as_str());
        self.difficulty = difficulty;
        self.reset();
        true
    }

    fn hud(&self) -> Hud {
        let secs = self.elapsed_secs();
        Hud {
            score: self.final_score,
            phase: self.phases.phase(),
            extras: vec![
                ("Time", format!("{}:{:02}", secs / 60, secs % 60)),
                ("Moves", self.moves.to_string()),
                ("Pairs", format!("{}/{}", self.matched_pairs, self.cards.len() / 2)),
                ("Difficulty", self.difficulty.as_str().to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick;

    fn click_card(game: &mut Memory, index: usize, events: &mut Vec<GameEvent>) {
        let pos = game.card_rect(index).center();
        tick(
            game,
            &TickInput {
                click: Some(pos),
                ..Default::default()
            },
            events,
        );
    }

    fn wait(game: &mut Memory, ticks: usize, events: &mut Vec<GameEvent>) {
        for _ in 0..ticks {
            tick(game, &TickInput::default(), events);
        }
    }

    /// Index pairs sharing a symbol
    fn pairs_of(game: &Memory) -> Vec<(usize, usize)> {
        let n = game.cards().len() / 2;
        (0..n)
            .map(|s| {
                let mut idx = game.cards().iter().enumerate().filter(|(_, c)| c.symbol == s).map(|(i, _)| i);
                (idx.next().unwrap(), idx.next().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_deck_has_each_symbol_twice() {
        for (d, n) in [(Difficulty::Easy, 8), (Difficulty::Medium, 12), (Difficulty::Hard, 16)] {
            let game = Memory::with_tuning(9, MemoryTuning::default(), d);
            assert_eq!(game.cards().len(), n);
            for s in 0..n / 2 {
                assert_eq!(game.cards().iter().filter(|c| c.symbol == s).count(), 2);
            }
        }
    }

    #[test]
    fn test_large_deck_keeps_distinct_pairs() {
        let tuning = MemoryTuning {
            pairs: PerDifficulty::new(4, 6, 300),
            ..Default::default()
        };
        let game = Memory::with_tuning(9, tuning, Difficulty::Hard);
        assert_eq!(game.cards().len(), 600);
        assert_eq!(game.cards().iter().filter(|c| c.symbol == 299).count(), 2);
        assert_eq!(pairs_of(&game).len(), 300);
    }

    #[test]
    fn test_card_at_layout() {
        let game = Memory::new(1);
        assert_eq!(game.card_at(Vec2::new(0.0, 0.0)), Some(0));
        assert_eq!(game.card_at(Vec2::new(116.0, 10.0)), Some(1));
        assert_eq!(game.card_at(Vec2::new(50.0, 120.0)), Some(4));
        // In the gap between columns
        assert_eq!(game.card_at(Vec2::new(107.0, 50.0)), None);
        // Below the last row of a 12-card board
        assert_eq!(game.card_at(Vec2::new(50.0, 400.0)), None);
    }

    #[test]
    fn test_match_keeps_cards_up() {
        let mut game = Memory::new(2);
        let mut events = Vec::new();
        let (a, b) = pairs_of(&game)[0];

        click_card(&mut game, a, &mut events);
        assert_eq!(game.phase(), GamePhase::Running);
        click_card(&mut game, b, &mut events);
        assert!(game.is_locked());
        assert_eq!(game.moves(), 1);

        wait(&mut game, 60, &mut events);
        assert!(!game.is_locked());
        assert!(game.cards()[a].matched && game.cards()[b].matched);
        assert!(events.contains(&GameEvent::Match));
    }

    #[test]
    fn test_mismatch_turns_back_and_locks_board() {
        let mut game = Memory::new(2);
        let mut events = Vec::new();
        let pairs = pairs_of(&game);
        let (a, _) = pairs[0];
        let (c, d) = pairs[1];

        click_card(&mut game, a, &mut events);
        click_card(&mut game, c, &mut events);
        // Third card while locked is ignored
        click_card(&mut game, d, &mut events);
        assert!(!game.cards()[d].face_up);

        wait(&mut game, 60, &mut events);
        assert!(!game.cards()[a].face_up);
        assert!(!game.cards()[c].face_up);
        assert!(events.contains(&GameEvent::Mismatch));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_clicking_face_up_card_is_ignored() {
        let mut game = Memory::new(5);
        let mut events = Vec::new();
        let (a, _) = pairs_of(&game)[0];
        click_card(&mut game, a, &mut events);
        click_card(&mut game, a, &mut events);
        assert_eq!(game.moves(), 0);
        assert!(!game.is_locked());
    }

    #[test]
    fn test_complete_game_scores() {
        let mut game = Memory::new(11);
        let mut events = Vec::new();
        for (a, b) in pairs_of(&game) {
            click_card(&mut game, a, &mut events);
            click_card(&mut game, b, &mut events);
            wait(&mut game, 60, &mut events);
        }
        assert_eq!(game.phase(), GamePhase::Over);
        assert_eq!(game.moves(), 6);

        let secs = game.elapsed_secs();
        assert!(secs <= 7);
        let expected = ((1000.0 + (300 - secs) as f64 - 30.0) * 1.5).round() as u64;
        assert_eq!(game.score(), expected);
        assert!(events.contains(&GameEvent::GameOver { score: expected }));
        assert!(events.contains(&GameEvent::Complete));
    }

    #[test]
    fn test_difficulty_change_redeals() {
        let mut game = Memory::new(3);
        game.set_difficulty(Difficulty::Easy);
        assert_eq!(game.cards().len(), 8);
        assert_eq!(game.score_slot(), Some(ScoreSlot::field(SCORE_KEY, "easy")));
    }

    #[test]
    fn test_projected_score_never_negative() {
        let mut game = Memory::new(3);
        game.moves = 10_000;
        assert_eq!(game.projected_score(), 0);
    }
}
