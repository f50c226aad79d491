//! Flappy bird
//!
//! All sizes scale with the field. A start press runs a 3-2-1-GO countdown
//! through the scheduler before the session goes live.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::GameId;
use crate::consts::ticks_from_ms;
use crate::sim::{
    Aabb, EntityPool, GameEvent, GamePhase, Hud, Minigame, PhaseMachine, ScoreSlot, Scheduler, Spawner, TickInput,
};

/// Best-score key
pub const SCORE_SLOT: ScoreSlot = ScoreSlot::scalar("flappyBirdHighScore");

/// Gameplay constants, as fractions of the field where noted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlappyTuning {
    pub field: Vec2,
    /// Bird start position (fraction of field)
    pub bird_start_ratio: Vec2,
    /// Bird size (fraction of field)
    pub bird_size_ratio: Vec2,
    /// Per-tick gravity (fraction of height)
    pub gravity_ratio: f32,
    /// Flap velocity (fraction of height)
    pub flap_ratio: f32,
    /// Pipe width (fraction of width)
    pub pipe_width_ratio: f32,
    /// Opening between top and bottom pipe (fraction of height)
    pub pipe_gap_ratio: f32,
    /// Per-tick scroll (fraction of width)
    pub pipe_speed_ratio: f32,
    /// Minimum pipe length at either end (fraction of height)
    pub pipe_margin_ratio: f32,
    /// Ticks between pipe pairs; 0 disables spawning
    pub pipe_interval: u64,
    pub countdown_from: u8,
    pub countdown_step_ms: u64,
}

impl Default for FlappyTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(800.0, 600.0),
            bird_start_ratio: Vec2::new(0.2, 0.4),
            bird_size_ratio: Vec2::new(0.08, 0.05),
            gravity_ratio: 0.0007,
            flap_ratio: -0.015,
            pipe_width_ratio: 0.15,
            pipe_gap_ratio: 0.35,
            pipe_speed_ratio: 0.005,
            pipe_margin_ratio: 0.1,
            pipe_interval: 120,
            countdown_from: 3,
            countdown_step_ms: 1000,
        }
    }
}

impl FlappyTuning {
    pub fn gravity(&self) -> f32 {
        self.field.y * self.gravity_ratio
    }

    pub fn flap(&self) -> f32 {
        self.field.y * self.flap_ratio
    }

    pub fn pipe_width(&self) -> f32 {
        self.field.x * self.pipe_width_ratio
    }

    pub fn pipe_gap(&self) -> f32 {
        self.field.y * self.pipe_gap_ratio
    }

    pub fn pipe_speed(&self) -> f32 {
        self.field.x * self.pipe_speed_ratio
    }
}

/// One top/bottom pipe pair; the entity spans the full field height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipePair {
    pub top_height: f32,
    pub gap: f32,
    pub passed: bool,
}

/// Pieces of the pre-start countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Count(u8),
    Go,
    Begin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    pub pos: Vec2,
    pub size: Vec2,
    pub vy: f32,
}

impl Bird {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

#[derive(Debug, Clone)]
pub struct Flappy {
    tuning: FlappyTuning,
    rng: Pcg32,
    phases: PhaseMachine,
    timers: Scheduler<Timer>,
    bird: Bird,
    pipes: EntityPool<PipePair>,
    spawner: Spawner,
    score: u64,
    /// Countdown value on screen (0 shows GO)
    countdown: Option<u8>,
    frames: u64,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, FlappyTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: FlappyTuning) -> Self {
        Self::fresh(tuning, Pcg32::seed_from_u64(seed))
    }

    fn fresh(tuning: FlappyTuning, rng: Pcg32) -> Self {
        let bird = Bird {
            pos: tuning.field * tuning.bird_start_ratio,
            size: tuning.field * tuning.bird_size_ratio,
            vy: 0.0,
        };
        Self {
            spawner: Spawner::interval(tuning.pipe_interval),
            rng,
            phases: PhaseMachine::new(),
            timers: Scheduler::new(),
            bird,
            pipes: EntityPool::new(),
            score: 0,
            countdown: None,
            frames: 0,
            tuning,
        }
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &EntityPool<PipePair> {
        &self.pipes
    }

    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn tuning(&self) -> &FlappyTuning {
        &self.tuning
    }

    /// Top and bottom rectangles of a pair at `x`
    pub fn pipe_rects(&self, x: f32, pair: &PipePair) -> (Aabb, Aabb) {
        let w = self.tuning.pipe_width();
        let bottom_y = pair.top_height + pair.gap;
        (
            Aabb::new(Vec2::new(x, 0.0), Vec2::new(w, pair.top_height)),
            Aabb::new(Vec2::new(x, bottom_y), Vec2::new(w, self.tuning.field.y - bottom_y)),
        )
    }

    /// Add a pipe pair at `x` with the given top length
    pub fn spawn_pair(&mut self, x: f32, top_height: f32) -> u32 {
        let t = &self.tuning;
        self.pipes.spawn(
            Vec2::new(x, 0.0),
            Vec2::new(-t.pipe_speed(), 0.0),
            Vec2::new(t.pipe_width(), t.field.y),
            PipePair {
                top_height,
                gap: t.pipe_gap(),
                passed: false,
            },
        )
    }

    fn spawn_random_pair(&mut self) {
        let h = self.tuning.field.y;
        let margin = h * self.tuning.pipe_margin_ratio;
        let span = h - self.tuning.pipe_gap() - 2.0 * margin;
        let top = self.rng.random::<f32>() * span + margin;
        self.spawn_pair(self.tuning.field.x, top);
    }

    fn start_countdown(&mut self, events: &mut Vec<GameEvent>) {
        let from = self.tuning.countdown_from;
        let step = ticks_from_ms(self.tuning.countdown_step_ms);
        self.countdown = Some(from);
        events.push(GameEvent::Countdown(from));

        let mut steps: Vec<(u64, Timer)> = (1..from).rev().map(|n| (step, Timer::Count(n))).collect();
        steps.push((step, Timer::Go));
        steps.push((step, Timer::Begin));
        self.timers.schedule_sequence(steps);
    }

    fn on_timer(&mut self, timer: Timer, events: &mut Vec<GameEvent>) {
        match timer {
            Timer::Count(n) => {
                self.countdown = Some(n);
                events.push(GameEvent::Countdown(n));
            }
            Timer::Go => {
                self.countdown = Some(0);
                events.push(GameEvent::Go);
            }
            Timer::Begin => {
                self.countdown = None;
                if self.phases.start() {
                    events.push(GameEvent::Start);
                }
            }
        }
    }

    fn step_running(&mut self, flap: bool, events: &mut Vec<GameEvent>) {
        if flap {
            self.bird.vy = self.tuning.flap();
            events.push(GameEvent::Jump);
        }

        self.bird.vy += self.tuning.gravity();
        self.bird.pos.y += self.bird.vy;

        self.pipes.step_all();
        // Only the leading unpassed pair can score
        let bird_x = self.bird.pos.x;
        if let Some(pair) = self.pipes.iter_mut().find(|p| !p.kind.passed) {
            if pair.bounds().right() < bird_x {
                pair.kind.passed = true;
                self.score += 1;
                events.push(GameEvent::Score(1));
            }
        }

        if self.hit_something() {
            if self.phases.finish() {
                events.push(GameEvent::Collision);
                events.push(GameEvent::GameOver { score: self.score });
            }
            return;
        }

        let field = Aabb::new(Vec2::ZERO, self.tuning.field);
        self.pipes.cull(&field);

        if self.tuning.pipe_interval > 0 && self.spawner.poll(&mut self.rng) {
            self.spawn_random_pair();
        }
        self.frames += 1;
    }

    fn hit_something(&self) -> bool {
        let bird = self.bird.bounds();
        if bird.bottom() > self.tuning.field.y || bird.top() < 0.0 {
            return true;
        }
        self.pipes.iter().any(|p| {
            let (top, bottom) = self.pipe_rects(p.pos.x, &p.kind);
            bird.overlaps(&top) || bird.overlaps(&bottom)
        })
    }
}

impl Minigame for Flappy {
    fn id(&self) -> GameId {
        GameId::Flappy
    }

    fn phases(&self) -> &PhaseMachine {
        &self.phases
    }

    fn phases_mut(&mut self) -> &mut PhaseMachine {
        &mut self.phases
    }

    fn field(&self) -> Vec2 {
        self.tuning.field
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn score_slot(&self) -> Option<ScoreSlot> {
        Some(SCORE_SLOT)
    }

    fn update(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        let pressed = input.primary || input.click.is_some();
        // A countdown finishing this tick goes live on the next one
        let phase = self.phases.phase();

        for timer in self.timers.advance() {
            self.on_timer(timer, events);
        }

        match phase {
            GamePhase::Idle => {
                if pressed && self.countdown.is_none() && self.timers.is_empty() {
                    self.start_countdown(events);
                }
            }
            GamePhase::Running => self.step_running(pressed, events),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        let rng = self.rng.clone();
        *self = Self::fresh(self.tuning.clone(), rng);
    }

    fn hud(&self) -> Hud {
        let mut extras = Vec::new();
        match self.countdown {
            Some(0) => extras.push(("Countdown", "GO!".to_string())),
            Some(n) => extras.push(("Countdown", n.to_string())),
            None => {}
        }
        Hud {
            score: self.score,
            phase: self.phases.phase(),
            extras,
        }
    }
}
