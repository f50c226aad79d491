//! Top-down shooter
//!
//! The ship fires automatically; enemies fall from the top. Every ten kills
//! raise the level, which multiplies points and shortens the spawn interval.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::GameId;
use crate::consts::ticks_from_ms;
use crate::sim::{
    Aabb, EntityPool, GameEvent, GamePhase, Hud, Minigame, PhaseMachine, Ramp, ScoreSlot, Scheduler, Spawner, TaskId,
    TickInput, circles_overlap, uniform,
};

/// Best-score key
pub const SCORE_SLOT: ScoreSlot = ScoreSlot::scalar("shootingGameHighScore");

/// Gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterTuning {
    pub field: Vec2,
    pub player_size: Vec2,
    /// Start position: horizontally centred, this far above the bottom edge
    pub player_start_from_bottom: f32,
    pub player_speed: f32,
    /// Extra upward offset while dragging (fraction of height)
    pub drag_lift_ratio: f32,
    pub fire_interval_ms: u64,
    pub bullet_size: Vec2,
    pub bullet_speed: f32,
    pub enemy_size: (f32, f32),
    pub enemy_speed: (f32, f32),
    /// Spawn interval in ms by level
    pub spawn_interval_ms: Ramp,
    /// Above this level each spawn may bring a second enemy
    pub extra_spawn_level: u32,
    pub extra_spawn_chance: f64,
    pub points_per_kill: u64,
    pub kills_per_level: u32,
    pub lives: u32,
    /// Forgiveness subtracted from the contact distance
    pub contact_margin: f32,
    pub hit_flash_ms: u64,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(1200.0, 800.0),
            player_size: Vec2::new(50.0, 50.0),
            player_start_from_bottom: 100.0,
            player_speed: 5.0,
            drag_lift_ratio: 0.08,
            fire_interval_ms: 200,
            bullet_size: Vec2::new(5.0, 15.0),
            bullet_speed: 7.0,
            enemy_size: (40.0, 60.0),
            enemy_speed: (1.0, 4.0),
            spawn_interval_ms: Ramp::new(1000.0, -50.0, 1).with_limit(500.0),
            extra_spawn_level: 2,
            extra_spawn_chance: 0.3,
            points_per_kill: 10,
            kills_per_level: 10,
            lives: 3,
            contact_margin: 5.0,
            hit_flash_ms: 500,
        }
    }
}

/// Player ship; `center` is the ship's middle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub center: Vec2,
    pub size: Vec2,
    /// Flashing after a hit
    pub hit: bool,
}

impl Ship {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    HitOver,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    tuning: ShooterTuning,
    rng: Pcg32,
    phases: PhaseMachine,
    timers: Scheduler<Timer>,
    player: Ship,
    /// Pointer-to-ship offset captured when a drag begins
    drag_offset: Option<Vec2>,
    bullets: EntityPool<()>,
    enemies: EntityPool<()>,
    fire: Spawner,
    spawner: Spawner,
    hit_flash: Option<TaskId>,
    score: u64,
    lives: u32,
    level: u32,
    kills: u32,
}

impl Shooter {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, ShooterTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: ShooterTuning) -> Self {
        Self::fresh(tuning, Pcg32::seed_from_u64(seed))
    }

    fn fresh(tuning: ShooterTuning, rng: Pcg32) -> Self {
        let player = Ship {
            center: Vec2::new(
                tuning.field.x / 2.0,
                tuning.field.y - tuning.player_start_from_bottom,
            ),
            size: tuning.player_size,
            hit: false,
        };
        let level = 1;
        Self {
            fire: Spawner::interval_delayed(ticks_from_ms(tuning.fire_interval_ms)),
            spawner: Spawner::interval_delayed(Self::spawn_ticks(&tuning, level)),
            lives: tuning.lives,
            rng,
            phases: PhaseMachine::new(),
            timers: Scheduler::new(),
            player,
            drag_offset: None,
            bullets: EntityPool::new(),
            enemies: EntityPool::new(),
            hit_flash: None,
            score: 0,
            level,
            kills: 0,
            tuning,
        }
    }

    fn spawn_ticks(tuning: &ShooterTuning, level: u32) -> u64 {
        let ms = tuning.spawn_interval_ms.value_at(level as u64).max(1.0);
        ticks_from_ms(ms as u64)
    }

    pub fn player(&self) -> &Ship {
        &self.player
    }

    pub fn bullets(&self) -> &EntityPool<()> {
        &self.bullets
    }

    pub fn enemies(&self) -> &EntityPool<()> {
        &self.enemies
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn tuning(&self) -> &ShooterTuning {
        &self.tuning
    }

    /// Ticks between enemy spawns at the current level
    pub fn spawn_interval_ticks(&self) -> u64 {
        Self::spawn_ticks(&self.tuning, self.level)
    }

    /// Place an enemy directly (scripted scenarios)
    pub fn spawn_enemy_at(&mut self, pos: Vec2, size: f32, speed: f32) -> u32 {
        self.enemies.spawn(pos, Vec2::new(0.0, speed), Vec2::splat(size), ())
    }

    fn spawn_random_enemy(&mut self) {
        let size = uniform(&mut self.rng, self.tuning.enemy_size);
        let speed = uniform(&mut self.rng, self.tuning.enemy_speed);
        let x = self.rng.random::<f32>() * (self.tuning.field.x - size);
        self.spawn_enemy_at(Vec2::new(x, -size), size, speed);
    }

    /// Fire one bullet from the ship's nose
    pub fn shoot(&mut self, events: &mut Vec<GameEvent>) {
        let nose = Vec2::new(self.player.center.x, self.player.center.y - self.player.size.y / 2.0);
        let size = self.tuning.bullet_size;
        self.bullets.spawn(
            nose - Vec2::new(size.x / 2.0, size.y),
            Vec2::new(0.0, -self.tuning.bullet_speed),
            size,
            (),
        );
        events.push(GameEvent::Shoot);
    }

    fn clamp_player(&mut self) {
        let half = self.player.size / 2.0;
        self.player.center = self.player.center.clamp(half, self.tuning.field - half);
    }

    fn steer(&mut self, input: &TickInput) {
        let axis = input.held.axis();
        if axis != Vec2::ZERO {
            self.player.center += axis * self.tuning.player_speed;
        }

        match input.pointer {
            Some(p) if p.dragging => {
                if p.began || self.drag_offset.is_none() {
                    let lift = self.tuning.field.y * self.tuning.drag_lift_ratio;
                    self.drag_offset = Some(self.player.center - p.pos + Vec2::new(0.0, lift));
                } else if let Some(offset) = self.drag_offset {
                    self.player.center = p.pos + offset;
                }
            }
            _ => self.drag_offset = None,
        }
        self.clamp_player();
    }

    /// Every overlapping bullet/enemy pair is resolved once; each entity dies at most once
    fn resolve_bullets(&mut self, events: &mut Vec<GameEvent>) {
        let mut dead_bullets: Vec<u32> = Vec::new();
        let mut dead_enemies: Vec<u32> = Vec::new();

        for enemy in self.enemies.iter() {
            let hit = self
                .bullets
                .iter()
                .find(|b| !dead_bullets.contains(&b.id) && b.bounds().overlaps(&enemy.bounds()));
            if let Some(bullet) = hit {
                dead_bullets.push(bullet.id);
                dead_enemies.push(enemy.id);
            }
        }

        for _ in &dead_enemies {
            self.score += self.tuning.points_per_kill * self.level as u64;
            self.kills += 1;
            events.push(GameEvent::EnemyHit);
            if self.kills % self.tuning.kills_per_level.max(1) == 0 {
                self.level += 1;
                let every = self.spawn_interval_ticks();
                self.spawner.set_interval(every);
                log::debug!("shooter level {} (spawn every {every} ticks)", self.level);
                events.push(GameEvent::LevelUp(self.level));
            }
        }

        self.bullets.remove_ids(&dead_bullets);
        self.enemies.remove_ids(&dead_enemies);
    }

    /// At most one hit per tick
    fn resolve_contact(&mut self, events: &mut Vec<GameEvent>) {
        let ship = self.player;
        let radius = ship.size.x / 2.0;
        let margin = self.tuning.contact_margin;
        let hit = self
            .enemies
            .iter()
            .find(|e| circles_overlap(ship.center, radius, e.center(), e.size.x / 2.0, margin))
            .map(|e| e.id);
        let Some(id) = hit else {
            return;
        };

        self.enemies.remove_ids(&[id]);
        self.lives = self.lives.saturating_sub(1);
        events.push(GameEvent::PlayerHit { lives: self.lives });

        self.player.hit = true;
        if let Some(prev) = self.hit_flash.take() {
            self.timers.cancel(prev);
        }
        let flash = ticks_from_ms(self.tuning.hit_flash_ms);
        self.hit_flash = Some(self.timers.schedule_in(flash, Timer::HitOver));

        if self.lives == 0 && self.phases.finish() {
            events.push(GameEvent::GameOver { score: self.score });
        }
    }

    fn step_running(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        self.steer(input);
        self.bullets.step_all();
        self.enemies.step_all();

        self.resolve_bullets(events);
        self.resolve_contact(events);
        if !self.phases.is(GamePhase::Running) {
            return;
        }

        let field = Aabb::new(Vec2::ZERO, self.tuning.field);
        self.bullets.cull(&field);
        self.enemies.cull(&field);

        if self.spawner.poll(&mut self.rng) {
            self.spawn_random_enemy();
            if self.level > self.tuning.extra_spawn_level && self.rng.random_bool(self.tuning.extra_spawn_chance) {
                self.spawn_random_enemy();
            }
        }
        if self.fire.poll(&mut self.rng) {
            self.shoot(events);
        }
    }
}

impl Minigame for Shooter {
    fn id(&self) -> GameId {
        GameId::Shooter
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
        for timer in self.timers.advance() {
            match timer {
                Timer::HitOver => {
                    self.player.hit = false;
                    self.hit_flash = None;
                }
            }
        }

        match self.phases.phase() {
            GamePhase::Idle => {
                let any_input = input.primary
                    || input.click.is_some()
                    || input.held.axis() != Vec2::ZERO
                    || input.pointer.is_some_and(|p| p.began);
                if any_input && self.phases.start() {
                    events.push(GameEvent::Start);
                }
            }
            GamePhase::Running => self.step_running(input, events),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        let rng = self.rng.clone();
        *self = Self::fresh(self.tuning.clone(), rng);
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            phase: self.phases.phase(),
            extras: vec![
                ("Level", self.level.to_string()),
                ("Lives", self.lives.to_string()),
            ],
        }
    }
}
