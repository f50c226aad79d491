//! Side-scrolling jumper
//!
//! The player stands still on the x axis and jumps over obstacles scrolling in
//! from the right. One extra jump is allowed in the air.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::GameId;
use crate::sim::{
    Aabb, EntityPool, GameEvent, GamePhase, Hud, Minigame, Particle, PhaseMachine, Ramp, ScoreSlot, Spawner,
    TickInput, uniform,
};

/// Best-score key
pub const SCORE_SLOT: ScoreSlot = ScoreSlot::scalar("dinoHighScore");

/// Gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerTuning {
    pub field: Vec2,
    pub player_x: f32,
    pub player_size: Vec2,
    /// Player top when standing
    pub ground_y: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Second jump strength relative to the first
    pub double_jump_factor: f32,
    /// Scroll speed by score
    pub speed: Ramp,
    pub spawn_probability: f64,
    pub pass_points: u64,
    pub cactus_width: (f32, f32),
    pub cactus_height: (f32, f32),
    pub bird_size: Vec2,
    /// Birds fly up to this far above the ground line
    pub bird_altitude: f32,
    pub particle_burst: usize,
    pub particle_gravity: f32,
    pub particle_decay: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(800.0, 400.0),
            player_x: 50.0,
            player_size: Vec2::new(40.0, 50.0),
            ground_y: 300.0,
            gravity: 0.6,
            jump_velocity: -12.0,
            double_jump_factor: 0.85,
            speed: Ramp::new(6.0, 0.5, 50),
            spawn_probability: 0.02,
            pass_points: 10,
            cactus_width: (20.0, 40.0),
            cactus_height: (40.0, 70.0),
            bird_size: Vec2::new(35.0, 25.0),
            bird_altitude: 100.0,
            particle_burst: 5,
            particle_gravity: 0.2,
            particle_decay: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus,
    Bird,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Already scored
    pub passed: bool,
}

/// The jumping player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jumper {
    pub pos: Vec2,
    pub size: Vec2,
    pub vy: f32,
    pub airborne: bool,
    /// Double jump token, restored on landing
    pub double_jump: bool,
}

impl Jumper {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    tuning: RunnerTuning,
    rng: Pcg32,
    phases: PhaseMachine,
    player: Jumper,
    obstacles: EntityPool<Obstacle>,
    particles: Vec<Particle>,
    spawner: Spawner,
    score: u64,
    speed: f32,
    /// Running ticks this session
    frames: u64,
}

impl Runner {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, RunnerTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: RunnerTuning) -> Self {
        Self::fresh(tuning, Pcg32::seed_from_u64(seed))
    }

    fn fresh(tuning: RunnerTuning, rng: Pcg32) -> Self {
        let player = Jumper {
            pos: Vec2::new(tuning.player_x, tuning.ground_y),
            size: tuning.player_size,
            vy: 0.0,
            airborne: false,
            double_jump: true,
        };
        Self {
            spawner: Spawner::per_tick(tuning.spawn_probability),
            speed: tuning.speed.value_at(0),
            rng,
            phases: PhaseMachine::new(),
            player,
            obstacles: EntityPool::new(),
            particles: Vec::new(),
            score: 0,
            frames: 0,
            tuning,
        }
    }

    pub fn player(&self) -> &Jumper {
        &self.player
    }

    pub fn obstacles(&self) -> &EntityPool<Obstacle> {
        &self.obstacles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tuning(&self) -> &RunnerTuning {
        &self.tuning
    }

    /// Jump from the ground, or spend the double jump token in the air
    pub fn jump(&mut self, events: &mut Vec<GameEvent>) {
        let p = &mut self.player;
        if !p.airborne {
            p.vy = self.tuning.jump_velocity;
            p.airborne = true;
            p.double_jump = true;
            events.push(GameEvent::Jump);
        } else if p.double_jump {
            p.vy = self.tuning.jump_velocity * self.tuning.double_jump_factor;
            p.double_jump = false;
            events.push(GameEvent::DoubleJump);
            let at = self.player.bounds().center();
            self.burst(at);
        }
    }

    /// Place an obstacle directly (scripted scenarios)
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, pos: Vec2, size: Vec2) -> u32 {
        self.obstacles.spawn(pos, Vec2::new(-self.speed, 0.0), size, Obstacle { kind, passed: false })
    }

    fn spawn_random_obstacle(&mut self) {
        let t = &self.tuning;
        let (kind, pos, size) = if self.rng.random_bool(0.5) {
            let w = uniform(&mut self.rng, t.cactus_width);
            let h = uniform(&mut self.rng, t.cactus_height);
            // Stands on the same line as the player's feet
            let y = t.ground_y + t.player_size.y - h;
            (ObstacleKind::Cactus, Vec2::new(t.field.x, y), Vec2::new(w, h))
        } else {
            let y = t.ground_y - self.rng.random::<f32>() * t.bird_altitude;
            (ObstacleKind::Bird, Vec2::new(t.field.x, y), t.bird_size)
        };
        self.spawn_obstacle(kind, pos, size);
    }

    fn burst(&mut self, at: Vec2) {
        for _ in 0..self.tuning.particle_burst {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 4.0,
                -self.rng.random::<f32>() * 3.0,
            );
            self.particles.push(Particle { pos: at, vel, life: 1.0 });
        }
    }

    fn update_player(&mut self, events: &mut Vec<GameEvent>) {
        let ground = self.tuning.ground_y;
        let p = &mut self.player;
        if !p.airborne && p.pos.y >= ground {
            return;
        }
        p.vy += self.tuning.gravity;
        p.pos.y += p.vy;
        if p.pos.y >= ground {
            p.pos.y = ground;
            p.vy = 0.0;
            p.airborne = false;
            p.double_jump = true;
            events.push(GameEvent::Land);
            let feet = Vec2::new(p.pos.x + p.size.x / 2.0, p.pos.y + p.size.y);
            self.burst(feet);
        }
    }

    fn update_obstacles(&mut self, events: &mut Vec<GameEvent>) {
        for o in self.obstacles.iter_mut() {
            o.vel.x = -self.speed;
        }
        self.obstacles.step_all();

        let player_x = self.player.pos.x;
        for o in self.obstacles.iter_mut() {
            if !o.kind.passed && o.bounds().right() < player_x {
                o.kind.passed = true;
                self.score += self.tuning.pass_points;
                events.push(GameEvent::Score(self.tuning.pass_points));

                let speed = self.tuning.speed.value_at(self.score);
                if speed > self.speed {
                    log::debug!("runner speed {} -> {speed}", self.speed);
                    self.speed = speed;
                    events.push(GameEvent::SpeedUp);
                }
            }
        }
    }

    fn check_collision(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let player = self.player.bounds();
        if self.obstacles.iter().any(|o| o.bounds().overlaps(&player)) {
            if self.phases.finish() {
                events.push(GameEvent::Collision);
                events.push(GameEvent::GameOver { score: self.score });
            }
            return true;
        }
        false
    }

    fn update_particles(&mut self) {
        let (g, decay) = (self.tuning.particle_gravity, self.tuning.particle_decay);
        self.particles.retain_mut(|p| p.step(g, decay));
    }
}

impl Minigame for Runner {
    fn id(&self) -> GameId {
        GameId::Runner
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
        let jump = input.primary || input.click.is_some();
        match self.phases.phase() {
            GamePhase::Idle => {
                if jump && self.phases.start() {
                    events.push(GameEvent::Start);
                }
                return;
            }
            GamePhase::Running => {}
            _ => return,
        }

        if jump {
            self.jump(events);
        }

        self.frames += 1;
        self.update_player(events);
        self.update_obstacles(events);
        if self.check_collision(events) {
            return;
        }
        let field = Aabb::new(Vec2::ZERO, self.tuning.field);
        self.obstacles.cull(&field);
        self.update_particles();

        if self.spawner.poll(&mut self.rng) {
            self.spawn_random_obstacle();
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Self::fresh(self.tuning.clone(), rng);
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            phase: self.phases.phase(),
            extras: vec![("Speed", format!("{:.1}", self.speed))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick;

    fn running(tuning: RunnerTuning) -> Runner {
        let mut game = Runner::with_tuning(1, tuning);
        let mut events = Vec::new();
        tick(
            &mut game,
            &TickInput {
                primary: true,
                ..Default::default()
            },
            &mut events,
        );
        assert_eq!(game.phase(), GamePhase::Running);
        game
    }

    fn quiet() -> RunnerTuning {
        RunnerTuning {
            spawn_probability: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_jump_and_land() {
        let mut game = running(quiet());
        let mut events = Vec::new();

        game.jump(&mut events);
        assert!(game.player().airborne);
        assert_eq!(game.player().vy, -12.0);

        let mut landed_after = None;
        for n in 1..=60 {
            tick(&mut game, &TickInput::default(), &mut events);
            if !game.player().airborne {
                landed_after = Some(n);
                break;
            }
            assert!(game.player().pos.y < 300.0);
        }
        // sum of (-12 + 0.6k) reaches zero at k = 39
        let n = landed_after.unwrap();
        assert!((39..=40).contains(&n), "landed after {n} ticks");
        assert_eq!(game.player().pos.y, 300.0);
        assert!(game.player().double_jump);
        assert!(events.contains(&GameEvent::Land));
    }

    #[test]
    fn test_double_jump_once() {
        let mut game = running(quiet());
        let mut events = Vec::new();
        game.jump(&mut events);
        game.jump(&mut events);
        assert!((game.player().vy - (-12.0 * 0.85)).abs() < 1e-6);
        assert!(!game.player().double_jump);
        assert_eq!(game.particles().len(), 5);

        let vy = game.player().vy;
        game.jump(&mut events);
        assert_eq!(game.player().vy, vy);
        assert_eq!(events, vec![GameEvent::Jump, GameEvent::DoubleJump]);
    }

    #[test]
    fn test_obstacle_scores_once_when_passing() {
        let mut game = running(quiet());
        let mut events = Vec::new();
        // High enough to clear the standing player
        game.spawn_obstacle(ObstacleKind::Bird, Vec2::new(800.0, 100.0), Vec2::new(20.0, 25.0));

        // x + 20 < 50 first holds after 129 ticks at speed 6
        for _ in 0..128 {
            tick(&mut game, &TickInput::default(), &mut events);
        }
        assert_eq!(game.score(), 0);

        tick(&mut game, &TickInput::default(), &mut events);
        assert_eq!(game.score(), 10);

        for _ in 0..20 {
            tick(&mut game, &TickInput::default(), &mut events);
        }
        assert_eq!(game.score(), 10);
        assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::Score(_))).count(), 1);
    }

    #[test]
    fn test_obstacle_removed_after_leaving() {
        let mut game = running(quiet());
        let mut events = Vec::new();
        game.spawn_obstacle(ObstacleKind::Bird, Vec2::new(10.0, 100.0), Vec2::new(20.0, 25.0));
        // x + 20 < 0 after 6 ticks
        for _ in 0..5 {
            tick(&mut game, &TickInput::default(), &mut events);
        }
        assert_eq!(game.obstacles().len(), 1);
        tick(&mut game, &TickInput::default(), &mut events);
        assert!(game.obstacles().is_empty());
    }

    #[test]
    fn test_collision_ends_session_once() {
        let mut game = running(quiet());
        let mut events = Vec::new();
        // Two cacti overlapping the player in the same tick
        game.spawn_obstacle(ObstacleKind::Cactus, Vec2::new(60.0, 290.0), Vec2::new(20.0, 60.0));
        game.spawn_obstacle(ObstacleKind::Cactus, Vec2::new(70.0, 290.0), Vec2::new(20.0, 60.0));
        tick(&mut game, &TickInput::default(), &mut events);

        assert_eq!(game.phase(), GamePhase::Over);
        let overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_speed_ramps_with_score() {
        let mut game = running(quiet());
        let mut events = Vec::new();
        for i in 0..5 {
            game.spawn_obstacle(
                ObstacleKind::Bird,
                Vec2::new(60.0 + i as f32 * 200.0, 100.0),
                Vec2::new(20.0, 25.0),
            );
        }
        for _ in 0..400 {
            tick(&mut game, &TickInput::default(), &mut events);
        }
        assert_eq!(game.score(), 50);
        assert_eq!(game.speed(), 6.5);
        assert!(events.contains(&GameEvent::SpeedUp));
    }

    #[test]
    fn test_spawned_obstacles_fit_ranges() {
        let mut game = running(RunnerTuning {
            spawn_probability: 1.0,
            ..Default::default()
        });
        for _ in 0..50 {
            game.spawn_random_obstacle();
        }
        for o in game.obstacles().iter() {
            match o.kind.kind {
                ObstacleKind::Cactus => {
                    assert!((20.0..=40.0).contains(&o.size.x));
                    assert!((o.bounds().bottom() - 350.0).abs() < 1e-3);
                }
                ObstacleKind::Bird => {
                    assert_eq!(o.size, Vec2::new(35.0, 25.0));
                    assert!((200.0..=300.0).contains(&o.pos.y));
                }
            }
        }
    }

    #[test]
    fn test_idle_does_not_move() {
        let mut game = Runner::new(3);
        let mut events = Vec::new();
        for _ in 0..100 {
            tick(&mut game, &TickInput::default(), &mut events);
        }
        assert_eq!(game.frames(), 0);
        assert!(game.obstacles().is_empty());
    }
}
