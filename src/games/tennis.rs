//! Tennis against a computer paddle
//!
//! Rally until one side misses; first to five points wins. The paddles have
//! rounded ends that throw the ball at steeper angles than the flat face.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, FRAC_PI_6};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::GameId;
use crate::settings::{Difficulty, PerDifficulty};
use crate::sim::{
    Aabb, GameEvent, GamePhase, Hud, Minigame, PhaseMachine, ScoreSlot, Scheduler, TaskId, TickInput,
    circle_bounds, linear_deflection, moving_toward, radial_deflection, velocity_at_angle,
};

/// Gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TennisTuning {
    pub field: Vec2,
    pub paddle_size: Vec2,
    /// Gap between each paddle and its side wall
    pub paddle_inset: f32,
    pub ball_radius: f32,
    /// Fraction of the remaining distance the computer closes per tick
    pub ai_rate: PerDifficulty<f32>,
    /// Drift-to-centre rate relative to `ai_rate`
    pub ai_idle_factor: f32,
    /// The computer only chases a ball past this fraction of the width
    pub ai_reaction_ratio: f32,
    pub ball_speed: PerDifficulty<f32>,
    pub speed_increment: PerDifficulty<f32>,
    /// Face hits deflect at most this far from horizontal
    pub face_max_angle: f32,
    pub cap_extra_angle: f32,
    pub cap_max_angle: f32,
    /// Serve angle is uniform within +/- this
    pub serve_spread: f32,
    pub serve_delay_ms: u64,
    pub paddle_key_speed: f32,
    pub winning_score: u32,
}

impl Default for TennisTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(800.0, 600.0),
            paddle_size: Vec2::new(10.0, 100.0),
            paddle_inset: 10.0,
            ball_radius: 10.0,
            ai_rate: PerDifficulty::new(0.05, 0.1, 0.15),
            ai_idle_factor: 0.3,
            ai_reaction_ratio: 0.3,
            ball_speed: PerDifficulty::new(5.0, 7.0, 9.0),
            speed_increment: PerDifficulty::new(0.3, 0.5, 0.7),
            face_max_angle: FRAC_PI_4,
            cap_extra_angle: FRAC_PI_6,
            cap_max_angle: FRAC_PI_3,
            serve_spread: FRAC_PI_6,
            serve_delay_ms: 2000,
            paddle_key_speed: 8.0,
            winning_score: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub center: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    pub radius: f32,
}

impl Ball {
    pub fn bounds(&self) -> Aabb {
        circle_bounds(self.center, self.radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Serve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Player,
    Computer,
}

#[derive(Debug, Clone)]
pub struct Tennis {
    tuning: TennisTuning,
    rng: Pcg32,
    phases: PhaseMachine,
    timers: Scheduler<Timer>,
    difficulty: Difficulty,
    player: Aabb,
    com: Aabb,
    ball: Ball,
    /// Ball is parked between points
    serve: Option<TaskId>,
    last_pointer_y: Option<f32>,
    player_points: u32,
    com_points: u32,
}

impl Tennis {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, TennisTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: TennisTuning) -> Self {
        Self::fresh(tuning, Pcg32::seed_from_u64(seed), Difficulty::default())
    }

    fn fresh(tuning: TennisTuning, rng: Pcg32, difficulty: Difficulty) -> Self {
        let field = tuning.field;
        let size = tuning.paddle_size;
        let paddle_y = (field.y - size.y) / 2.0;
        let ball = Ball {
            center: field / 2.0,
            vel: Vec2::ZERO,
            speed: *tuning.ball_speed.get(difficulty),
            radius: tuning.ball_radius,
        };
        Self {
            player: Aabb::new(Vec2::new(tuning.paddle_inset, paddle_y), size),
            com: Aabb::new(Vec2::new(field.x - size.x - tuning.paddle_inset, paddle_y), size),
            ball,
            rng,
            phases: PhaseMachine::new(),
            timers: Scheduler::new(),
            difficulty,
            serve: None,
            last_pointer_y: None,
            player_points: 0,
            com_points: 0,
            tuning,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn player_paddle(&self) -> &Aabb {
        &self.player
    }

    pub fn computer_paddle(&self) -> &Aabb {
        &self.com
    }

    pub fn player_points(&self) -> u32 {
        self.player_points
    }

    pub fn computer_points(&self) -> u32 {
        self.com_points
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Waiting for the next serve
    pub fn is_between_points(&self) -> bool {
        self.serve.is_some()
    }

    /// Player won the match (only meaningful once over)
    pub fn player_won(&self) -> bool {
        self.player_points >= self.tuning.winning_score
    }

    /// Centre the ball and launch it at a random angle toward either side
    fn serve_ball(&mut self) {
        let speed = *self.tuning.ball_speed.get(self.difficulty);
        let angle = (self.rng.random::<f32>() - 0.5) * 2.0 * self.tuning.serve_spread;
        let dir = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
        self.ball.center = self.tuning.field / 2.0;
        self.ball.speed = speed;
        self.ball.vel = velocity_at_angle(speed, angle, dir);
    }

    fn clamp_paddle(&self, paddle: &mut Aabb) {
        paddle.min.y = paddle.min.y.clamp(0.0, self.tuning.field.y - paddle.size.y);
    }

    fn steer_player(&mut self, input: &TickInput) {
        let mut paddle = self.player;
        if let Some(p) = input.pointer {
            if self.last_pointer_y != Some(p.pos.y) {
                self.last_pointer_y = Some(p.pos.y);
                paddle.min.y = p.pos.y - paddle.size.y / 2.0;
            }
        }
        paddle.min.y += input.held.axis().y * self.tuning.paddle_key_speed;
        self.clamp_paddle(&mut paddle);
        self.player = paddle;
    }

    fn steer_computer(&mut self) {
        let rate = *self.tuning.ai_rate.get(self.difficulty);
        let field = self.tuning.field;
        let mut paddle = self.com;
        let chasing = self.ball.vel.x > 0.0 && self.ball.center.x > field.x * self.tuning.ai_reaction_ratio;
        if chasing {
            let target = self.ball.center.y - paddle.size.y / 2.0;
            paddle.min.y += (target - paddle.min.y) * rate;
        } else {
            let target = (field.y - paddle.size.y) / 2.0;
            paddle.min.y += (target - paddle.min.y) * rate * self.tuning.ai_idle_factor;
        }
        self.clamp_paddle(&mut paddle);
        self.com = paddle;
    }

    fn bounce_walls(&mut self, events: &mut Vec<GameEvent>) {
        let b = self.ball.bounds();
        let top = b.top() < 0.0 && moving_toward(self.ball.vel, Vec2::Y);
        let bottom = b.bottom() > self.tuning.field.y && moving_toward(self.ball.vel, Vec2::NEG_Y);
        if top || bottom {
            self.ball.vel.y = -self.ball.vel.y;
            events.push(GameEvent::WallHit);
        }
    }

    /// Returns true if the ball was struck this tick
    fn strike(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let side = if self.ball.center.x < self.tuning.field.x / 2.0 {
            Side::Player
        } else {
            Side::Computer
        };
        let (paddle, face_normal, dir_x) = match side {
            Side::Player => (self.player, Vec2::X, 1.0),
            Side::Computer => (self.com, Vec2::NEG_X, -1.0),
        };
        // Only a ball heading into the face can be struck; avoids double hits
        if !self.ball.bounds().overlaps(&paddle) || !moving_toward(self.ball.vel, face_normal) {
            return false;
        }

        let cap_radius = paddle.size.x / 2.0;
        let top_cap = Vec2::new(paddle.center().x, paddle.top() + cap_radius);
        let bottom_cap = Vec2::new(paddle.center().x, paddle.bottom() - cap_radius);
        let reach = cap_radius + self.ball.radius;

        let cap = if self.ball.center.y < top_cap.y {
            Some(top_cap)
        } else if self.ball.center.y > bottom_cap.y {
            Some(bottom_cap)
        } else {
            None
        };

        let angle = match cap {
            Some(cap) if self.ball.center.distance(cap) <= reach => radial_deflection(
                self.ball.center - cap,
                self.tuning.cap_extra_angle,
                self.tuning.cap_max_angle,
            ),
            _ => linear_deflection(
                self.ball.center.y - paddle.center().y,
                paddle.size.y / 2.0,
                self.tuning.face_max_angle,
            ),
        };

        self.ball.vel = velocity_at_angle(self.ball.speed, angle, dir_x);
        self.ball.speed += *self.tuning.speed_increment.get(self.difficulty);
        events.push(GameEvent::PaddleHit);
        true
    }

    fn award_point(&mut self, events: &mut Vec<GameEvent>) {
        let b = self.ball.bounds();
        let player = if b.left() < 0.0 {
            false
        } else if b.right() > self.tuning.field.x {
            true
        } else {
            return;
        };

        if player {
            self.player_points += 1;
        } else {
            self.com_points += 1;
        }
        events.push(GameEvent::Point { player });

        self.ball.center = self.tuning.field / 2.0;
        self.ball.vel = Vec2::ZERO;

        let target = self.tuning.winning_score;
        if self.player_points >= target || self.com_points >= target {
            log::info!(
                "tennis match over {}-{} ({})",
                self.player_points,
                self.com_points,
                if self.player_won() { "player" } else { "computer" }
            );
            if self.phases.finish() {
                events.push(GameEvent::GameOver {
                    score: self.player_points as u64,
                });
            }
            return;
        }

        let delay = crate::consts::ticks_from_ms(self.tuning.serve_delay_ms);
        self.serve = Some(self.timers.schedule_in(delay, Timer::Serve));
    }

    fn step_running(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        self.steer_player(input);
        if self.serve.is_some() {
            return;
        }

        self.ball.center += self.ball.vel;
        self.steer_computer();
        self.bounce_walls(events);
        self.strike(events);
        self.award_point(events);
    }
}

impl Minigame for Tennis {
    fn id(&self) -> GameId {
        GameId::Tennis
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
        self.player_points as u64
    }

    fn score_slot(&self) -> Option<ScoreSlot> {
        None
    }

    fn update(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        for timer in self.timers.advance() {
            match timer {
                Timer::Serve => {
                    self.serve = None;
                    self.serve_ball();
                }
            }
        }

        match self.phases.phase() {
            GamePhase::Idle => {
                if (input.primary || input.click.is_some()) && self.phases.start() {
                    log::debug!("tennis start ({})", self.difficulty.as_str());
                    self.serve_ball();
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
        *self = Self::fresh(self.tuning.clone(), rng, self.difficulty);
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.difficulty = difficulty;
        self.reset();
        true
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.player_points as u64,
            phase: self.phases.phase(),
            extras: vec![
                ("Computer", self.com_points.to_string()),
                ("Difficulty", self.difficulty.as_str().to_string()),
            ],
        }
    }
}
