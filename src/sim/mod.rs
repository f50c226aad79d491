//! Deterministic simulation module
//!
//! Shared core for every game. This module must be pure and deterministic:
//! - Fixed timestep only (delays are counted in ticks)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod events;
pub mod phase;
pub mod schedule;
pub mod spawn;
pub mod tick;

pub use collision::{
    aabb_overlap, circle_bounds, circles_overlap, linear_deflection, moving_toward, radial_deflection,
    reflect_velocity, velocity_at_angle,
};
pub use entity::{Aabb, Entity, EntityPool};
pub use events::GameEvent;
pub use phase::{GamePhase, PhaseError, PhaseMachine};
pub use schedule::{Scheduler, TaskId};
pub use spawn::{Ramp, SpawnPolicy, Spawner, uniform};
pub use tick::{Held, Hud, Minigame, PointerState, ScoreSlot, TickInput, tick};

/// Visual particle (dust, sparks); never affects gameplay
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Particle {
    pub pos: glam::Vec2,
    pub vel: glam::Vec2,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
}

impl Particle {
    /// Integrate one tick; false once faded out
    pub fn step(&mut self, gravity: f32, decay: f32) -> bool {
        self.pos += self.vel;
        self.vel.y += gravity;
        self.life -= decay;
        self.life > 0.0
    }
}
