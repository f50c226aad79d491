//! Collision primitives shared by every game
//!
//! Two detection shapes: axis-aligned boxes (everything) and circular proximity
//! with a forgiveness margin (the shooter's player contact). Response helpers
//! cover reflection and the paddle deflection used by the tennis game.

use glam::Vec2;

use super::entity::Aabb;

/// Rectangles intersect on both axes
#[inline]
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}

/// Centers closer than the summed radii minus `margin`
#[inline]
pub fn circles_overlap(a_center: Vec2, a_radius: f32, b_center: Vec2, b_radius: f32, margin: f32) -> bool {
    a_center.distance(b_center) < a_radius + b_radius - margin
}

/// Bounding box of a circle
#[inline]
pub fn circle_bounds(center: Vec2, radius: f32) -> Aabb {
    Aabb::from_center(center, Vec2::splat(radius * 2.0))
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Whether `velocity` points into a surface with outward `normal`
#[inline]
pub fn moving_toward(velocity: Vec2, normal: Vec2) -> bool {
    velocity.dot(normal) < 0.0
}

/// Map the impact offset from the paddle center onto a deflection angle.
///
/// `offset / half_extent` is clamped to [-1, 1] so the result never exceeds
/// `max_angle` in magnitude.
pub fn linear_deflection(offset: f32, half_extent: f32, max_angle: f32) -> f32 {
    if half_extent <= 0.0 {
        return 0.0;
    }
    (offset / half_extent).clamp(-1.0, 1.0) * max_angle
}

/// Deflection off a rounded paddle end.
///
/// `from_cap` is the ball center relative to the cap's center. The contact
/// direction is pushed `extra` further away from the paddle axis, then folded
/// onto the outgoing half-plane and capped at `max_angle`.
pub fn radial_deflection(from_cap: Vec2, extra: f32, max_angle: f32) -> f32 {
    let sign = if from_cap.y < 0.0 { -1.0 } else { 1.0 };
    let raw = from_cap.y.atan2(from_cap.x) + extra * sign;
    // Angle against the horizontal axis regardless of which side the hit came from
    let folded = raw.sin().atan2(raw.cos().abs());
    folded.clamp(-max_angle, max_angle)
}

/// Velocity leaving at `angle` from horizontal, heading in `dir_x` (+1 right, -1 left)
#[inline]
pub fn velocity_at_angle(speed: f32, angle: f32, dir_x: f32) -> Vec2 {
    Vec2::new(dir_x * speed * angle.cos(), speed * angle.sin())
}
