//! Positioned, axis-aligned actors and the pool that owns them

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap on both axes (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// True once this box lies completely past `region` on the side `vel` points to
    pub fn has_left(&self, region: &Aabb, vel: Vec2) -> bool {
        (vel.x < 0.0 && self.right() < region.left())
            || (vel.x > 0.0 && self.left() > region.right())
            || (vel.y < 0.0 && self.bottom() < region.top())
            || (vel.y > 0.0 && self.top() > region.bottom())
    }
}

/// A dynamic actor: position (top-left), velocity per tick, size and a variant tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<K> {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: K,
}

impl<K> Entity<K> {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Constant-velocity kinematics for one tick
    #[inline]
    pub fn step(&mut self) {
        self.pos += self.vel;
    }
}

/// Owns every live entity of one kind. Ids are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool<K> {
    items: Vec<Entity<K>>,
    next_id: u32,
}

impl<K> Default for EntityPool<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K> EntityPool<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its id
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, size: Vec2, kind: K) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Entity {
            id,
            pos,
            vel,
            size,
            kind,
        });
        id
    }

    /// Advance every entity by its velocity
    pub fn step_all(&mut self) {
        for entity in &mut self.items {
            entity.step();
        }
    }

    /// Drop entities that have fully left `region` in their direction of travel.
    /// Returns the number removed.
    pub fn cull(&mut self, region: &Aabb) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !e.bounds().has_left(region, e.vel));
        before - self.items.len()
    }

    pub fn retain(&mut self, f: impl FnMut(&Entity<K>) -> bool) {
        self.items.retain(f);
    }

    /// Remove entities whose ids appear in `ids`
    pub fn remove_ids(&mut self, ids: &[u32]) {
        if ids.is_empty() {
            return;
        }
        self.items.retain(|e| !ids.contains(&e.id));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: u32) -> Option<&Entity<K>> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity<K>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity<K>> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity<K>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Id the next spawn will receive
    pub fn peek_next_id(&self) -> u32 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_edges() {
        let b = Aabb::new(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0));
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_has_left_depends_on_direction() {
        let region = Aabb::new(Vec2::ZERO, Vec2::new(800.0, 400.0));
        let gone = Aabb::new(Vec2::new(-30.0, 100.0), Vec2::new(20.0, 20.0));
        assert!(gone.has_left(&region, Vec2::new(-6.0, 0.0)));
        // Same box moving right is entering, not leaving
        assert!(!gone.has_left(&region, Vec2::new(6.0, 0.0)));

        let partial = Aabb::new(Vec2::new(-10.0, 100.0), Vec2::new(20.0, 20.0));
        assert!(!partial.has_left(&region, Vec2::new(-6.0, 0.0)));
    }

    #[test]
    fn test_pool_ids_never_reused() {
        let mut pool: EntityPool<()> = EntityPool::new();
        let a = pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, ());
        pool.remove_ids(&[a]);
        let b = pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, ());
        assert_ne!(a, b);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_cull_removes_only_exited() {
        let region = Aabb::new(Vec2::ZERO, Vec2::new(800.0, 400.0));
        let mut pool: EntityPool<()> = EntityPool::new();
        let keep = pool.spawn(Vec2::new(5.0, 0.0), Vec2::new(-6.0, 0.0), Vec2::new(20.0, 20.0), ());
        pool.spawn(Vec2::new(-25.0, 0.0), Vec2::new(-6.0, 0.0), Vec2::new(20.0, 20.0), ());
        assert_eq!(pool.cull(&region), 1);
        assert_eq!(pool.as_slice()[0].id, keep);
    }
}
