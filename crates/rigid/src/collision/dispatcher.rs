//! Collision detection dispatcher that routes body pairs to the algorithm
//! for their shape kinds.

use super::{
    collide_box_box, collide_box_sphere, collide_sphere_box, collide_sphere_sphere, ContactBuffer,
};
use crate::body::Body;
use crate::shapes::ShapeKind;

/// Body order of the contacts an algorithm produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    /// Contacts treat the first argument as body A.
    Kept,
    /// The algorithm normalized the order: contacts treat the second
    /// argument as body A.
    Swapped,
}

/// Exact collision test between two bodies. Contacts are written to the
/// buffer, which the caller has already reset.
pub type CollisionAlgorithm = fn(&Body, &Body, &mut ContactBuffer) -> Order;

/// Fixed table of collision algorithms indexed by `(ShapeKind, ShapeKind)`.
///
/// The shape set is closed, so every cell is filled at construction and a
/// lookup can never miss.
#[derive(Clone)]
pub struct CollisionDispatcher {
    algorithms: [[CollisionAlgorithm; ShapeKind::COUNT]; ShapeKind::COUNT],
}

impl CollisionDispatcher {
    #[must_use]
    pub fn new() -> Self {
        let fill: CollisionAlgorithm = collide_box_box;
        let mut algorithms = [[fill; ShapeKind::COUNT]; ShapeKind::COUNT];
        algorithms[ShapeKind::Box.index()][ShapeKind::Box.index()] = collide_box_box;
        algorithms[ShapeKind::Box.index()][ShapeKind::Sphere.index()] = collide_box_sphere;
        algorithms[ShapeKind::Sphere.index()][ShapeKind::Box.index()] = collide_sphere_box;
        algorithms[ShapeKind::Sphere.index()][ShapeKind::Sphere.index()] = collide_sphere_sphere;
        Self { algorithms }
    }

    #[must_use]
    pub fn algorithm(&self, a: ShapeKind, b: ShapeKind) -> CollisionAlgorithm {
        self.algorithms[a.index()][b.index()]
    }

    /// Resets `out` to `threshold` and runs the algorithm for `a` and `b`.
    pub fn collide(&self, a: &Body, b: &Body, threshold: f32, out: &mut ContactBuffer) -> Order {
        out.reset(threshold);
        (self.algorithm(a.shape().kind(), b.shape().kind()))(a, b, out)
    }
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CollisionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use glam::Vec3;

    #[test]
    fn dispatches_sphere_sphere() {
        let dispatcher = CollisionDispatcher::new();
        let a = Body::new(1, Shape::sphere(1.0), 1.0).unwrap();
        let b = Body::new(2, Shape::sphere(1.0), 1.0)
            .unwrap()
            .with_position(Vec3::new(1.5, 0.0, 0.0));
        let mut out = ContactBuffer::new();
        assert_eq!(dispatcher.collide(&a, &b, 0.04, &mut out), Order::Kept);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn box_sphere_is_normalized_to_sphere_first() {
        let dispatcher = CollisionDispatcher::new();
        let ground = Body::new(1, Shape::cuboid(5.0, 0.5, 5.0), 0.0).unwrap();
        let ball = Body::new(2, Shape::sphere(0.5), 1.0)
            .unwrap()
            .with_position(Vec3::new(0.0, 0.95, 0.0));
        let mut out = ContactBuffer::new();
        assert_eq!(dispatcher.collide(&ground, &ball, 0.04, &mut out), Order::Swapped);
        assert_eq!(out.len(), 1);
        // Normal points from the box (now B) to the sphere (now A).
        assert!((out.contacts()[0].normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn every_cell_is_filled() {
        let dispatcher = CollisionDispatcher::new();
        let mut out = ContactBuffer::new();
        let shapes = [Shape::cuboid(0.5, 0.5, 0.5), Shape::sphere(0.5)];
        for a in shapes {
            for b in shapes {
                let first = Body::new(1, a, 1.0).unwrap();
                let second = Body::new(2, b, 1.0).unwrap().with_position(Vec3::new(0.0, 0.9, 0.0));
                dispatcher.collide(&first, &second, 0.04, &mut out);
                assert!(!out.is_empty(), "{:?} vs {:?}", a.kind(), b.kind());
            }
        }
    }
}
