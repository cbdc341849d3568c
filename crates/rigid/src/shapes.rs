//! The closed set of collision shapes.

use glam::Vec3;

use crate::error::PhysicsError;
use crate::transform::Transform;
use crate::types::Aabb;

/// Tag used to index the collision and ray cast dispatch tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
}

impl ShapeKind {
    /// Number of shape kinds, the side length of the dispatch table.
    pub const COUNT: usize = 2;

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ShapeKind::Box => 0,
            ShapeKind::Sphere => 1,
        }
    }
}

/// Body geometry, centered on the body's origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

impl Shape {
    #[must_use]
    pub const fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Shape::Box {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }

    #[must_use]
    pub const fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }

    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Sphere { .. } => ShapeKind::Sphere,
        }
    }

    #[must_use]
    pub const fn radius(&self) -> Option<f32> {
        match *self {
            Shape::Sphere { radius } => Some(radius),
            Shape::Box { .. } => None,
        }
    }

    #[must_use]
    pub const fn half_extents(&self) -> Option<Vec3> {
        match *self {
            Shape::Box { half_extents } => Some(half_extents),
            Shape::Sphere { .. } => None,
        }
    }

    /// Half size of the shape's local bounding box.
    #[must_use]
    pub fn local_extent(&self) -> Vec3 {
        match *self {
            Shape::Box { half_extents } => half_extents,
            Shape::Sphere { radius } => Vec3::splat(radius),
        }
    }

    /// Writes the world bounds of this shape placed at `transform` into `out`.
    pub fn aabb(&self, transform: &Transform, margin: f32, out: &mut Aabb) {
        match *self {
            Shape::Box { half_extents } => out.set_oriented(half_extents, transform, margin),
            Shape::Sphere { radius } => out.set_sphere(transform.position, radius, margin),
        }
    }

    /// Diagonal of the solid body's inertia tensor about its center of mass.
    #[must_use]
    pub fn inertia(&self, mass: f32) -> Vec3 {
        match *self {
            Shape::Box { half_extents } => {
                let size = half_extents * 2.0;
                let sq = size * size;
                Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 12.0)
            }
            Shape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Shape::Box { half_extents } => {
                if half_extents.is_finite() && half_extents.min_element() > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape("box half extents must be finite and positive"))
                }
            }
            Shape::Sphere { radius } => {
                if radius.is_finite() && radius > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape("sphere radius must be finite and positive"))
                }
            }
        }
    }
}
