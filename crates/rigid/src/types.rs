use std::fmt;

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// Caller supplied body identity. Must be unique within one step's body list
/// and stable for the body's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl From<u32> for BodyId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Surface properties used when two bodies touch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

impl Material {
    #[must_use]
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }

    /// High restitution, moderate friction.
    #[must_use]
    pub const fn bouncy() -> Self {
        Self::new(0.4, 0.9)
    }

    /// Almost no friction, no bounce.
    #[must_use]
    pub const fn slippery() -> Self {
        Self::new(0.02, 0.0)
    }

    /// Combined friction of two materials, clamped to `max_friction` so two
    /// grippy surfaces cannot pump energy into the solver.
    #[must_use]
    pub fn combined_friction(&self, other: &Self, max_friction: f32) -> f32 {
        (self.friction * other.friction).clamp(0.0, max_friction)
    }

    #[must_use]
    pub fn combined_restitution(&self, other: &Self) -> f32 {
        (self.restitution * other.restitution).clamp(0.0, 1.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.5, 0.0)
    }
}

/// World space axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Overwrites this box with the bounds of a local half extent rotated and
    /// translated by `transform`, grown by `margin` on every side.
    pub fn set_oriented(&mut self, half_extents: Vec3, transform: &Transform, margin: f32) {
        let rot = Mat3::from_quat(transform.rotation);
        let abs = Mat3::from_cols(rot.x_axis.abs(), rot.y_axis.abs(), rot.z_axis.abs());
        let extent = abs * half_extents + Vec3::splat(margin);
        self.min = transform.position - extent;
        self.max = transform.position + extent;
    }

    /// Bounds of a sphere of `radius` centered at `center`, grown by `margin`.
    pub fn set_sphere(&mut self, center: Vec3, radius: f32, margin: f32) {
        let extent = Vec3::splat(radius + margin);
        self.min = center - extent;
        self.max = center + extent;
    }

    /// Inclusive overlap test: touching boxes overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

/// Plain data snapshot of a body's world transform, laid out for direct
/// upload into instance buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyPose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl From<&Transform> for BodyPose {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.position.to_array(),
            rotation: transform.rotation.to_array(),
        }
    }
}
