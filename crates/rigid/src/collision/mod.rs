//! # Collision Detection
//!
//! Broadphase pair tracking, per shape-pair narrowphase algorithms, the
//! persistent contact manifolds they feed, and ray casts.

mod box_box;
mod broad_phase;
mod dispatcher;
mod manifold;
mod narrow_phase;
mod raycast;
mod sphere_box;
mod sphere_sphere;

pub use box_box::collide_box_box;
pub use broad_phase::update_pairs;
pub use dispatcher::{CollisionAlgorithm, CollisionDispatcher, Order};
pub use manifold::{ContactPair, Manifold, PairId, MAX_MANIFOLD_POINTS, MIN_MATCH_DISTANCE};
pub use narrow_phase::collide_pairs;
pub use raycast::{cast, cast_all, Ray, RayHit};
pub use sphere_box::{collide_box_sphere, collide_sphere_box};
pub use sphere_sphere::collide_sphere_sphere;

use glam::Vec3;

use crate::transform::Transform;

/// Normals shorter than this are treated as degenerate.
pub(crate) const NORMAL_EPSILON: f32 = 1e-6;

/// A single point where two bodies touch.
///
/// The normal points from body B toward body A. `distance` is measured along
/// the normal from the point on B to the point on A: negative values are
/// penetration, positive values a gap still inside the contact margin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub local_a: Vec3,
    pub local_b: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// Accumulated normal impulse, carried across steps for warm starting.
    pub normal_impulse: f32,
    /// Accumulated friction impulses along the two contact tangents.
    pub tangent_impulse: [f32; 2],
    /// Steps this point has survived in its manifold.
    pub lifetime: u32,
}

impl Contact {
    /// Builds a contact from world points on each body. `normal` must be unit
    /// length and point from B to A.
    #[must_use]
    pub fn new(world_a: &Transform, world_b: &Transform, point_a: Vec3, point_b: Vec3, normal: Vec3) -> Self {
        Self {
            point_a,
            point_b,
            local_a: world_a.inverse_transform_point(point_a),
            local_b: world_b.inverse_transform_point(point_b),
            normal,
            distance: (point_a - point_b).dot(normal),
            normal_impulse: 0.0,
            tangent_impulse: [0.0; 2],
            lifetime: 0,
        }
    }

    /// Same contact seen with A and B exchanged.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            point_a: self.point_b,
            point_b: self.point_a,
            local_a: self.local_b,
            local_b: self.local_a,
            normal: -self.normal,
            ..*self
        }
    }
}

/// Reusable output buffer for narrowphase algorithms.
///
/// Its contents are only meaningful until the next [`ContactBuffer::reset`];
/// every collision call starts by resetting it.
#[derive(Debug, Default)]
pub struct ContactBuffer {
    contacts: Vec<Contact>,
    threshold: f32,
}

impl ContactBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            contacts: Vec::with_capacity(8),
            threshold: 0.0,
        }
    }

    /// Empties the buffer and sets the largest separation still reported as
    /// a contact.
    pub fn reset(&mut self, threshold: f32) {
        self.contacts.clear();
        self.threshold = threshold;
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Records `contact` unless it is farther apart than the threshold or
    /// numerically broken.
    pub fn push(&mut self, contact: Contact) {
        if contact.distance <= self.threshold
            && contact.distance.is_finite()
            && contact.normal.is_finite()
        {
            self.contacts.push(contact);
        }
    }

    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub(crate) fn flip_all(&mut self) {
        for contact in &mut self.contacts {
            *contact = contact.flipped();
        }
    }
}
