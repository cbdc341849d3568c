//! Persistent contact manifolds and the pairs that own them.

use std::fmt;

use glam::Vec3;

use super::Contact;
use crate::transform::Transform;
use crate::types::BodyId;

/// Maximum contact points kept per body pair.
pub const MAX_MANIFOLD_POINTS: usize = 4;

/// Smallest distance over which a contact is still recognised as the same
/// point, whatever the collision margin.
pub const MIN_MATCH_DISTANCE: f32 = 0.02;

/// Order independent identifier of an unordered body pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairId(pub u64);

impl PairId {
    /// The smaller id lands in the high word, so `new(a, b) == new(b, a)`.
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        Self((u64::from(lo) << 32) | u64::from(hi))
    }

    /// The two ids, smaller first.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bodies(self) -> (BodyId, BodyId) {
        (BodyId((self.0 >> 32) as u32), BodyId(self.0 as u32))
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.bodies();
        write!(f, "{a}:{b}")
    }
}

/// Up to [`MAX_MANIFOLD_POINTS`] contacts that persist between steps.
#[derive(Clone, Debug, Default)]
pub struct Manifold {
    points: Vec<Contact>,
}

impl Manifold {
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(MAX_MANIFOLD_POINTS),
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Contact] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [Contact] {
        &mut self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Re-evaluates stored points against the bodies' current transforms.
    /// Points whose bodies moved apart by more than `threshold` along the
    /// normal, or slid more than `threshold` (at least
    /// [`MIN_MATCH_DISTANCE`]) along the surface, are dropped.
    pub fn refresh(&mut self, world_a: &Transform, world_b: &Transform, threshold: f32) {
        let slide = threshold.max(MIN_MATCH_DISTANCE);
        let slide_sq = slide * slide;
        self.points.retain_mut(|point| {
            point.point_a = world_a.transform_point(point.local_a);
            point.point_b = world_b.transform_point(point.local_b);
            point.distance = (point.point_a - point.point_b).dot(point.normal);
            point.lifetime += 1;
            if point.distance > threshold {
                return false;
            }
            let projected = point.point_a - point.normal * point.distance;
            let drift = point.point_b - projected;
            drift.length_squared() <= slide_sq
        });
    }

    /// Folds freshly generated contacts into the manifold. A new contact that
    /// lands within `threshold` (at least [`MIN_MATCH_DISTANCE`]) of a stored
    /// one replaces it but inherits its accumulated impulses and lifetime.
    pub fn merge(&mut self, contacts: &[Contact], threshold: f32) {
        for contact in contacts {
            self.add_point(*contact, threshold);
        }
    }

    fn add_point(&mut self, mut contact: Contact, threshold: f32) {
        if let Some(index) = self.closest_point(&contact, threshold) {
            let old = &self.points[index];
            contact.normal_impulse = old.normal_impulse;
            contact.tangent_impulse = old.tangent_impulse;
            contact.lifetime = old.lifetime;
            self.points[index] = contact;
        } else if self.points.len() < MAX_MANIFOLD_POINTS {
            self.points.push(contact);
        } else {
            let index = self.replacement_index(&contact);
            self.points[index] = contact;
        }
    }

    fn closest_point(&self, contact: &Contact, threshold: f32) -> Option<usize> {
        let reach = threshold.max(MIN_MATCH_DISTANCE);
        let mut best = None;
        let mut best_sq = reach * reach;
        for (index, point) in self.points.iter().enumerate() {
            let sq = (point.local_b - contact.local_b).length_squared();
            if sq <= best_sq {
                best_sq = sq;
                best = Some(index);
            }
        }
        best
    }

    /// Chooses which of four stored points to give up for `contact`: never
    /// the deepest one, and otherwise the one whose removal leaves the
    /// largest contact area.
    fn replacement_index(&self, contact: &Contact) -> usize {
        let mut deepest = None;
        let mut deepest_distance = contact.distance;
        for (index, point) in self.points.iter().enumerate() {
            if point.distance < deepest_distance {
                deepest_distance = point.distance;
                deepest = Some(index);
            }
        }

        let p: [Vec3; MAX_MANIFOLD_POINTS] = std::array::from_fn(|i| self.points[i].local_a);
        let q = contact.local_a;
        let area = |skip: usize| -> f32 {
            if deepest == Some(skip) {
                return -1.0;
            }
            let (a, b) = match skip {
                0 => (q - p[1], p[3] - p[2]),
                1 => (q - p[0], p[3] - p[2]),
                2 => (q - p[0], p[3] - p[1]),
                _ => (q - p[0], p[2] - p[1]),
            };
            a.cross(b).length_squared()
        };

        (0..MAX_MANIFOLD_POINTS)
            .map(|i| (i, area(i)))
            .fold((0, f32::MIN), |best, (i, a)| if a > best.1 { (i, a) } else { best })
            .0
    }

    /// Exchanges the roles of A and B for every stored point.
    pub(crate) fn flip(&mut self) {
        for point in &mut self.points {
            *point = point.flipped();
        }
    }
}

/// Two bodies whose bounds overlap, plus their persistent contacts.
///
/// Bodies are referenced by id only; the caller owns them.
#[derive(Clone, Debug)]
pub struct ContactPair {
    pub(crate) body_a: BodyId,
    pub(crate) body_b: BodyId,
    /// Refreshed every broadphase pass; pairs left invalid are purged.
    pub(crate) valid: bool,
    /// Refreshed every narrowphase pass.
    pub(crate) touching: bool,
    pub(crate) manifold: Manifold,
}

impl ContactPair {
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId) -> Self {
        Self {
            body_a,
            body_b,
            valid: false,
            touching: false,
            manifold: Manifold::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> PairId {
        PairId::new(self.body_a, self.body_b)
    }

    /// The pair's bodies in the order the narrowphase expects them.
    #[must_use]
    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    /// Whether the last narrowphase pass found contacts for this pair.
    #[must_use]
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    #[must_use]
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// Absorbs a body order swap made by a collision algorithm.
    pub(crate) fn swap_bodies(&mut self) {
        std::mem::swap(&mut self.body_a, &mut self.body_b);
        self.manifold.flip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_at(x: f32, z: f32, distance: f32) -> Contact {
        let t = Transform::IDENTITY;
        let on_b = Vec3::new(x, 0.0, z);
        Contact::new(&t, &t, on_b + Vec3::Y * distance, on_b, Vec3::Y)
    }

    #[test]
    fn pair_id_is_symmetric() {
        let a = BodyId(3);
        let b = BodyId(17);
        assert_eq!(PairId::new(a, b), PairId::new(b, a));
        assert_eq!(PairId::new(a, b).bodies(), (a, b));
        assert_ne!(PairId::new(a, b), PairId::new(a, BodyId(18)));
    }

    #[test]
    fn merge_keeps_impulses_of_matching_points() {
        let mut manifold = Manifold::new();
        manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.04);
        manifold.points_mut()[0].normal_impulse = 2.5;
        manifold.points_mut()[0].lifetime = 7;

        manifold.merge(&[contact_at(0.01, 0.0, -0.02)], 0.04);
        assert_eq!(manifold.len(), 1);
        assert!((manifold.points()[0].normal_impulse - 2.5).abs() < f32::EPSILON);
        assert_eq!(manifold.points()[0].lifetime, 7);
        assert!((manifold.points()[0].distance + 0.02).abs() < 1e-6);
    }

    #[test]
    fn zero_threshold_still_matches_the_same_point() {
        let mut manifold = Manifold::new();
        manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.0);
        manifold.points_mut()[0].normal_impulse = 1.5;
        for _ in 0..5 {
            manifold.refresh(&Transform::IDENTITY, &Transform::IDENTITY, 0.0);
            manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.0);
        }
        assert_eq!(manifold.len(), 1);
        assert!((manifold.points()[0].normal_impulse - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_caps_at_four_and_keeps_deepest() {
        let mut manifold = Manifold::new();
        manifold.merge(
            &[
                contact_at(-1.0, -1.0, -0.05),
                contact_at(1.0, -1.0, -0.01),
                contact_at(1.0, 1.0, -0.01),
                contact_at(-1.0, 1.0, -0.01),
            ],
            0.04,
        );
        manifold.merge(&[contact_at(0.0, 0.0, -0.02)], 0.04);
        assert_eq!(manifold.len(), MAX_MANIFOLD_POINTS);
        assert!(manifold.points().iter().any(|p| (p.distance + 0.05).abs() < 1e-6));
    }

    #[test]
    fn refresh_drops_separated_points() {
        let mut manifold = Manifold::new();
        manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.04);
        let lifted = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        manifold.refresh(&lifted, &Transform::IDENTITY, 0.04);
        assert!(manifold.is_empty());
    }

    #[test]
    fn refresh_drops_sliding_points() {
        let mut manifold = Manifold::new();
        manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.04);
        let slid = Transform::from_position(Vec3::new(0.5, 0.0, 0.0));
        manifold.refresh(&slid, &Transform::IDENTITY, 0.04);
        assert!(manifold.is_empty());
    }

    #[test]
    fn refresh_keeps_resting_points() {
        let mut manifold = Manifold::new();
        manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.04);
        manifold.refresh(&Transform::IDENTITY, &Transform::IDENTITY, 0.04);
        assert_eq!(manifold.len(), 1);
        assert_eq!(manifold.points()[0].lifetime, 1);
    }

    #[test]
    fn swapping_bodies_flips_points() {
        let mut pair = ContactPair::new(BodyId(1), BodyId(2));
        pair.manifold.merge(&[contact_at(0.0, 0.0, -0.01)], 0.04);
        let id = pair.id();
        pair.swap_bodies();
        assert_eq!(pair.bodies(), (BodyId(2), BodyId(1)));
        assert_eq!(pair.id(), id);
        assert_eq!(pair.manifold().points()[0].normal, -Vec3::Y);
    }
}
