//! Broad-phase pair tracking over body bounding boxes.
//!
//! Every unordered body pair with at least one movable member is tested each
//! step. New pairs need their unexpanded current bounds to overlap; pairs
//! already tracked survive as long as their predicted bounds still overlap
//! once grown by the margin. The asymmetry keeps resting contacts from
//! flickering in and out of the table.

use std::collections::BTreeMap;

use tracing::trace;

use super::{ContactPair, PairId};
use crate::body::Body;
use crate::types::Aabb;

/// Refreshes `pairs` against the current body list.
///
/// `bounds` is scratch space for the two boxes under test. Pairs that were
/// not confirmed during this pass, including pairs whose bodies are no longer
/// in `bodies`, are removed before returning.
pub fn update_pairs(
    bodies: &[Body],
    pairs: &mut BTreeMap<PairId, ContactPair>,
    bounds: &mut [Aabb; 2],
    margin: f32,
) {
    for pair in pairs.values_mut() {
        pair.valid = false;
    }

    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if !a.is_movable() && !b.is_movable() {
                continue;
            }
            if a.id() == b.id() {
                continue;
            }
            let id = PairId::new(a.id(), b.id());
            let [bounds_a, bounds_b] = &mut *bounds;

            if let Some(pair) = pairs.get_mut(&id) {
                a.predicted_aabb(bounds_a, margin);
                b.predicted_aabb(bounds_b, margin);
                if bounds_a.overlaps(bounds_b) {
                    pair.valid = true;
                } else {
                    pairs.remove(&id);
                    trace!(pair = %id, "pair separated");
                }
            } else {
                a.world_aabb(bounds_a);
                b.world_aabb(bounds_b);
                if bounds_a.overlaps(bounds_b) {
                    let mut pair = ContactPair::new(a.id(), b.id());
                    pair.valid = true;
                    pairs.insert(id, pair);
                    trace!(pair = %id, "pair added");
                }
            }
        }
    }

    pairs.retain(|id, pair| {
        if !pair.valid {
            trace!(pair = %id, "stale pair purged");
        }
        pair.valid
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use glam::Vec3;

    fn ball(id: u32, x: f32) -> Body {
        Body::new(id, Shape::sphere(0.5), 1.0)
            .unwrap()
            .with_position(Vec3::new(x, 0.0, 0.0))
    }

    fn run(bodies: &[Body], pairs: &mut BTreeMap<PairId, ContactPair>) {
        let mut bounds = [Aabb::default(); 2];
        update_pairs(bodies, pairs, &mut bounds, 0.04);
    }

    #[test]
    fn overlapping_bodies_get_one_pair() {
        let bodies = [ball(1, 0.0), ball(2, 0.9), ball(3, 5.0)];
        let mut pairs = BTreeMap::new();
        run(&bodies, &mut pairs);
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains_key(&PairId::new(2.into(), 1.into())));
    }

    #[test]
    fn immovable_pairs_are_ignored() {
        let ground = |id: u32| Body::new(id, Shape::cuboid(1.0, 1.0, 1.0), 0.0).unwrap();
        let bodies = [ground(1), ground(2)];
        let mut pairs = BTreeMap::new();
        run(&bodies, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn new_pairs_need_unexpanded_overlap() {
        // 1.02 apart: inside the margin but not touching.
        let bodies = [ball(1, 0.0), ball(2, 1.02)];
        let mut pairs = BTreeMap::new();
        run(&bodies, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn existing_pairs_survive_within_margin() {
        let mut bodies = [ball(1, 0.0), ball(2, 0.9)];
        let mut pairs = BTreeMap::new();
        run(&bodies, &mut pairs);
        assert_eq!(pairs.len(), 1);

        bodies[1].set_position(Vec3::new(1.02, 0.0, 0.0));
        run(&bodies, &mut pairs);
        assert_eq!(pairs.len(), 1);

        bodies[1].set_position(Vec3::new(1.5, 0.0, 0.0));
        run(&bodies, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn removed_bodies_are_purged() {
        let bodies = [ball(1, 0.0), ball(2, 0.9), ball(3, -0.9)];
        let mut pairs = BTreeMap::new();
        run(&bodies, &mut pairs);
        assert_eq!(pairs.len(), 2);

        run(&bodies[..2], &mut pairs);
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains_key(&PairId::new(1.into(), 2.into())));
    }
}
