//! Narrow-phase pass over the tracked pairs.

use std::collections::{BTreeMap, HashMap};

use super::{CollisionDispatcher, ContactBuffer, ContactPair, Order, PairId};
use crate::body::Body;
use crate::types::BodyId;

/// Runs the exact collision test for every tracked pair and folds the
/// results into the pairs' manifolds.
///
/// `slots` maps body ids to their index in `bodies`. Bodies that touch
/// something are recorded in `colliding`, which is cleared first. `contacts`
/// is scratch space for each test.
pub fn collide_pairs(
    bodies: &[Body],
    slots: &HashMap<BodyId, usize>,
    pairs: &mut BTreeMap<PairId, ContactPair>,
    dispatcher: &CollisionDispatcher,
    contacts: &mut ContactBuffer,
    margin: f32,
    colliding: &mut BTreeMap<BodyId, usize>,
) {
    colliding.clear();

    for pair in pairs.values_mut() {
        let (Some(&slot_a), Some(&slot_b)) = (slots.get(&pair.body_a), slots.get(&pair.body_b)) else {
            pair.touching = false;
            continue;
        };
        let (a, b) = match dispatcher.collide(&bodies[slot_a], &bodies[slot_b], margin, contacts) {
            Order::Kept => (&bodies[slot_a], &bodies[slot_b]),
            Order::Swapped => {
                pair.swap_bodies();
                (&bodies[slot_b], &bodies[slot_a])
            }
        };

        if contacts.is_empty() {
            pair.touching = false;
            pair.manifold.clear();
            continue;
        }

        pair.touching = true;
        colliding.insert(bodies[slot_a].id(), slot_a);
        colliding.insert(bodies[slot_b].id(), slot_b);
        pair.manifold.refresh(a.world(), b.world(), margin);
        pair.manifold.merge(contacts.contacts(), margin);
    }
}
