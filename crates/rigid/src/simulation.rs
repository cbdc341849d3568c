//! # Physics Simulation Core
//!
//! [`Physics`] owns everything that persists between steps (the overlap
//! table and the configuration) plus scratch buffers reused by every step.
//! Bodies are owned by the caller and passed in on each call.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::body::Body;
use crate::collision::{
    self, collide_pairs, update_pairs, CollisionDispatcher, ContactBuffer, ContactPair, PairId,
    Ray, RayHit,
};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::integrator::{clear_forces, predict_body_locations, update_body_locations};
use crate::solver::Solver;
use crate::types::{Aabb, BodyId, BodyPose};

/// The rigid body pipeline: predict, broadphase, narrowphase, solve,
/// integrate, clear forces.
#[derive(Debug)]
pub struct Physics {
    config: PhysicsConfig,
    dispatcher: CollisionDispatcher,
    solver: Solver,
    overlapped: BTreeMap<PairId, ContactPair>,

    // Scratch. Contents are only meaningful during the call that fills them.
    bounds: [Aabb; 2],
    contacts: ContactBuffer,
    slots: HashMap<BodyId, usize>,
    colliding: BTreeMap<BodyId, usize>,
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics {
    /// Simulation with default gravity (-10) and margin (0.04).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PhysicsConfig::default(),
            dispatcher: CollisionDispatcher::new(),
            solver: Solver::new(),
            overlapped: BTreeMap::new(),
            bounds: [Aabb::default(); 2],
            contacts: ContactBuffer::new(),
            slots: HashMap::new(),
            colliding: BTreeMap::new(),
        }
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replaces every tunable at once.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] and keeps the current
    /// configuration if `config` fails validation.
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<(), PhysicsError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Non-finite values are ignored.
    pub fn set_gravity(&mut self, gravity: f32) {
        if gravity.is_finite() {
            self.config.gravity = gravity;
        } else {
            warn!(gravity, "ignoring non-finite gravity");
        }
    }

    /// Negative or non-finite values are ignored.
    pub fn set_margin(&mut self, margin: f32) {
        if margin.is_finite() && margin >= 0.0 {
            self.config.margin = margin;
        } else {
            warn!(margin, "ignoring invalid collision margin");
        }
    }

    /// Advances `bodies` by `timestep` seconds.
    ///
    /// `bodies` must hold every body in the scene, immovable ones included.
    /// Pairs that refer to bodies missing from the slice are dropped.
    pub fn step(&mut self, bodies: &mut [Body], timestep: f32) {
        if !(timestep.is_finite() && timestep > 0.0) {
            warn!(timestep, "skipping step with invalid timestep");
            return;
        }

        self.slots.clear();
        for (slot, body) in bodies.iter().enumerate() {
            if self.slots.insert(body.id(), slot).is_some() {
                warn!(id = %body.id(), "duplicate body id in step");
            }
        }

        let margin = self.config.margin;
        predict_body_locations(bodies, self.config.gravity, timestep);
        update_pairs(bodies, &mut self.overlapped, &mut self.bounds, margin);
        collide_pairs(
            bodies,
            &self.slots,
            &mut self.overlapped,
            &self.dispatcher,
            &mut self.contacts,
            margin,
            &mut self.colliding,
        );
        if !self.colliding.is_empty() {
            self.solver.solve(
                bodies,
                &self.colliding,
                &mut self.overlapped,
                &self.config,
                timestep,
            );
        }
        update_body_locations(bodies, timestep);
        clear_forces(bodies);

        debug!(
            bodies = bodies.len(),
            pairs = self.overlapped.len(),
            colliding = self.colliding.len(),
            rows = self.solver.row_count(),
            "step"
        );
    }

    /// Whether `a` and `b` are touching right now, within the margin.
    ///
    /// Neither body nor the overlap table is modified.
    pub fn collide(&mut self, a: &Body, b: &Body) -> bool {
        self.dispatcher
            .collide(a, b, self.config.margin, &mut self.contacts);
        !self.contacts.is_empty()
    }

    /// Nearest intersection of `ray` with `body`.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn cast(&self, ray: &Ray, body: &Body) -> Option<RayHit> {
        collision::cast(ray, body)
    }

    /// Nearest intersection of `ray` across `bodies`.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn cast_all(&self, ray: &Ray, bodies: &[Body]) -> Option<(BodyId, RayHit)> {
        collision::cast_all(ray, bodies)
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.overlapped.len()
    }

    /// Tracked pairs in ascending id order.
    pub fn pairs(&self) -> impl Iterator<Item = (PairId, &ContactPair)> {
        self.overlapped.iter().map(|(id, pair)| (*id, pair))
    }

    #[must_use]
    pub fn contains_pair(&self, a: BodyId, b: BodyId) -> bool {
        self.overlapped.contains_key(&PairId::new(a, b))
    }

    #[must_use]
    pub fn pair(&self, a: BodyId, b: BodyId) -> Option<&ContactPair> {
        self.overlapped.get(&PairId::new(a, b))
    }

    /// Bodies found touching during the last step.
    pub fn colliding(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.colliding.keys().copied()
    }

    /// Forgets every tracked pair and its warm start data.
    pub fn reset(&mut self) {
        self.overlapped.clear();
        self.colliding.clear();
    }
}

/// Plain-old-data poses for `bodies`, in slice order.
#[must_use]
pub fn snapshot_poses(bodies: &[Body]) -> Vec<BodyPose> {
    bodies.iter().map(Body::pose).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use glam::Vec3;

    fn scene() -> Vec<Body> {
        vec![
            Body::new(1, Shape::cuboid(5.0, 0.5, 5.0), 0.0).unwrap(),
            Body::new(2, Shape::sphere(0.5), 1.0)
                .unwrap()
                .with_position(Vec3::new(0.0, 0.99, 0.0)),
        ]
    }

    #[test]
    fn invalid_timestep_is_ignored() {
        let mut physics = Physics::new();
        let mut bodies = scene();
        let before = snapshot_poses(&bodies);
        physics.step(&mut bodies, 0.0);
        physics.step(&mut bodies, f32::NAN);
        physics.step(&mut bodies, -0.1);
        assert_eq!(snapshot_poses(&bodies), before);
        assert_eq!(physics.pair_count(), 0);
    }

    #[test]
    fn step_tracks_resting_pair() {
        let mut physics = Physics::new();
        let mut bodies = scene();
        physics.step(&mut bodies, 1.0 / 60.0);
        assert!(physics.contains_pair(BodyId(1), BodyId(2)));
        assert_eq!(physics.colliding().count(), 2);
        assert!(physics.pair(BodyId(2), BodyId(1)).unwrap().is_touching());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut physics = Physics::new();
        physics.set_gravity(f32::INFINITY);
        physics.set_margin(-1.0);
        assert_eq!(*physics.config(), PhysicsConfig::default());

        let bad = PhysicsConfig {
            solver_iterations: 0,
            ..PhysicsConfig::default()
        };
        assert!(Physics::with_config(bad).is_err());
        assert!(physics.set_config(bad).is_err());
    }

    #[test]
    fn reset_forgets_pairs() {
        let mut physics = Physics::new();
        let mut bodies = scene();
        physics.step(&mut bodies, 1.0 / 60.0);
        physics.reset();
        assert_eq!(physics.pair_count(), 0);
        assert_eq!(physics.colliding().count(), 0);
    }
}
