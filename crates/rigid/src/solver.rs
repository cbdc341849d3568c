//! # Contact Solver
//!
//! Sequential impulses over every point of every touching pair. Each point
//! carries one non-penetration row along its normal and two friction rows
//! along a tangent basis derived from the normal. Accumulated impulses are
//! clamped (normal impulse never pulls, friction stays inside the Coulomb
//! cone) and written back to the manifold so the next step can warm start.
//!
//! Penetration is corrected by a split impulse: a second pass solves the
//! same rows against pseudo velocities that move the bodies this step and
//! are then discarded, so the correction never turns into momentum.
//! Contacts that are still separated act speculatively: bodies may approach
//! only as fast as closes the remaining gap within one step.

use std::collections::{BTreeMap, HashMap};

use glam::{Mat3, Vec3};

use crate::body::Body;
use crate::collision::{ContactPair, PairId};
use crate::config::PhysicsConfig;
use crate::types::BodyId;

/// Velocity state of one colliding body while the solver runs.
#[derive(Clone, Debug)]
struct SolverBody {
    slot: usize,
    inv_mass: f32,
    inv_inertia: Mat3,
    linear: Vec3,
    angular: Vec3,
    bias_linear: Vec3,
    bias_angular: Vec3,
}

impl SolverBody {
    fn from_body(slot: usize, body: &Body) -> Self {
        Self {
            slot,
            inv_mass: body.inverse_mass(),
            inv_inertia: body.inverse_inertia_world(),
            linear: body.linear_velocity(),
            angular: body.angular_velocity(),
            bias_linear: Vec3::ZERO,
            bias_angular: Vec3::ZERO,
        }
    }

    fn velocity_at(&self, r: Vec3) -> Vec3 {
        self.linear + self.angular.cross(r)
    }

    fn bias_velocity_at(&self, r: Vec3) -> Vec3 {
        self.bias_linear + self.bias_angular.cross(r)
    }

    fn apply_impulse(&mut self, impulse: Vec3, r: Vec3) {
        self.linear += impulse * self.inv_mass;
        self.angular += self.inv_inertia * r.cross(impulse);
    }

    fn apply_bias_impulse(&mut self, impulse: Vec3, r: Vec3) {
        self.bias_linear += impulse * self.inv_mass;
        self.bias_angular += self.inv_inertia * r.cross(impulse);
    }

    /// Inverse effective mass seen by an impulse along `direction` at `r`.
    fn inverse_mass_along(&self, r: Vec3, direction: Vec3) -> f32 {
        let rn = r.cross(direction);
        self.inv_mass + (self.inv_inertia * rn).cross(r).dot(direction)
    }
}

/// One manifold point prepared for solving.
#[derive(Clone, Debug)]
struct ContactRow {
    pair: PairId,
    point: usize,
    body_a: usize,
    body_b: usize,
    r_a: Vec3,
    r_b: Vec3,
    normal: Vec3,
    tangents: [Vec3; 2],
    normal_mass: f32,
    tangent_mass: [f32; 2],
    friction: f32,
    target_velocity: f32,
    /// Separating pseudo velocity that removes the penetration beyond slop.
    bias_velocity: f32,
    normal_impulse: f32,
    tangent_impulse: [f32; 2],
    bias_impulse: f32,
}

impl ContactRow {
    /// Velocity of A relative to B at the contact.
    fn relative_velocity(&self, bodies: &[SolverBody]) -> Vec3 {
        bodies[self.body_a].velocity_at(self.r_a) - bodies[self.body_b].velocity_at(self.r_b)
    }

    fn apply(&self, bodies: &mut [SolverBody], impulse: Vec3) {
        bodies[self.body_a].apply_impulse(impulse, self.r_a);
        bodies[self.body_b].apply_impulse(-impulse, self.r_b);
    }

    fn solve_friction(&mut self, bodies: &mut [SolverBody]) {
        let limit = self.friction * self.normal_impulse;
        for i in 0..2 {
            let tangent = self.tangents[i];
            let speed = self.relative_velocity(bodies).dot(tangent);
            let old = self.tangent_impulse[i];
            self.tangent_impulse[i] = (old - speed * self.tangent_mass[i]).clamp(-limit, limit);
            self.apply(bodies, tangent * (self.tangent_impulse[i] - old));
        }
    }

    fn solve_normal(&mut self, bodies: &mut [SolverBody]) {
        let speed = self.relative_velocity(bodies).dot(self.normal);
        let old = self.normal_impulse;
        self.normal_impulse = (old + self.normal_mass * (self.target_velocity - speed)).max(0.0);
        self.apply(bodies, self.normal * (self.normal_impulse - old));
    }

    fn solve_penetration(&mut self, bodies: &mut [SolverBody]) {
        let speed = (bodies[self.body_a].bias_velocity_at(self.r_a)
            - bodies[self.body_b].bias_velocity_at(self.r_b))
        .dot(self.normal);
        let old = self.bias_impulse;
        self.bias_impulse = (old + self.normal_mass * (self.bias_velocity - speed)).max(0.0);
        let impulse = self.normal * (self.bias_impulse - old);
        bodies[self.body_a].apply_bias_impulse(impulse, self.r_a);
        bodies[self.body_b].apply_bias_impulse(-impulse, self.r_b);
    }
}

fn reciprocal_or_zero(value: f32) -> f32 {
    if value > f32::EPSILON {
        value.recip()
    } else {
        0.0
    }
}

/// Reusable sequential impulse solver. Its buffers are scratch space that is
/// rebuilt on every call to [`Solver::solve`].
#[derive(Clone, Debug, Default)]
pub struct Solver {
    bodies: Vec<SolverBody>,
    lookup: HashMap<BodyId, usize>,
    rows: Vec<ContactRow>,
}

impl Solver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every touching pair in `pairs` and writes the new velocities
    /// back to the movable bodies in `colliding`, which maps body ids to
    /// their index in `bodies`. Penetration corrections are handed to the
    /// bodies separately and only move them during the next commit.
    pub fn solve(
        &mut self,
        bodies: &mut [Body],
        colliding: &BTreeMap<BodyId, usize>,
        pairs: &mut BTreeMap<PairId, ContactPair>,
        config: &PhysicsConfig,
        dt: f32,
    ) {
        self.prepare(bodies, colliding, pairs, config, dt);
        self.warm_start(config.warm_start_factor);

        let Self {
            bodies: solver_bodies,
            rows,
            ..
        } = &mut *self;
        for _ in 0..config.solver_iterations {
            for row in rows.iter_mut() {
                row.solve_friction(solver_bodies);
                row.solve_normal(solver_bodies);
            }
        }
        for _ in 0..config.solver_iterations {
            for row in rows.iter_mut().filter(|row| row.bias_velocity > 0.0) {
                row.solve_penetration(solver_bodies);
            }
        }

        self.store(bodies, pairs);
    }

    /// Number of contact rows in the last solve.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn prepare(
        &mut self,
        bodies: &[Body],
        colliding: &BTreeMap<BodyId, usize>,
        pairs: &BTreeMap<PairId, ContactPair>,
        config: &PhysicsConfig,
        dt: f32,
    ) {
        self.bodies.clear();
        self.lookup.clear();
        self.rows.clear();
        for (&id, &slot) in colliding {
            self.lookup.insert(id, self.bodies.len());
            self.bodies.push(SolverBody::from_body(slot, &bodies[slot]));
        }

        let inv_dt = dt.recip();
        for (&pair_id, pair) in pairs {
            if !pair.is_touching() {
                continue;
            }
            let (id_a, id_b) = pair.bodies();
            let (Some(&index_a), Some(&index_b)) = (self.lookup.get(&id_a), self.lookup.get(&id_b)) else {
                continue;
            };
            let (a, b) = (&self.bodies[index_a], &self.bodies[index_b]);
            let material_a = bodies[a.slot].material();
            let material_b = bodies[b.slot].material();
            let friction = material_a.combined_friction(material_b, config.max_friction);
            let restitution = material_a.combined_restitution(material_b);
            let center_a = bodies[a.slot].position();
            let center_b = bodies[b.slot].position();

            for (index, point) in pair.manifold().points().iter().enumerate() {
                let normal = point.normal;
                let tangent = normal.any_orthonormal_vector();
                let tangents = [tangent, normal.cross(tangent)];
                let r_a = point.point_a - center_a;
                let r_b = point.point_b - center_b;

                let approach = (a.velocity_at(r_a) - b.velocity_at(r_b)).dot(normal);
                let bounce = if approach < -config.restitution_threshold {
                    -restitution * approach
                } else {
                    0.0
                };
                let target_velocity = if point.distance > 0.0 {
                    // Bounce early if the gap closes within this step.
                    let closing = -point.distance * inv_dt;
                    if bounce > 0.0 && approach < closing {
                        bounce
                    } else {
                        closing
                    }
                } else {
                    bounce
                };
                let depth = (-point.distance - config.penetration_slop).max(0.0);
                let bias_velocity = config.baumgarte * depth * inv_dt;

                let mass_along = |direction: Vec3| {
                    reciprocal_or_zero(
                        a.inverse_mass_along(r_a, direction) + b.inverse_mass_along(r_b, direction),
                    )
                };
                self.rows.push(ContactRow {
                    pair: pair_id,
                    point: index,
                    body_a: index_a,
                    body_b: index_b,
                    r_a,
                    r_b,
                    normal,
                    tangents,
                    normal_mass: mass_along(normal),
                    tangent_mass: [mass_along(tangents[0]), mass_along(tangents[1])],
                    friction,
                    target_velocity,
                    bias_velocity,
                    normal_impulse: point.normal_impulse,
                    tangent_impulse: point.tangent_impulse,
                    bias_impulse: 0.0,
                });
            }
        }
    }

    fn warm_start(&mut self, factor: f32) {
        for row in &mut self.rows {
            row.normal_impulse *= factor;
            row.tangent_impulse[0] *= factor;
            row.tangent_impulse[1] *= factor;
            let impulse = row.normal * row.normal_impulse
                + row.tangents[0] * row.tangent_impulse[0]
                + row.tangents[1] * row.tangent_impulse[1];
            row.apply(&mut self.bodies, impulse);
        }
    }

    fn store(&self, bodies: &mut [Body], pairs: &mut BTreeMap<PairId, ContactPair>) {
        for row in &self.rows {
            if let Some(point) = pairs
                .get_mut(&row.pair)
                .and_then(|pair| pair.manifold.points_mut().get_mut(row.point))
            {
                point.normal_impulse = row.normal_impulse;
                point.tangent_impulse = row.tangent_impulse;
            }
        }
        for solver_body in &self.bodies {
            let body = &mut bodies[solver_body.slot];
            if body.is_movable() {
                body.linear_velocity = solver_body.linear;
                body.angular_velocity = solver_body.angular;
                body.bias_linear_velocity = solver_body.bias_linear;
                body.bias_angular_velocity = solver_body.bias_angular;
            }
        }
    }
}
