//! # Rigid Bodies
//!
//! A [`Body`] couples a [`Shape`] with mass properties, a world transform and
//! the velocities and forces that move it. Bodies are created and owned by
//! the caller and handed to [`crate::Physics::step`] every frame.

use glam::{Mat3, Quat, Vec3};

use crate::error::PhysicsError;
use crate::shapes::Shape;
use crate::transform::Transform;
use crate::types::{Aabb, BodyId, BodyPose, Material};

/// Largest rotation a body may accumulate in a single step.
const MAX_ANGULAR_STEP: f32 = std::f32::consts::FRAC_PI_2;

#[derive(Clone, Debug)]
pub struct Body {
    id: BodyId,
    shape: Shape,
    mass: f32,
    inv_mass: f32,
    inv_inertia_local: Vec3,
    inv_inertia_world: Mat3,
    movable: bool,

    pub(crate) world: Transform,
    /// Lookahead transform written during prediction; only the broadphase
    /// reads it and it is overwritten every step.
    pub(crate) guess: Transform,

    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    /// Penetration correction from the solver, applied by the next commit
    /// only and never kept as momentum.
    pub(crate) bias_linear_velocity: Vec3,
    pub(crate) bias_angular_velocity: Vec3,
    force: Vec3,
    torque: Vec3,

    linear_damping: f32,
    angular_damping: f32,
    material: Material,
}

impl Body {
    /// Creates a body at the origin. A `mass` of zero makes it immovable.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidShape`] for non-positive or non-finite
    /// dimensions and [`PhysicsError::InvalidMass`] for a negative or
    /// non-finite mass, or one too small to invert.
    pub fn new(id: impl Into<BodyId>, shape: Shape, mass: f32) -> Result<Self, PhysicsError> {
        shape.validate()?;
        if !(mass.is_finite() && mass >= 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let movable = mass > 0.0;
        let (inv_mass, inv_inertia_local) = if movable {
            (mass.recip(), shape.inertia(mass).recip())
        } else {
            (0.0, Vec3::ZERO)
        };
        // Subnormal masses pass the sign check but cannot be inverted.
        if !(inv_mass.is_finite() && inv_inertia_local.is_finite()) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let mut body = Self {
            id: id.into(),
            shape,
            mass,
            inv_mass,
            inv_inertia_local,
            inv_inertia_world: Mat3::ZERO,
            movable,
            world: Transform::IDENTITY,
            guess: Transform::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            bias_linear_velocity: Vec3::ZERO,
            bias_angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            material: Material::default(),
        };
        body.update_inertia_tensor();
        Ok(body)
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation(rotation);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Damping is the fraction of velocity lost per second, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.set_damping(linear, angular);
        self
    }

    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.set_linear_velocity(velocity);
        self
    }

    #[must_use]
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.set_angular_velocity(velocity);
        self
    }

    #[must_use]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    #[must_use]
    pub fn inverse_inertia_world(&self) -> Mat3 {
        self.inv_inertia_world
    }

    /// Immovable bodies are never integrated but can still be collided with.
    #[must_use]
    pub fn is_movable(&self) -> bool {
        self.movable
    }

    #[must_use]
    pub fn world(&self) -> &Transform {
        &self.world
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world.position
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.world.rotation
    }

    #[must_use]
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    #[must_use]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Force accumulated since the last step.
    #[must_use]
    pub fn force(&self) -> Vec3 {
        self.force
    }

    #[must_use]
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    #[must_use]
    pub fn pose(&self) -> BodyPose {
        BodyPose::from(&self.world)
    }

    /// Teleports the body without touching its velocity.
    pub fn set_position(&mut self, position: Vec3) {
        self.world.position = position;
        self.guess.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.world.rotation = rotation.normalize();
        self.guess.rotation = self.world.rotation;
        self.update_inertia_tensor();
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.movable {
            self.linear_velocity = velocity;
        }
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.movable {
            self.angular_velocity = velocity;
        }
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn set_damping(&mut self, linear: f32, angular: f32) {
        self.linear_damping = linear.clamp(0.0, 1.0);
        self.angular_damping = angular.clamp(0.0, 1.0);
    }

    /// Adds a force through the center of mass for the next step.
    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    pub fn apply_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    /// Instant velocity change through the center of mass.
    pub fn apply_central_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse * self.inv_mass;
    }

    /// Instant velocity change applied at world point `at`.
    pub fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
        self.apply_central_impulse(impulse);
        let arm = at - self.world.position;
        self.angular_velocity += self.inv_inertia_world * arm.cross(impulse);
    }

    /// World bounds at the current transform, without margin.
    pub fn world_aabb(&self, out: &mut Aabb) {
        self.shape.aabb(&self.world, 0.0, out);
    }

    /// World bounds at the predicted transform, grown by `margin`.
    pub fn predicted_aabb(&self, out: &mut Aabb, margin: f32) {
        self.shape.aabb(&self.guess, margin, out);
    }

    /// Gravity acts as an acceleration: every body falls at the same rate.
    pub(crate) fn apply_gravity(&mut self, gravity: f32) {
        self.force.y += gravity * self.mass;
    }

    pub(crate) fn integrate_velocities(&mut self, dt: f32) {
        self.linear_velocity += self.force * (self.inv_mass * dt);
        self.angular_velocity += self.inv_inertia_world * self.torque * dt;

        let angular_speed = self.angular_velocity.length();
        if angular_speed * dt > MAX_ANGULAR_STEP {
            self.angular_velocity *= MAX_ANGULAR_STEP / dt / angular_speed;
        }
    }

    pub(crate) fn apply_damping(&mut self, dt: f32) {
        self.linear_velocity *= (1.0 - self.linear_damping).powf(dt);
        self.angular_velocity *= (1.0 - self.angular_damping).powf(dt);
    }

    pub(crate) fn update_predicted_transform(&mut self, dt: f32) {
        self.guess = self
            .world
            .integrated(self.linear_velocity, self.angular_velocity, dt);
    }

    pub(crate) fn update_world_transform(&mut self, dt: f32) {
        self.world = self.world.integrated(
            self.linear_velocity + self.bias_linear_velocity,
            self.angular_velocity + self.bias_angular_velocity,
            dt,
        );
        self.bias_linear_velocity = Vec3::ZERO;
        self.bias_angular_velocity = Vec3::ZERO;
    }

    /// Rotates the local inverse inertia into world space: `R * I⁻¹ * Rᵀ`.
    pub(crate) fn update_inertia_tensor(&mut self) {
        let basis = self.world.basis();
        self.inv_inertia_world =
            basis * Mat3::from_diagonal(self.inv_inertia_local) * basis.transpose();
    }

    pub(crate) fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}
