//! # Body Integration
//!
//! The two integration passes of a step. Prediction moves every movable body
//! as if nothing else existed so the broadphase can look ahead; the commit
//! pass applies the solved velocities to the authoritative transforms.

use crate::body::Body;

/// Applies gravity and accumulated forces, damps, and writes each movable
/// body's predicted transform. World transforms are left untouched.
pub fn predict_body_locations(bodies: &mut [Body], gravity: f32, dt: f32) {
    for body in bodies.iter_mut() {
        body.guess = body.world;
        if body.is_movable() {
            body.apply_gravity(gravity);
            body.integrate_velocities(dt);
            body.apply_damping(dt);
            body.update_predicted_transform(dt);
        }
    }
}

/// Moves each movable body by its (solved) velocities and refreshes the
/// orientation dependent inertia tensor.
pub fn update_body_locations(bodies: &mut [Body], dt: f32) {
    for body in bodies.iter_mut().filter(|b| b.is_movable()) {
        body.update_world_transform(dt);
        body.update_inertia_tensor();
    }
}

/// Forces only last one step.
pub fn clear_forces(bodies: &mut [Body]) {
    for body in bodies.iter_mut() {
        body.clear_forces();
    }
}
