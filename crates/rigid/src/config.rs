//! Simulation tunables.
//!
//! Every [`crate::Physics`] instance owns its own [`PhysicsConfig`], so two
//! simulations never share gravity or margin settings.

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Default gravity along the Y axis, in units/s².
pub const DEFAULT_GRAVITY: f32 = -10.0;

/// Default collision margin, in world units.
pub const DEFAULT_MARGIN: f32 = 0.04;

/// Upper bound on the combined friction of a contact pair.
pub const DEFAULT_MAX_FRICTION: f32 = 10.0;

/// Tunable parameters read by the pipeline at step time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to every movable body along Y.
    pub gravity: f32,
    /// Gap used to smooth collision detection. Retained pairs, contact
    /// generation and contact persistence all tolerate this much separation.
    pub margin: f32,
    /// Clamp on the product of two bodies' friction coefficients.
    pub max_friction: f32,
    /// Sequential impulse iterations per step.
    pub solver_iterations: u32,
    /// Fraction of penetration pushed out per step by the split impulse pass.
    pub baumgarte: f32,
    /// Penetration tolerated without any positional correction.
    pub penetration_slop: f32,
    /// Approach speed below which contacts do not bounce.
    pub restitution_threshold: f32,
    /// Scale applied to last step's impulses before solving.
    pub warm_start_factor: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            margin: DEFAULT_MARGIN,
            max_friction: DEFAULT_MAX_FRICTION,
            solver_iterations: 10,
            baumgarte: 0.2,
            penetration_slop: 0.005,
            restitution_threshold: 0.5,
            warm_start_factor: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Checks that every tunable is usable by the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite"));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(PhysicsError::InvalidConfig("margin must be finite and non-negative"));
        }
        if !(self.max_friction.is_finite() && self.max_friction >= 0.0) {
            return Err(PhysicsError::InvalidConfig("max_friction must be finite and non-negative"));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig("solver_iterations must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.baumgarte) {
            return Err(PhysicsError::InvalidConfig("baumgarte must lie in [0, 1]"));
        }
        if !(self.penetration_slop.is_finite() && self.penetration_slop >= 0.0) {
            return Err(PhysicsError::InvalidConfig("penetration_slop must be finite and non-negative"));
        }
        if !(self.restitution_threshold.is_finite() && self.restitution_threshold >= 0.0) {
            return Err(PhysicsError::InvalidConfig(
                "restitution_threshold must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.warm_start_factor) {
            return Err(PhysicsError::InvalidConfig("warm_start_factor must lie in [0, 1]"));
        }
        Ok(())
    }
}
