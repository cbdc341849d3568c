use thiserror::Error;

/// Errors reported when constructing bodies or configuring a simulation.
///
/// Stepping never fails: degenerate runtime input is handled by policy
/// (skipped contacts, vacuous query misses) rather than reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),
    #[error("mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
