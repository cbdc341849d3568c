//! Rigid transforms: a position plus a unit quaternion orientation.

use glam::{Mat3, Quat, Vec3};

/// Largest rotation a single integration step may apply.
const MAX_STEP_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Local space point to world space.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// World space point to local space.
    #[must_use]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    #[must_use]
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    #[must_use]
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    /// Rotation as a matrix whose columns are the local axes in world space.
    #[must_use]
    pub fn basis(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }

    /// Advances this transform by constant linear and angular velocity over
    /// `dt`. The rotation uses the exponential map and is limited to
    /// [`MAX_STEP_ANGLE`] radians per call.
    #[must_use]
    pub fn integrated(&self, linear: Vec3, angular: Vec3, dt: f32) -> Self {
        let mut step = angular * dt;
        let angle = step.length();
        if angle > MAX_STEP_ANGLE {
            step *= MAX_STEP_ANGLE / angle;
        }
        let rotation = (Quat::from_scaled_axis(step) * self.rotation).normalize();
        Self {
            position: self.position + linear * dt,
            rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_points() {
        let t = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.7));
        let p = Vec3::new(0.3, -0.2, 4.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn integrates_translation() {
        let t = Transform::IDENTITY.integrated(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, 0.5);
        assert!((t.position.y + 0.5).abs() < 1e-6);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn integrates_rotation_about_y() {
        let t = Transform::IDENTITY.integrated(Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0), 1.0);
        let x = t.transform_vector(Vec3::X);
        assert!((x - Vec3::new(0.5_f32.cos(), 0.0, -(0.5_f32.sin()))).length() < 1e-5);
    }

    #[test]
    fn clamps_large_rotation_steps() {
        let t = Transform::IDENTITY.integrated(Vec3::ZERO, Vec3::new(0.0, 100.0, 0.0), 1.0);
        let angle = t.rotation.angle_between(Quat::IDENTITY);
        assert!((angle - MAX_STEP_ANGLE).abs() < 1e-4);
    }
}
