//! Ray queries against single bodies.

use glam::Vec3;

use crate::body::Body;
use crate::shapes::ShapeKind;
use crate::types::BodyId;

/// Half line starting at `origin`, limited to `max_distance`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Unbounded ray. `direction` is normalized; a zero or non-finite
    /// direction produces a ray that never hits anything.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: f32::INFINITY,
        }
    }

    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    #[must_use]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    fn is_degenerate(&self) -> bool {
        !self.origin.is_finite()
            || !self.direction.is_normalized()
            || self.max_distance.is_nan()
            || self.max_distance < 0.0
    }
}

/// Where a ray meets a body's surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Outward surface normal at `point`.
    pub normal: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

type RayAlgorithm = fn(&Ray, &Body) -> Option<RayHit>;

/// Indexed by [`ShapeKind::index`].
const RAY_ALGORITHMS: [RayAlgorithm; ShapeKind::COUNT] = [cast_box, cast_sphere];

/// Nearest intersection of `ray` with `body`. A ray starting inside the body
/// reports the point where it leaves.
#[must_use]
pub fn cast(ray: &Ray, body: &Body) -> Option<RayHit> {
    if ray.is_degenerate() {
        return None;
    }
    RAY_ALGORITHMS[body.shape().kind().index()](ray, body)
        .filter(|hit| hit.distance <= ray.max_distance)
}

/// Nearest hit across `bodies`, with the id of the body that was hit.
#[must_use]
pub fn cast_all(ray: &Ray, bodies: &[Body]) -> Option<(BodyId, RayHit)> {
    bodies
        .iter()
        .filter_map(|body| cast(ray, body).map(|hit| (body.id(), hit)))
        .min_by(|(_, x), (_, y)| x.distance.total_cmp(&y.distance))
}

fn cast_sphere(ray: &Ray, body: &Body) -> Option<RayHit> {
    let radius = body.shape().radius()?;
    let center = body.position();
    let offset = ray.origin - center;
    let b = offset.dot(ray.direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let (near, far) = (-b - root, -b + root);
    if far < 0.0 {
        return None;
    }
    let distance = if near >= 0.0 { near } else { far };
    let point = ray.point_at(distance);
    Some(RayHit {
        point,
        normal: (point - center) / radius,
        distance,
    })
}

/// Slab test in the box's local frame.
fn cast_box(ray: &Ray, body: &Body) -> Option<RayHit> {
    let half = body.shape().half_extents()?;
    let world = body.world();
    let origin = world.inverse_transform_point(ray.origin);
    let direction = world.inverse_transform_vector(ray.direction);

    let (mut enter, mut enter_normal) = (f32::NEG_INFINITY, Vec3::ZERO);
    let (mut exit, mut exit_normal) = (f32::INFINITY, Vec3::ZERO);
    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let mut face = Vec3::ZERO;
        face[axis] = 1.0;
        let to_min = (-half[axis] - origin[axis]) / direction[axis];
        let to_max = (half[axis] - origin[axis]) / direction[axis];
        let (near, near_face, far, far_face) = if to_min < to_max {
            (to_min, -face, to_max, face)
        } else {
            (to_max, face, to_min, -face)
        };
        if near > enter {
            enter = near;
            enter_normal = near_face;
        }
        if far < exit {
            exit = far;
            exit_normal = far_face;
        }
        if enter > exit {
            return None;
        }
    }
    if exit < 0.0 {
        return None;
    }

    let (distance, local_normal) = if enter >= 0.0 {
        (enter, enter_normal)
    } else {
        (exit, exit_normal)
    };
    Some(RayHit {
        point: ray.point_at(distance),
        normal: world.transform_vector(local_normal),
        distance,
    })
}
