//! Sphere-box collision detection against oriented boxes

use glam::Vec3;

use super::{Contact, ContactBuffer, Order, NORMAL_EPSILON};
use crate::body::Body;

/// Sphere `a` against box `b`. Contacts have the sphere as body A.
pub fn collide_sphere_box(a: &Body, b: &Body, out: &mut ContactBuffer) -> Order {
    // The dispatch table only routes sphere-box pairs here.
    let (Some(radius), Some(half_extents)) = (a.shape().radius(), b.shape().half_extents()) else {
        return Order::Kept;
    };
    let center = a.position();
    let local = b.world().inverse_transform_point(center);
    let closest = local.clamp(-half_extents, half_extents);

    let (local_normal, surface) = if closest == local {
        inside_face(local, half_extents)
    } else {
        let delta = local - closest;
        let length = delta.length();
        if length > radius + out.threshold() {
            return Order::Kept;
        }
        if length <= NORMAL_EPSILON {
            inside_face(local, half_extents)
        } else {
            (delta / length, closest)
        }
    };

    let normal = b.world().transform_vector(local_normal);
    out.push(Contact::new(
        a.world(),
        b.world(),
        center - normal * radius,
        b.world().transform_point(surface),
        normal,
    ));
    Order::Kept
}

/// Box `a` against sphere `b`: swaps so the sphere comes first.
pub fn collide_box_sphere(a: &Body, b: &Body, out: &mut ContactBuffer) -> Order {
    collide_sphere_box(b, a, out);
    Order::Swapped
}

/// Outward normal and surface point of the face nearest to a point inside
/// the box, both in box space.
fn inside_face(local: Vec3, half_extents: Vec3) -> (Vec3, Vec3) {
    let depth = half_extents - local.abs();
    let axis = if depth.x <= depth.y && depth.x <= depth.z {
        0
    } else if depth.y <= depth.z {
        1
    } else {
        2
    };
    let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
    let mut normal = Vec3::ZERO;
    normal[axis] = sign;
    let mut surface = local;
    surface[axis] = sign * half_extents[axis];
    (normal, surface)
}
