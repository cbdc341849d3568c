//! Sphere-sphere collision detection

use glam::Vec3;

use super::{Contact, ContactBuffer, Order, NORMAL_EPSILON};
use crate::body::Body;

/// One contact along the line between the centers. Coincident centers fall
/// back to a +Y normal.
pub fn collide_sphere_sphere(a: &Body, b: &Body, out: &mut ContactBuffer) -> Order {
    // The dispatch table only routes sphere pairs here.
    let (Some(radius_a), Some(radius_b)) = (a.shape().radius(), b.shape().radius()) else {
        return Order::Kept;
    };
    let center_a = a.position();
    let center_b = b.position();

    let delta = center_a - center_b;
    let distance_squared = delta.length_squared();
    let reach = radius_a + radius_b + out.threshold();
    if distance_squared > reach * reach {
        return Order::Kept;
    }

    let distance = distance_squared.sqrt();
    let normal = if distance > NORMAL_EPSILON {
        delta / distance
    } else {
        Vec3::Y
    };

    out.push(Contact::new(
        a.world(),
        b.world(),
        center_a - normal * radius_a,
        center_b + normal * radius_b,
        normal,
    ));
    Order::Kept
}
