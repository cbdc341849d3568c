//! Box-box collision detection using the separating axis test.
//!
//! All 15 candidate axes are tested (three face normals per box plus the
//! nine edge cross products). Face contacts clip the incident face against
//! the reference face and keep up to four points; edge contacts produce the
//! closest points of the two edges.

use glam::Vec3;

use super::{Contact, ContactBuffer, Order, MAX_MANIFOLD_POINTS};
use crate::body::Body;
use crate::transform::Transform;

/// Edge pairs closer to parallel than this have no usable cross product.
const PARALLEL_EPSILON: f32 = 1e-3;

/// Face axes win ties against edge axes unless the edge separation is
/// clearly larger; this keeps resting boxes on stable face contacts.
const RELATIVE_TOLERANCE: f32 = 0.95;
const ABSOLUTE_TOLERANCE: f32 = 0.01;

/// Most vertices a quad can have after clipping by four planes.
const MAX_CLIP_VERTICES: usize = 8;

/// Box `a` against box `b`.
pub fn collide_box_box(a: &Body, b: &Body, out: &mut ContactBuffer) -> Order {
    // The dispatch table only routes box pairs here.
    let (Some(half_a), Some(half_b)) = (a.shape().half_extents(), b.shape().half_extents()) else {
        return Order::Kept;
    };
    let box_a = OrientedBox::new(a.world(), half_a);
    let box_b = OrientedBox::new(b.world(), half_b);
    let offset = box_b.center - box_a.center;
    let margin = out.threshold();

    let mut face_a = (f32::MIN, 0);
    for (i, axis) in box_a.axes.iter().enumerate() {
        let gap = separation(*axis, offset, &box_a, &box_b);
        if gap > margin {
            return Order::Kept;
        }
        if gap > face_a.0 {
            face_a = (gap, i);
        }
    }

    let mut face_b = (f32::MIN, 0);
    for (j, axis) in box_b.axes.iter().enumerate() {
        let gap = separation(*axis, offset, &box_a, &box_b);
        if gap > margin {
            return Order::Kept;
        }
        if gap > face_b.0 {
            face_b = (gap, j);
        }
    }

    let mut edge: Option<EdgeAxis> = None;
    for i in 0..3 {
        for j in 0..3 {
            let cross = box_a.axes[i].cross(box_b.axes[j]);
            let length = cross.length();
            if length < PARALLEL_EPSILON {
                continue;
            }
            let axis = cross / length;
            let gap = separation(axis, offset, &box_a, &box_b);
            if gap > margin {
                return Order::Kept;
            }
            if edge.map_or(true, |e| gap > e.separation) {
                edge = Some(EdgeAxis {
                    separation: gap,
                    edge_a: i,
                    edge_b: j,
                    axis,
                });
            }
        }
    }

    let best_face = face_a.0.max(face_b.0);
    match edge {
        Some(edge) if clearly_better(edge.separation, best_face) => {
            edge_contact(a, b, &box_a, &box_b, offset, &edge, out);
        }
        _ if clearly_better(face_b.0, face_a.0) => {
            face_contact(a, b, &box_b, face_b.1, &box_a, false, out);
        }
        _ => face_contact(a, b, &box_a, face_a.1, &box_b, true, out),
    }
    Order::Kept
}

#[derive(Copy, Clone, Debug)]
struct OrientedBox {
    center: Vec3,
    axes: [Vec3; 3],
    half: Vec3,
}

impl OrientedBox {
    fn new(transform: &Transform, half: Vec3) -> Self {
        let basis = transform.basis();
        Self {
            center: transform.position,
            axes: [basis.x_axis, basis.y_axis, basis.z_axis],
            half,
        }
    }

    /// Half length of the box's shadow on `axis`.
    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half.to_array())
            .map(|(a, h)| h * a.dot(axis).abs())
            .sum()
    }
}

#[derive(Copy, Clone, Debug)]
struct EdgeAxis {
    separation: f32,
    edge_a: usize,
    edge_b: usize,
    axis: Vec3,
}

/// Whether separation `candidate` beats `current` by more than the
/// tolerances. Ties keep `current`.
fn clearly_better(candidate: f32, current: f32) -> bool {
    candidate > RELATIVE_TOLERANCE * current + ABSOLUTE_TOLERANCE
}

/// Gap between the boxes' shadows on `axis`; negative when they overlap.
fn separation(axis: Vec3, offset: Vec3, a: &OrientedBox, b: &OrientedBox) -> f32 {
    offset.dot(axis).abs() - a.projected_radius(axis) - b.projected_radius(axis)
}

fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Contact between a face of `reference` and the most opposed face of
/// `incident`.
fn face_contact(
    a: &Body,
    b: &Body,
    reference: &OrientedBox,
    face: usize,
    incident: &OrientedBox,
    reference_is_a: bool,
    out: &mut ContactBuffer,
) {
    let axis = reference.axes[face];
    let ref_normal = if (incident.center - reference.center).dot(axis) < 0.0 {
        -axis
    } else {
        axis
    };
    // Contact normals always point from B to A.
    let normal = if reference_is_a { -ref_normal } else { ref_normal };

    let mut polygon = incident_face(incident, ref_normal);
    for k in [(face + 1) % 3, (face + 2) % 3] {
        let side = reference.axes[k];
        let center = side.dot(reference.center);
        polygon = polygon.clip(side, center + reference.half[k]);
        polygon = polygon.clip(-side, -center + reference.half[k]);
        if polygon.is_empty() {
            return;
        }
    }

    let face_center = reference.center + ref_normal * reference.half[face];
    let mut candidates = Polygon::default();
    let mut depths = [0.0_f32; MAX_CLIP_VERTICES];
    for point in polygon.vertices() {
        let depth = ref_normal.dot(*point - face_center);
        if depth <= out.threshold() {
            depths[candidates.len] = depth;
            candidates.push(*point);
        }
    }

    let (chosen, count) = reduce(candidates.vertices(), &depths[..candidates.len], ref_normal);
    for &index in &chosen[..count] {
        let on_incident = candidates.points[index];
        let on_reference = on_incident - ref_normal * depths[index];
        let (point_a, point_b) = if reference_is_a {
            (on_reference, on_incident)
        } else {
            (on_incident, on_reference)
        };
        out.push(Contact::new(a.world(), b.world(), point_a, point_b, normal));
    }
}

/// Face of `incident` whose outward normal is most opposed to `ref_normal`.
fn incident_face(incident: &OrientedBox, ref_normal: Vec3) -> Polygon {
    let mut best = 0;
    let mut best_dot = 0.0_f32;
    for (j, axis) in incident.axes.iter().enumerate() {
        let d = axis.dot(ref_normal);
        if d.abs() > best_dot.abs() {
            best = j;
            best_dot = d;
        }
    }
    let face_normal = incident.axes[best] * -sign(best_dot);
    let center = incident.center + face_normal * incident.half[best];
    let u = incident.axes[(best + 1) % 3] * incident.half[(best + 1) % 3];
    let v = incident.axes[(best + 2) % 3] * incident.half[(best + 2) % 3];

    let mut polygon = Polygon::default();
    for vertex in [center + u + v, center - u + v, center - u - v, center + u - v] {
        polygon.push(vertex);
    }
    polygon
}

/// Picks at most four representative points: the deepest, the one farthest
/// from it, the one farthest from the line through both, and the one that
/// best widens the patch on the opposite side of that line.
fn reduce(points: &[Vec3], depths: &[f32], normal: Vec3) -> ([usize; MAX_MANIFOLD_POINTS], usize) {
    let mut chosen = [0; MAX_MANIFOLD_POINTS];
    if points.len() <= MAX_MANIFOLD_POINTS {
        for (slot, index) in chosen.iter_mut().zip(0..points.len()) {
            *slot = index;
        }
        return (chosen, points.len());
    }
    let argmax = |score: &dyn Fn(usize) -> f32| -> usize {
        (0..points.len())
            .map(|i| (i, score(i)))
            .fold((0, f32::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best })
            .0
    };

    let first = argmax(&|i| -depths[i]);
    let p0 = points[first];
    let second = argmax(&|i| (points[i] - p0).length_squared());
    let edge = points[second] - p0;
    let side = |i: usize| (points[i] - p0).cross(edge).dot(normal);
    let third = argmax(&|i| side(i).abs());
    let opposite = -sign(side(third));
    let fourth = argmax(&|i| opposite * side(i));

    let mut count = 0;
    for index in [first, second, third] {
        if !chosen[..count].contains(&index) {
            chosen[count] = index;
            count += 1;
        }
    }
    if opposite * side(fourth) > 0.0 && !chosen[..count].contains(&fourth) {
        chosen[count] = fourth;
        count += 1;
    }
    (chosen, count)
}

/// Single contact at the closest points of the two edges that define `edge`.
fn edge_contact(
    a: &Body,
    b: &Body,
    box_a: &OrientedBox,
    box_b: &OrientedBox,
    offset: Vec3,
    edge: &EdgeAxis,
    out: &mut ContactBuffer,
) {
    // Orient the axis from A toward B.
    let axis = if edge.axis.dot(offset) < 0.0 { -edge.axis } else { edge.axis };

    let mut on_a = box_a.center;
    let mut on_b = box_b.center;
    for k in 0..3 {
        if k != edge.edge_a {
            on_a += box_a.axes[k] * (box_a.half[k] * sign(box_a.axes[k].dot(axis)));
        }
        if k != edge.edge_b {
            on_b -= box_b.axes[k] * (box_b.half[k] * sign(box_b.axes[k].dot(axis)));
        }
    }

    let dir_a = box_a.axes[edge.edge_a];
    let dir_b = box_b.axes[edge.edge_b];
    let limit_a = box_a.half[edge.edge_a];
    let limit_b = box_b.half[edge.edge_b];

    let r = on_a - on_b;
    let cos = dir_a.dot(dir_b);
    let c = dir_a.dot(r);
    let f = dir_b.dot(r);
    let denom = 1.0 - cos * cos;
    let mut s = if denom > f32::EPSILON {
        ((cos * f - c) / denom).clamp(-limit_a, limit_a)
    } else {
        0.0
    };
    let t = (cos * s + f).clamp(-limit_b, limit_b);
    s = (cos * t - c).clamp(-limit_a, limit_a);

    out.push(Contact::new(
        a.world(),
        b.world(),
        on_a + dir_a * s,
        on_b + dir_b * t,
        -axis,
    ));
}

/// Small convex polygon held inline.
#[derive(Copy, Clone, Debug)]
struct Polygon {
    points: [Vec3; MAX_CLIP_VERTICES],
    len: usize,
}

impl Default for Polygon {
    fn default() -> Self {
        Self {
            points: [Vec3::ZERO; MAX_CLIP_VERTICES],
            len: 0,
        }
    }
}

impl Polygon {
    fn push(&mut self, point: Vec3) {
        if self.len < MAX_CLIP_VERTICES {
            self.points[self.len] = point;
            self.len += 1;
        }
    }

    fn vertices(&self) -> &[Vec3] {
        &self.points[..self.len]
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keeps the part of the polygon where `normal · p <= offset`.
    fn clip(&self, normal: Vec3, offset: f32) -> Self {
        let mut clipped = Self::default();
        for (k, &p) in self.vertices().iter().enumerate() {
            let q = self.points[(k + 1) % self.len];
            let dp = normal.dot(p) - offset;
            let dq = normal.dot(q) - offset;
            if dp <= 0.0 {
                clipped.push(p);
            }
            if (dp < 0.0 && dq > 0.0) || (dp > 0.0 && dq < 0.0) {
                clipped.push(p + (q - p) * (dp / (dp - dq)));
            }
        }
        clipped
    }
}
