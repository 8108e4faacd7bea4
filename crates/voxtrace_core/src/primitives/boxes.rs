//! Axis-aligned box primitives.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{BoundingBox, Interval, Ray, Vec3};

/// A list of solid axis-aligned boxes.
///
/// The reported `(u, v)` are the hit point's coordinates across the struck
/// face, normalized to `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct BoxList {
    boxes: Vec<BoundingBox>,
}

impl BoxList {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    /// A single unit cube centered at the origin.
    pub fn unit_cube() -> Self {
        Self::new(vec![BoundingBox::from_points(
            Vec3::splat(-0.5),
            Vec3::splat(0.5),
        )])
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Face-local coordinates of a point on the surface of `b`.
    fn face_uv(b: &BoundingBox, p: Vec3) -> (f32, f32) {
        let e = b.extents();
        let rel = (p - b.minimum) / e;
        // The struck face is the one the point is closest to.
        let dist = (p - b.minimum).abs().min((b.maximum - p).abs());
        let axis = if dist.x <= dist.y && dist.x <= dist.z {
            0
        } else if dist.y <= dist.z {
            1
        } else {
            2
        };
        let (a, c) = match axis {
            0 => (rel.y, rel.z),
            1 => (rel.z, rel.x),
            _ => (rel.x, rel.y),
        };
        (Interval::new(0.0, 1.0).clamp(a), Interval::new(0.0, 1.0).clamp(c))
    }
}

impl PrimitiveList for BoxList {
    fn num_primitives(&self) -> usize {
        self.boxes.len()
    }

    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32 {
        self.boxes[id].edge(edge_index)
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        let b = &self.boxes[id];
        let unclipped = Ray::with_interval(ray.origin, ray.direction, Interval::UNIVERSE);
        let Some(span) = b.intersect_ray(&unclipped) else {
            return;
        };
        // Entering from outside hits the near face, starting inside hits the far one.
        let t = if span.min > ray.min() { span.min } else { span.max };
        if t > ray.min() && t < ray.max() {
            ray.set_max(t);
            let (u, v) = Self::face_uv(b, ray.at(t));
            state.set_intersection(id, u, v);
        }
    }
}
