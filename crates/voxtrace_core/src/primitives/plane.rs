//! Infinite planes.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{BoundingBox, Mat4, Ray, Vec3};

/// An unbounded plane through `center` with normal `normal`.
///
/// It reports no finite bounds, so a scene keeps it in its infinite
/// instance list and tests it directly instead of through an accelerator.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    center: Vec3,
    normal: Vec3,
}

impl Plane {
    pub fn new(center: Vec3, normal: Vec3) -> Self {
        Self {
            center,
            normal: normal.normalize_or_zero(),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl PrimitiveList for Plane {
    fn num_primitives(&self) -> usize {
        1
    }

    fn primitive_bound(&self, _id: usize, edge_index: usize) -> f32 {
        if edge_index & 1 == 0 {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        }
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        let dn = self.normal.dot(ray.direction);
        if dn == 0.0 {
            return;
        }
        let t = self.normal.dot(self.center - ray.origin) / dn;
        if t > ray.min() && t < ray.max() {
            ray.set_max(t);
            state.set_intersection(id, 0.0, 0.0);
        }
    }

    fn world_bounds(&self, _local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        None
    }
}
