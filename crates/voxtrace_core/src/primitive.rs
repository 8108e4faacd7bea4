//! The capability accelerators query: anything made of numbered primitives.

use crate::IntersectionState;
use voxtrace_math::{BoundingBox, Mat4, Ray, TransformExt, Vec3};

/// A list of intersectable primitives addressed by id `0..num_primitives()`.
///
/// Implemented by the concrete geometry kinds and by [`crate::InstanceList`],
/// which presents every scene instance as one primitive of the top level.
/// Accelerators only ever talk to geometry through this trait, so new kinds
/// can be added without touching them.
pub trait PrimitiveList: Send + Sync {
    /// Number of primitives in the list.
    fn num_primitives(&self) -> usize;

    /// One of the six scalar bounds of primitive `id`, addressed as
    /// `axis * 2 + {0 = min, 1 = max}`.
    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32;

    /// Exact intersection test against primitive `id`.
    ///
    /// On finding a hit closer than `ray.max()` (and beyond `ray.min()`) an
    /// implementation must call `ray.set_max(t)` and then
    /// `state.set_intersection(id, u, v)`. This is the only place allowed to
    /// clip the ray or record a hit.
    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState);

    /// Bounds of the whole list, optionally transformed to world space.
    ///
    /// `None` means the list is unbounded and cannot be put into a finite
    /// accelerator. The default unions the per-primitive bounds.
    fn world_bounds(&self, local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        let mut bounds = BoundingBox::EMPTY;
        for id in 0..self.num_primitives() {
            bounds.include_box(&primitive_bounds(self, id));
        }
        Some(match local_to_world {
            Some(m) => m.transform_bounds(&bounds),
            None => bounds,
        })
    }
}

/// Gather the six scalar bounds of one primitive into a box.
pub fn primitive_bounds<P: PrimitiveList + ?Sized>(list: &P, id: usize) -> BoundingBox {
    BoundingBox::from_points(
        Vec3::new(
            list.primitive_bound(id, 0),
            list.primitive_bound(id, 2),
            list.primitive_bound(id, 4),
        ),
        Vec3::new(
            list.primitive_bound(id, 1),
            list.primitive_bound(id, 3),
            list.primitive_bound(id, 5),
        ),
    )
}
