//! Ray intersection acceleration structures.
//!
//! Every structure is built once from a fixed [`PrimitiveList`] and then
//! queried concurrently: `intersect` takes `&self` and keeps all per-ray
//! data in the ray and the caller's [`IntersectionState`].

mod bvh;
mod grid;
mod null;

pub use bvh::Bvh;
pub use grid::{GridStats, UniformGrid, MAX_RESOLUTION};
pub use null::NullAccelerator;

use crate::{AccelError, IntersectionState, PrimitiveList};
use std::sync::Arc;
use voxtrace_math::Ray;

/// A query structure over a primitive list.
pub trait AccelerationStructure: Send + Sync {
    /// Build over `primitives`, replacing anything built before.
    ///
    /// On error the structure is left empty and every query misses.
    fn build(&mut self, primitives: Arc<dyn PrimitiveList>) -> Result<(), AccelError>;

    /// Find the closest hit along `ray`.
    ///
    /// Results are observed through `state` (and the clipped `ray.max()`).
    fn intersect(&self, ray: &mut Ray, state: &mut IntersectionState);

    /// Symbolic name, as accepted by [`create`].
    fn name(&self) -> &'static str;
}

/// Primitive count up to which `auto` picks a linear list.
const AUTO_NULL_MAX: usize = 2;

/// Primitive count from which `auto` prefers a tree over the grid.
const AUTO_BVH_MIN: usize = 2_000_000;

/// Create an unbuilt accelerator by name for roughly `n` primitives.
///
/// Recognized names are `"null"`, `"uniformgrid"`, `"bvh"` and `"auto"`;
/// anything else falls back to `"auto"` with a warning.
pub fn create(name: &str, n: usize) -> Box<dyn AccelerationStructure> {
    let resolved = match name {
        "null" | "uniformgrid" | "bvh" => name,
        "auto" => auto_name(n),
        other => {
            log::warn!("Unrecognized intersection accelerator \"{}\", using auto", other);
            auto_name(n)
        }
    };
    match resolved {
        "null" => Box::new(NullAccelerator::new()),
        "bvh" => Box::new(Bvh::new()),
        _ => Box::new(UniformGrid::new()),
    }
}

fn auto_name(n: usize) -> &'static str {
    if n <= AUTO_NULL_MAX {
        "null"
    } else if n < AUTO_BVH_MIN {
        "uniformgrid"
    } else {
        "bvh"
    }
}
