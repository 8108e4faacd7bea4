//! Math types shared by the voxtrace core and renderer.
//!
//! Re-exports glam for vectors and matrices and adds the ray-tracing
//! specific types: parametric intervals, bounding boxes, clipped rays,
//! and the polynomial root solvers used by implicit surfaces.

// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod interval;
mod ray;
mod solvers;
mod transform;

pub use bounds::BoundingBox;
pub use interval::Interval;
pub use ray::Ray;
pub use solvers::{solve_cubic, solve_quadratic, solve_quartic, Roots};
pub use transform::TransformExt;

/// Distance to the next representable `f32` above `|x|`.
///
/// Non-finite inputs are returned unchanged.
#[inline]
pub fn ulp(x: f32) -> f32 {
    if !x.is_finite() {
        return x;
    }
    let a = x.abs();
    if a == f32::MAX {
        return a - f32::from_bits(a.to_bits() - 1);
    }
    f32::from_bits(a.to_bits() + 1) - a
}
