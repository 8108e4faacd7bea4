//! A torus around the local z axis.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{solve_quartic, Ray};

/// Ring of tube radius `radius_inner` whose centre circle has radius
/// `radius_outer`, lying in the xy plane. A single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    ri: f32,
    ro: f32,
    ri2: f32,
    ro2: f32,
}

impl Torus {
    /// Create a torus. Negative radii are clamped to zero.
    pub fn new(radius_inner: f32, radius_outer: f32) -> Self {
        let ri = radius_inner.max(0.0);
        let ro = radius_outer.max(0.0);
        Self {
            ri,
            ro,
            ri2: ri * ri,
            ro2: ro * ro,
        }
    }

    pub fn radius_inner(&self) -> f32 {
        self.ri
    }

    pub fn radius_outer(&self) -> f32 {
        self.ro
    }
}

impl Default for Torus {
    fn default() -> Self {
        Self::new(0.25, 1.0)
    }
}

impl PrimitiveList for Torus {
    fn num_primitives(&self) -> usize {
        1
    }

    fn primitive_bound(&self, _id: usize, edge_index: usize) -> f32 {
        match edge_index {
            0 | 2 => -self.ro - self.ri,
            1 | 3 => self.ro + self.ri,
            4 => -self.ri,
            5 => self.ri,
            _ => 0.0,
        }
    }

    fn intersect_primitive(&self, ray: &mut Ray, _id: usize, state: &mut IntersectionState) {
        let o = ray.origin.as_dvec3();
        let d = ray.direction.as_dvec3();
        let ri2 = self.ri2 as f64;
        let ro2 = self.ro2 as f64;

        let alpha = d.length_squared();
        let beta = 2.0 * o.dot(d);
        let gamma = o.length_squared() - ri2 - ro2;
        let roots = solve_quartic(
            alpha * alpha,
            2.0 * alpha * beta,
            beta * beta + 2.0 * alpha * gamma + 4.0 * ro2 * d.z * d.z,
            2.0 * beta * gamma + 8.0 * ro2 * o.z * d.z,
            gamma * gamma + 4.0 * ro2 * o.z * o.z - 4.0 * ro2 * ri2,
        );
        let t = roots.as_slice();
        let (Some(&first), Some(&last)) = (t.first(), t.last()) else {
            return;
        };
        // early rejection
        if first >= ray.max() as f64 || last <= ray.min() as f64 {
            return;
        }
        if let Some(&hit) = t.iter().find(|&&t| t > ray.min() as f64) {
            let hit = hit as f32;
            if hit < ray.max() {
                ray.set_max(hit);
                state.set_intersection(0, 0.0, 0.0);
            }
        }
    }
}
