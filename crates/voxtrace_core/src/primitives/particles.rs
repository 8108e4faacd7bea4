//! Particle clouds: many spheres sharing one radius.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{Ray, Vec3};

/// A set of spheres of equal radius, one primitive per particle.
#[derive(Debug, Clone)]
pub struct ParticleSurface {
    centers: Vec<Vec3>,
    radius: f32,
    r2: f32,
}

impl ParticleSurface {
    /// Create a particle surface. Negative radii are clamped to zero.
    pub fn new(centers: Vec<Vec3>, radius: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            centers,
            radius,
            r2: radius * radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self, id: usize) -> Vec3 {
        self.centers[id]
    }
}

/// Real roots of `a t^2 + b t + c`, ascending.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    // Avoids cancellation between -b and the root
    let q = if b < 0.0 {
        -0.5 * (b - disc.sqrt())
    } else {
        -0.5 * (b + disc.sqrt())
    };
    let t0 = q / a;
    let t1 = if q != 0.0 { c / q } else { t0 };
    Some(if t0 <= t1 { (t0, t1) } else { (t1, t0) })
}

impl PrimitiveList for ParticleSurface {
    fn num_primitives(&self) -> usize {
        self.centers.len()
    }

    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32 {
        let c = self.centers[id][edge_index >> 1];
        if edge_index & 1 == 0 {
            c - self.radius
        } else {
            c + self.radius
        }
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        let oc = ray.origin - self.centers[id];
        let qa = ray.direction.length_squared();
        let qb = 2.0 * ray.direction.dot(oc);
        let qc = oc.length_squared() - self.r2;
        let Some((t0, t1)) = solve_quadratic(qa, qb, qc) else {
            return;
        };
        // early rejection
        if t0 >= ray.max() || t1 <= ray.min() {
            return;
        }
        let t = if t0 > ray.min() { t0 } else { t1 };
        if t < ray.max() {
            ray.set_max(t);
            state.set_intersection(id, 0.0, 0.0);
        }
    }
}
