//! Indexed triangle meshes.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{BoundingBox, Mat4, Ray, TransformExt, Vec3};

/// A mesh of vertex positions and triangle indices (every 3 indices form a
/// triangle). Triangle `i` is primitive `i`; the reported `(u, v)` are its
/// barycentric coordinates.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex positions (one Vec3 per vertex)
    positions: Vec<Vec3>,

    /// Triangle indices
    indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    bounds: BoundingBox,
}

impl TriangleMesh {
    /// Create a mesh.
    ///
    /// Trailing indices that do not form a full triangle are ignored, and
    /// triangles referring to a missing vertex are dropped with a warning.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let vertex_count = positions.len();
        let total = indices.len() / 3;
        let indices: Vec<u32> = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
            .flatten()
            .copied()
            .collect();
        let kept = indices.len() / 3;
        if kept < total {
            log::warn!(
                "Triangle mesh: dropped {} of {} triangles with vertex indices out of range (vertex count {})",
                total - kept,
                total,
                vertex_count
            );
        }

        let mut bounds = BoundingBox::EMPTY;
        for p in &positions {
            bounds.include_point(*p);
        }
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Closed cube of side `size` centered at the origin, 12 triangles.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { -h } else { h },
                    if i & 2 == 0 { -h } else { h },
                    if i & 4 == 0 { -h } else { h },
                )
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self::new(positions, indices)
    }

    /// Get the triangle count.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The three corners of triangle `id`.
    #[inline]
    pub fn vertices(&self, id: usize) -> [Vec3; 3] {
        let i = id * 3;
        [
            self.positions[self.indices[i] as usize],
            self.positions[self.indices[i + 1] as usize],
            self.positions[self.indices[i + 2] as usize],
        ]
    }

    /// Unit geometric normal of triangle `id` (zero for degenerate triangles).
    pub fn normal(&self, id: usize) -> Vec3 {
        let [v0, v1, v2] = self.vertices(id);
        (v1 - v0).cross(v2 - v0).normalize_or_zero()
    }
}

impl PrimitiveList for TriangleMesh {
    fn num_primitives(&self) -> usize {
        self.triangle_count()
    }

    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32 {
        let [v0, v1, v2] = self.vertices(id);
        let axis = edge_index >> 1;
        if edge_index & 1 == 0 {
            v0[axis].min(v1[axis]).min(v2[axis])
        } else {
            v0[axis].max(v1[axis]).max(v2[axis])
        }
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        let [v0, v1, v2] = self.vertices(id);
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle (or triangle is degenerate)
        if a.abs() < 1e-8 {
            return;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return;
        }

        let t = f * edge2.dot(q);
        if t > ray.min() && t < ray.max() {
            ray.set_max(t);
            state.set_intersection(id, u, v);
        }
    }

    fn world_bounds(&self, local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        Some(match local_to_world {
            Some(m) => m.transform_bounds(&self.bounds),
            None => self.bounds,
        })
    }
}
