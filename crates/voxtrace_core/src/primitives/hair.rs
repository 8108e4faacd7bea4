//! Hair: strands of straight segments rendered as camera-facing ribbons.

use crate::{IntersectionState, PrimitiveList};
use voxtrace_math::{BoundingBox, Mat4, Ray, TransformExt, Vec3};

/// Strand width, shared by every vertex or given per vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum HairWidths {
    Constant(f32),
    PerVertex(Vec<f32>),
}

/// A set of strands with the same number of segments each.
///
/// Strand `h` owns vertices `h * (segments + 1) ..= h * (segments + 1) + segments`
/// and each segment is one primitive. A hit records `v` as the position
/// along its segment, 0 at the root end and 1 at the tip end.
#[derive(Debug, Clone)]
pub struct Hair {
    segments: usize,
    points: Vec<Vec3>,
    widths: HairWidths,
}

impl Hair {
    /// Create hair from strand vertices.
    ///
    /// `segments` below one is raised to one. Trailing vertices that do not
    /// make up a whole strand are dropped, and per-vertex widths that do
    /// not match the vertex count fall back to their first value.
    pub fn new(segments: usize, mut points: Vec<Vec3>, widths: HairWidths) -> Self {
        if segments == 0 {
            log::warn!("Hair: invalid number of segments 0, using 1");
        }
        let segments = segments.max(1);
        let stride = segments + 1;
        let partial = points.len() % stride;
        if partial != 0 {
            log::warn!(
                "Hair: dropping {} trailing vertices that do not form a strand of {} segments",
                partial,
                segments
            );
            points.truncate(points.len() - partial);
        }
        let widths = match widths {
            HairWidths::PerVertex(w) if w.len() != points.len() => {
                log::warn!(
                    "Hair: {} widths for {} vertices, using a constant width",
                    w.len(),
                    points.len()
                );
                HairWidths::Constant(w.first().copied().unwrap_or(1.0))
            }
            other => other,
        };
        Self {
            segments,
            points,
            widths,
        }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn num_strands(&self) -> usize {
        self.points.len() / (self.segments + 1)
    }

    fn width(&self, vertex: usize) -> f32 {
        match &self.widths {
            HairWidths::Constant(w) => *w,
            HairWidths::PerVertex(w) => w[vertex],
        }
    }

    /// Index of the root-side vertex of segment `id`.
    fn first_vertex(&self, id: usize) -> usize {
        let strand = id / self.segments;
        let line = id % self.segments;
        strand * (self.segments + 1) + line
    }
}

impl PrimitiveList for Hair {
    fn num_primitives(&self) -> usize {
        self.segments * self.num_strands()
    }

    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32 {
        let vn = self.first_vertex(id);
        let axis = edge_index >> 1;
        let (p0, p1) = (self.points[vn][axis], self.points[vn + 1][axis]);
        let (h0, h1) = (0.5 * self.width(vn), 0.5 * self.width(vn + 1));
        if edge_index & 1 == 0 {
            (p0 - h0).min(p1 - h1)
        } else {
            (p0 + h0).max(p1 + h1)
        }
    }

    fn world_bounds(&self, local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        let mut bounds = BoundingBox::EMPTY;
        for (i, p) in self.points.iter().enumerate() {
            let half = Vec3::splat(0.5 * self.width(i));
            bounds.include_point(*p - half);
            bounds.include_point(*p + half);
        }
        Some(match local_to_world {
            Some(m) => m.transform_bounds(&bounds),
            None => bounds,
        })
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        let vn = self.first_vertex(id);
        let line = id % self.segments;
        let p0 = self.points[vn];
        let p1 = self.points[vn + 1];

        // plane through the segment, facing the ray as much as it can
        let v = p1 - p0;
        let n = ray.direction.cross(v).cross(v);
        let t = n.dot(p0 - ray.origin) / n.dot(ray.direction);
        if !ray.interval().surrounds(t) {
            return;
        }
        let p = ray.at(t);
        let q = v.dot(p - p0) / v.length_squared();
        let (closest, width, v_param) = if q <= 0.0 {
            // no rounded cap at the root
            if line == 0 {
                return;
            }
            (p0, self.width(vn), 0.0)
        } else if q >= 1.0 {
            (p1, self.width(vn + 1), 1.0)
        } else {
            let width = (1.0 - q) * self.width(vn) + q * self.width(vn + 1);
            (p0 + q * v, width, q)
        };
        if closest.distance_squared(p) < width * width * 0.25 {
            ray.set_max(t);
            state.set_intersection(id, 0.0, v_param);
        }
    }
}
