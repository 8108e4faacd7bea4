use crate::{ulp, Interval, Ray, Vec3};

/// Axis-aligned bounding box given by its minimum and maximum corner.
///
/// A box with no points included yet is empty: `minimum` is `+inf` and
/// `maximum` is `-inf` on every axis, so the first inclusion sets both
/// corners. Once anything has been included `minimum <= maximum` holds
/// componentwise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl BoundingBox {
    /// Static constants
    pub const EMPTY: BoundingBox = BoundingBox {
        minimum: Vec3::INFINITY,
        maximum: Vec3::NEG_INFINITY,
    };

    /// Create an empty box (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create a box holding a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self {
            minimum: p,
            maximum: p,
        }
    }

    /// Create a box from two corner points given in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            minimum: a.min(b),
            maximum: a.max(b),
        }
    }

    /// Grow the box to contain `p`.
    pub fn include_point(&mut self, p: Vec3) {
        self.minimum = self.minimum.min(p);
        self.maximum = self.maximum.max(p);
    }

    /// Grow the box to contain `other`. Including an empty box is a no-op.
    pub fn include_box(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.minimum = self.minimum.min(other.minimum);
        self.maximum = self.maximum.max(other.maximum);
    }

    /// Create a box that surrounds two other boxes.
    pub fn surrounding(a: &BoundingBox, b: &BoundingBox) -> BoundingBox {
        let mut out = *a;
        out.include_box(b);
        out
    }

    /// True if nothing has been included yet.
    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x
            || self.minimum.y > self.maximum.y
            || self.minimum.z > self.maximum.z
    }

    /// True if both corners are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.minimum.is_finite() && self.maximum.is_finite()
    }

    /// Size of the box along each axis.
    pub fn extents(&self) -> Vec3 {
        self.maximum - self.minimum
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.minimum).all() && p.cmple(self.maximum).all()
    }

    /// One of the six scalar bounds, addressed as `axis * 2 + {0 = min, 1 = max}`.
    #[inline]
    pub fn edge(&self, edge_index: usize) -> f32 {
        let axis = edge_index >> 1;
        if edge_index & 1 == 0 {
            self.minimum[axis]
        } else {
            self.maximum[axis]
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, axis: usize) -> Interval {
        Interval::new(self.minimum[axis], self.maximum[axis])
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let e = self.extents();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Push every bound outward by at least one unit in the last place.
    ///
    /// Primitives lying exactly on the outer faces would otherwise be
    /// rounded out of the grid lattice.
    pub fn enlarge_ulps(&mut self) {
        const EPS: f32 = 0.0001;
        for axis in 0..3 {
            let lo = self.minimum[axis];
            let hi = self.maximum[axis];
            self.minimum[axis] = lo - EPS.max(ulp(lo));
            self.maximum[axis] = hi + EPS.max(ulp(hi));
        }
    }

    /// Slab test against the ray's current valid range.
    ///
    /// Returns the parametric range over which the ray is inside the box,
    /// or `None` when that range is empty. A ray touching the box in a single
    /// point (`min == max`) counts as a hit. Zero direction components rely
    /// on IEEE division giving a signed infinity.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Interval> {
        let mut t = ray.interval();
        for axis in 0..3 {
            let inv_dir = 1.0 / ray.direction[axis];
            let o = ray.origin[axis];
            let t1 = (self.minimum[axis] - o) * inv_dir;
            let t2 = (self.maximum[axis] - o) * inv_dir;
            if inv_dir > 0.0 {
                if t1 > t.min {
                    t.min = t1;
                }
                if t2 < t.max {
                    t.max = t2;
                }
            } else {
                if t2 > t.min {
                    t.min = t2;
                }
                if t1 < t.max {
                    t.max = t1;
                }
            }
            if t.min > t.max {
                return None;
            }
        }
        Some(t)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            self.minimum.x,
            self.minimum.y,
            self.minimum.z,
            self.maximum.x,
            self.maximum.y,
            self.maximum.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> BoundingBox {
        BoundingBox::from_points(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    #[test]
    fn test_empty_box() {
        let b = BoundingBox::empty();
        assert!(b.is_empty());
        assert_eq!(b.minimum, Vec3::splat(f32::INFINITY));
        assert_eq!(b.maximum, Vec3::splat(f32::NEG_INFINITY));
        assert!(!b.contains(Vec3::ZERO));
    }

    #[test]
    fn test_first_include_sets_both_corners() {
        let mut b = BoundingBox::empty();
        b.include_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.minimum, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.maximum, Vec3::new(1.0, 2.0, 3.0));

        b.include_point(Vec3::new(-1.0, 5.0, 0.0));
        assert_eq!(b.minimum, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.maximum, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn test_surrounding_ignores_empty() {
        let a = unit_cube();
        let s = BoundingBox::surrounding(&a, &BoundingBox::empty());
        assert_eq!(s, a);

        let b = BoundingBox::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let s = BoundingBox::surrounding(&a, &b);
        assert_eq!(s.minimum, Vec3::splat(-0.5));
        assert_eq!(s.maximum, Vec3::splat(10.0));
    }

    #[test]
    fn test_edges() {
        let b = BoundingBox::from_points(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        let edges: Vec<f32> = (0..6).map(|i| b.edge(i)).collect();
        assert_eq!(edges, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_enlarge_ulps_grows_every_bound() {
        let mut b = BoundingBox::from_points(Vec3::ZERO, Vec3::new(1e6, 1.0, 0.0));
        let before = b;
        b.enlarge_ulps();
        for axis in 0..3 {
            assert!(b.minimum[axis] < before.minimum[axis]);
            assert!(b.maximum[axis] > before.maximum[axis]);
        }
    }

    #[test]
    fn test_longest_axis() {
        let b = BoundingBox::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(b.longest_axis(), 1);
    }

    #[test]
    fn test_slab_hit_and_miss() {
        let b = unit_cube();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = b.intersect_ray(&ray).unwrap();
        assert!((t.min - 4.5).abs() < 1e-6);
        assert!((t.max - 5.5).abs() < 1e-6);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.intersect_ray(&away).is_none());

        let beside = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(b.intersect_ray(&beside).is_none());
    }

    #[test]
    fn test_slab_respects_ray_range() {
        let b = unit_cube();
        let mut ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        ray.set_max(4.0);
        assert!(b.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_slab_grazing_corner_is_a_hit() {
        // Touches the box only at the corner (0.5, 0.5, 0.5)
        let b = unit_cube();
        let ray = Ray::new(Vec3::new(-0.5, 1.5, 0.5), Vec3::new(1.0, -1.0, 0.0));
        let t = b.intersect_ray(&ray).unwrap();
        assert_eq!(t.min, t.max);
        assert!((t.min - 1.0).abs() < 1e-6);
    }
}
