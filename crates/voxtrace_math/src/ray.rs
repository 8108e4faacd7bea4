use crate::{Interval, Mat4, Vec3};

/// A ray in 3D space with origin, direction and a valid parametric range.
///
/// The range only ever shrinks: intersection code calls [`Ray::set_max`]
/// whenever a closer hit is found, which clips everything beyond it.
/// The direction is not required to be normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    t: Interval,
}

impl Ray {
    /// Create a ray valid over `[0, +inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_interval(origin, direction, Interval::FORWARD)
    }

    /// Create a ray valid over the given parametric range.
    pub fn with_interval(origin: Vec3, direction: Vec3, t: Interval) -> Self {
        Self {
            origin,
            direction,
            t,
        }
    }

    /// Ray from `from` to `to`, valid strictly between the two points.
    ///
    /// Both ends are pulled in slightly so shadow rays do not hit the
    /// surfaces they start and end on.
    pub fn segment(from: Vec3, to: Vec3) -> Self {
        Self::with_interval(from, to - from, Interval::new(1e-4, 1.0 - 1e-4))
    }

    /// Lower end of the valid range.
    #[inline]
    pub fn min(&self) -> f32 {
        self.t.min
    }

    /// Upper end of the valid range (distance to the closest hit so far).
    #[inline]
    pub fn max(&self) -> f32 {
        self.t.max
    }

    /// The whole valid range.
    #[inline]
    pub fn interval(&self) -> Interval {
        self.t
    }

    /// Clip the ray at `t`. Values beyond the current max are ignored.
    #[inline]
    pub fn set_max(&mut self, t: f32) {
        if t < self.t.max {
            self.t.max = t;
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The ray expressed in another space.
    ///
    /// The direction is transformed as a vector and deliberately left
    /// unnormalized, so a parametric distance means the same point in both
    /// spaces and the range carries over unchanged.
    pub fn transform(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
            t: self.t,
        }
    }
}
