// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds the bits instancing needs on top.

use crate::BoundingBox;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 used by instancing.
pub trait TransformExt {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners. Empty stays empty.
    fn transform_bounds(&self, bounds: &BoundingBox) -> BoundingBox;

    /// Inverse of the matrix, or `None` when it is singular or not finite.
    fn try_inverse(&self) -> Option<Mat4>;
}

impl TransformExt for Mat4 {
    fn transform_bounds(&self, bounds: &BoundingBox) -> BoundingBox {
        if bounds.is_empty() {
            return BoundingBox::EMPTY;
        }
        let lo = bounds.minimum;
        let hi = bounds.maximum;
        let mut out = BoundingBox::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            out.include_point(self.transform_point3(corner));
        }
        out
    }

    fn try_inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = self.inverse();
        if inv.is_finite() {
            Some(inv)
        } else {
            None
        }
    }
}
