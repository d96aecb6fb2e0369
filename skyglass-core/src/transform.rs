//! 3D transformation utilities

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D affine transformation stored as a homogeneous matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation about the Y axis, angle in radians
    pub fn rotation_y(angle: f32) -> Self {
        Self {
            matrix: Rotation3::from_axis_angle(&Vector3::y_axis(), angle).to_homogeneous(),
        }
    }

    /// Rotation about a vertical axis passing through `pivot`
    pub fn rotation_y_about(pivot: &Point3<f32>, angle: f32) -> Self {
        Self::translation(pivot.coords)
            * Self::rotation_y(angle)
            * Self::translation(-pivot.coords)
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this transformation with another (`other` is applied first)
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_y_quarter_turn() {
        let t = Transform3D::rotation_y(FRAC_PI_2);
        let p = t.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_about_pivot_keeps_pivot_fixed() {
        let pivot = Point3::new(2.0, 1.0, -3.0);
        let t = Transform3D::rotation_y_about(&pivot, 0.7);
        assert_relative_eq!(t.transform_point(&pivot), pivot, epsilon = 1e-5);

        let p = Point3::new(2.0, 5.0, 0.0);
        let moved = t.transform_point(&p);
        assert_relative_eq!((moved - pivot).norm(), (p - pivot).norm(), epsilon = 1e-5);
        assert_relative_eq!(moved.y, p.y, epsilon = 1e-6);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let t = Transform3D::translation(Vector3::new(1.0, 2.0, 3.0))
            * Transform3D::rotation_y(FRAC_PI_2);
        let p = t.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.0, 2.0, 3.0), epsilon = 1e-6);
    }
}
