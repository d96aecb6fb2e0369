//! Point and vector types shared across the workspace

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A triangle as three 0-based vertex indices, in winding order
pub type Face = [usize; 3];
