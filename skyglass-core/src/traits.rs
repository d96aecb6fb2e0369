//! Core traits for skyglass

use crate::{mesh::*, point::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the axis-aligned bounding box of the object as `(min, max)`
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Radius of the sphere around [`center`](Self::center) enclosing the bounds
    fn bounding_radius(&self) -> f32 {
        let (min, max) = self.bounding_box();
        (max - min).norm() * 0.5
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let vertices = self.vertices();
        if vertices.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = vertices[0];
        let mut max = vertices[0];

        for vertex in vertices {
            min = min.inf(vertex);
            max = max.sup(vertex);
        }

        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box_of_empty_mesh() {
        let mesh = TriangleMesh::new();
        assert_eq!(mesh.bounding_box(), (Point3f::origin(), Point3f::origin()));
        assert_eq!(mesh.bounding_radius(), 0.0);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, 0.0, 2.0),
                Point3f::new(3.0, -2.0, 0.0),
                Point3f::new(1.0, 4.0, 1.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3f::new(3.0, 4.0, 2.0));
        assert_eq!(mesh.center(), Point3f::new(1.0, 1.0, 1.0));
        assert_relative_eq!(mesh.bounding_radius(), (16.0f32 + 36.0 + 4.0).sqrt() * 0.5);
    }
}
