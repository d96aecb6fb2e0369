//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use skyglass_core::Transform3D;

use crate::config::CameraConfig;

/// A look-at camera with a perspective projection
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Build a camera from configuration for a viewport of the given aspect
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self::new(
            Point3::from(config.eye),
            Point3::from(config.target),
            Vector3::from(config.up),
            config.fov_degrees.to_radians(),
            aspect_ratio,
            config.near,
            config.far,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix (OpenGL clip conventions, z in [-1, 1])
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Swing the eye around the target about the vertical axis
    pub fn orbit_y(&mut self, angle: f32) {
        let rotation = Transform3D::rotation_y_about(&self.target, angle);
        self.position = rotation.transform_point(&self.position);
    }

    /// Slide the eye along world Z without moving the target
    pub fn dolly_z(&mut self, distance: f32) {
        self.position.z += distance;
    }

    /// Update the aspect ratio from a viewport size; zero sizes are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1.0)
    }
}
