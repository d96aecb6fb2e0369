//! Render state passed explicitly to every drawing operation

use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix3, Matrix4};
use skyglass_core::{Result, Transform3D};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::lighting::{Light, MaterialPresets};
use crate::modes::{DisplayMode, TextureMode};
use crate::transform_stack::TransformStack;

/// Camera, light, materials, modes and the model transform for one viewer.
///
/// The model transform does not include the view; shaders receive the view
/// and projection matrices separately.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub camera: Camera,
    home_camera: Camera,
    pub light: Light,
    pub materials: MaterialPresets,
    pub texture_mode: TextureMode,
    pub display_mode: DisplayMode,
    /// Mesh rotation about the Y axis, degrees in (-360, 360)
    pub model_rotation_deg: f32,
    model: Matrix4<f32>,
    stack: TransformStack,
}

impl RenderContext {
    pub fn new(camera: Camera, light: Light) -> Self {
        Self {
            home_camera: camera.clone(),
            camera,
            light,
            materials: MaterialPresets::default(),
            texture_mode: TextureMode::default(),
            display_mode: DisplayMode::default(),
            model_rotation_deg: 0.0,
            model: Matrix4::identity(),
            stack: TransformStack::new(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let aspect = config.window_width as f32 / config.window_height as f32;
        let mut context = Self::new(Camera::from_config(&config.camera, aspect), config.light);
        context.texture_mode = config.texture_mode;
        context.display_mode = config.display_mode;
        context
    }

    /// Current model transform
    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    /// Save a copy of the current model transform
    pub fn push_model(&mut self) -> Result<()> {
        self.stack.push(&self.model)
    }

    /// Restore the most recently saved model transform
    pub fn pop_model(&mut self) -> Result<()> {
        self.model = self.stack.pop()?;
        Ok(())
    }

    /// Post-multiply the model transform by a rotation about Y
    pub fn rotate_model_y(&mut self, degrees: f32) {
        self.model *= Transform3D::rotation_y(degrees.to_radians()).matrix;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.camera.projection_matrix()
    }

    /// Inverse-transpose of the upper 3x3 of the model transform.
    /// A singular transform yields the identity.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let upper: Matrix3<f32> = self.model.fixed_view::<3, 3>(0, 0).into_owned();
        upper
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::identity)
    }

    /// Snapshot of everything the shaders need for this frame.
    /// `clip_correction` is applied on top of the camera projection.
    pub fn frame_uniforms(&self, clip_correction: &Matrix4<f32>) -> FrameUniforms {
        let normal = self.normal_matrix();
        let column = |i: usize| [normal[(0, i)], normal[(1, i)], normal[(2, i)], 0.0];

        FrameUniforms {
            model: self.model.into(),
            view: self.view_matrix().into(),
            projection: (clip_correction * self.projection_matrix()).into(),
            normal: [column(0), column(1), column(2)],
            eye_position: self.camera.position.coords.into(),
            texture_mode: self.texture_mode.shader_index(),
        }
    }

    /// Put the camera and mesh rotation back where they started
    pub fn reset_view(&mut self) {
        self.camera = Camera {
            aspect_ratio: self.camera.aspect_ratio,
            ..self.home_camera.clone()
        };
        self.model_rotation_deg = 0.0;
    }

    /// One-line summary of the interactive state
    pub fn status_line(&self) -> String {
        format!(
            "rotation {:.0}°, eye z {:.2}, {} / {}",
            self.model_rotation_deg, self.camera.position.z, self.texture_mode, self.display_mode
        )
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// GPU layout of the per-frame uniforms (256 bytes, WGSL `FrameUniforms`)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// `mat3x3<f32>` columns, each padded to 16 bytes
    pub normal: [[f32; 4]; 3],
    pub eye_position: [f32; 3],
    pub texture_mode: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use skyglass_core::Error;

    #[test]
    fn test_push_rotate_pop_restores_model() {
        let mut ctx = RenderContext::default();
        ctx.push_model().unwrap();
        ctx.rotate_model_y(90.0);
        assert_ne!(*ctx.model_matrix(), Matrix4::identity());

        ctx.pop_model().unwrap();
        assert_eq!(*ctx.model_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_unbalanced_pop_underflows() {
        let mut ctx = RenderContext::default();
        assert!(matches!(ctx.pop_model(), Err(Error::StackUnderflow)));
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_rotation() {
        let mut ctx = RenderContext::default();
        ctx.rotate_model_y(30.0);
        let expected: Matrix3<f32> = ctx.model_matrix().fixed_view::<3, 3>(0, 0).into_owned();
        assert_relative_eq!(ctx.normal_matrix(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_matrix_of_singular_model_is_identity() {
        let mut ctx = RenderContext::default();
        ctx.model = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 0.0, 1.0));
        assert_eq!(ctx.normal_matrix(), Matrix3::identity());
    }

    #[test]
    fn test_frame_uniforms_layout_and_contents() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 256);

        let mut ctx = RenderContext::default();
        ctx.texture_mode = TextureMode::Phong;
        let uniforms = ctx.frame_uniforms(&Matrix4::identity());

        assert_eq!(uniforms.texture_mode, 2);
        assert_eq!(uniforms.eye_position, [0.0, 0.0, 11.0]);
        assert_eq!(uniforms.model, <[[f32; 4]; 4]>::from(Matrix4::<f32>::identity()));
        assert_eq!(uniforms.normal[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reset_view_keeps_aspect() {
        let mut ctx = RenderContext::default();
        ctx.camera.set_viewport(200, 100);
        ctx.camera.orbit_y(0.5);
        ctx.model_rotation_deg = 45.0;

        ctx.reset_view();
        assert_eq!(ctx.camera.position, Point3::new(0.0, 0.0, 11.0));
        assert_eq!(ctx.camera.aspect_ratio, 2.0);
        assert_eq!(ctx.model_rotation_deg, 0.0);
    }
}
