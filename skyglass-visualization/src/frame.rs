//! Per-frame draw planning
//!
//! A frame is described as a list of [`DrawCommand`]s built from the
//! display mode, then handed to a [`FrameRenderer`]. Keeping the plan
//! separate from the GPU lets it be checked without a device.

use skyglass_core::Result;

use crate::context::RenderContext;
use crate::lighting::MaterialKind;

/// One draw call in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    /// Filled mesh triangles with the given material
    DrawTriangles { material: MaterialKind },
    /// Deduplicated mesh edges as lines with the given material
    DrawEdges { material: MaterialKind },
    /// The environment cube
    DrawSkybox,
}

/// Ordered draw calls for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePlan {
    pub commands: Vec<DrawCommand>,
}

impl FramePlan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }
}

/// Build the draw list for the current display mode. Nothing is drawn
/// until both the mesh and the skybox are ready.
pub fn plan_frame(ctx: &RenderContext, mesh_ready: bool, skybox_ready: bool) -> FramePlan {
    if !mesh_ready || !skybox_ready {
        return FramePlan::default();
    }

    let mut commands = Vec::with_capacity(3);
    let mode = ctx.display_mode;

    if mode.draws_triangles() {
        commands.push(DrawCommand::DrawTriangles {
            material: MaterialKind::Surface,
        });
    }
    if mode.draws_edges() {
        // Black edges over filled triangles, white ones on their own
        let material = if mode.draws_triangles() {
            MaterialKind::EdgeBlack
        } else {
            MaterialKind::EdgeWhite
        };
        commands.push(DrawCommand::DrawEdges { material });
    }
    commands.push(DrawCommand::DrawSkybox);

    FramePlan { commands }
}

/// Something that can execute a [`FramePlan`]
pub trait FrameRenderer {
    fn render(&mut self, ctx: &RenderContext, plan: &FramePlan) -> Result<()>;
}

/// Plan and render one frame with the mesh rotation applied to the model
/// transform. The transform is restored even when rendering fails.
pub fn draw_frame<R: FrameRenderer + ?Sized>(
    ctx: &mut RenderContext,
    renderer: &mut R,
    mesh_ready: bool,
    skybox_ready: bool,
) -> Result<FramePlan> {
    ctx.push_model()?;
    ctx.rotate_model_y(ctx.model_rotation_deg);

    let plan = plan_frame(ctx, mesh_ready, skybox_ready);
    let rendered = if plan.is_empty() {
        Ok(())
    } else {
        renderer.render(ctx, &plan)
    };

    ctx.pop_model()?;
    rendered.map(|()| plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::DisplayMode;
    use nalgebra::Matrix4;
    use skyglass_core::Error;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(Matrix4<f32>, FramePlan)>,
        fail: bool,
    }

    impl FrameRenderer for RecordingRenderer {
        fn render(&mut self, ctx: &RenderContext, plan: &FramePlan) -> Result<()> {
            self.frames.push((*ctx.model_matrix(), plan.clone()));
            if self.fail {
                return Err(Error::Gpu("surface lost".to_string()));
            }
            Ok(())
        }
    }

    fn context_with(mode: DisplayMode) -> RenderContext {
        let mut ctx = RenderContext::default();
        ctx.display_mode = mode;
        ctx
    }

    #[test]
    fn test_polygon_plan() {
        let plan = plan_frame(&context_with(DisplayMode::Polygon), true, true);
        assert_eq!(
            plan.commands,
            vec![
                DrawCommand::DrawTriangles { material: MaterialKind::Surface },
                DrawCommand::DrawSkybox,
            ]
        );
    }

    #[test]
    fn test_wire_poly_plan() {
        let plan = plan_frame(&context_with(DisplayMode::WirePoly), true, true);
        assert_eq!(
            plan.commands,
            vec![
                DrawCommand::DrawTriangles { material: MaterialKind::Surface },
                DrawCommand::DrawEdges { material: MaterialKind::EdgeBlack },
                DrawCommand::DrawSkybox,
            ]
        );
    }

    #[test]
    fn test_wireframe_plan() {
        let plan = plan_frame(&context_with(DisplayMode::Wireframe), true, true);
        assert_eq!(
            plan.commands,
            vec![
                DrawCommand::DrawEdges { material: MaterialKind::EdgeWhite },
                DrawCommand::DrawSkybox,
            ]
        );
    }

    #[test]
    fn test_nothing_drawn_until_ready() {
        let ctx = RenderContext::default();
        assert!(plan_frame(&ctx, false, true).is_empty());
        assert!(plan_frame(&ctx, true, false).is_empty());
        assert!(plan_frame(&ctx, false, false).is_empty());
    }

    #[test]
    fn test_draw_frame_applies_rotation_then_restores() {
        let mut ctx = RenderContext::default();
        ctx.model_rotation_deg = 90.0;
        let mut renderer = RecordingRenderer::default();

        let plan = draw_frame(&mut ctx, &mut renderer, true, true).unwrap();
        assert_eq!(plan.len(), 2);

        let (model, _) = &renderer.frames[0];
        assert_ne!(*model, Matrix4::identity());
        assert_eq!(*ctx.model_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_draw_frame_skips_renderer_when_not_ready() {
        let mut ctx = RenderContext::default();
        let mut renderer = RecordingRenderer::default();

        let plan = draw_frame(&mut ctx, &mut renderer, false, true).unwrap();
        assert!(plan.is_empty());
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn test_render_error_still_pops() {
        let mut ctx = RenderContext::default();
        ctx.model_rotation_deg = 45.0;
        let mut renderer = RecordingRenderer {
            fail: true,
            ..Default::default()
        };

        assert!(matches!(
            draw_frame(&mut ctx, &mut renderer, true, true),
            Err(Error::Gpu(_))
        ));
        assert_eq!(*ctx.model_matrix(), Matrix4::identity());
        assert!(matches!(ctx.pop_model(), Err(Error::StackUnderflow)));
    }
}
