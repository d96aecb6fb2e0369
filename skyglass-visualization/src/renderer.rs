//! wgpu renderer executing frame plans

use std::sync::Arc;

use bytemuck::Zeroable;
use nalgebra::Matrix4;
use skyglass_core::{Error, Result, TriangleMesh};
use tracing::{debug, warn};
use winit::window::Window;

use crate::config::ViewerConfig;
use crate::context::{FrameUniforms, RenderContext};
use crate::frame::{DrawCommand, FramePlan, FrameRenderer};
use crate::gpu::{uniform_entry, GpuContext, DEPTH_FORMAT};
use crate::lighting::{LightUniform, MaterialKind, MaterialPresets, MaterialUniform};
use crate::shaders;
use crate::skybox::{CubeMapFace, SkyboxMesh};

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1]
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Mesh buffers resident on the GPU
struct GpuMesh {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    triangles: wgpu::Buffer,
    triangle_index_count: u32,
    edges: wgpu::Buffer,
    edge_index_count: u32,
}

struct GpuSkybox {
    positions: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Draws a [`TriangleMesh`] and its skybox into a window surface
pub struct MeshRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    triangle_pipeline: wgpu::RenderPipeline,
    edge_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_buffers: Vec<wgpu::Buffer>,
    material_bind_groups: Vec<wgpu::BindGroup>,
    skybox: GpuSkybox,
    skybox_ready: bool,
    mesh: Option<GpuMesh>,
    clear_color: wgpu::Color,
}

impl MeshRenderer {
    /// Set up the device, pipelines and skybox for `window`
    pub async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no supported formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);
        let depth_view = gpu.create_depth_view(surface_config.width, surface_config.height);

        let frame_buffer = gpu.create_buffer_init(
            "frame uniforms",
            &[FrameUniforms::zeroed()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let light_buffer = gpu.create_buffer_init(
            "light uniforms",
            &[LightUniform::from(&config.light)],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let sky_view = Self::create_cube_map(&gpu, config.skybox_face_size);
        let sky_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sky sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let frame_layout = gpu.create_bind_group_layout(
            "frame bind group layout",
            &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        );
        let frame_bind_group = gpu.create_bind_group(
            "frame bind group",
            &frame_layout,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&sky_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sky_sampler),
                },
            ],
        );

        let material_layout = gpu.create_bind_group_layout(
            "material bind group layout",
            &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        );
        let presets = MaterialPresets::default();
        let material_buffers: Vec<wgpu::Buffer> = MaterialKind::ALL
            .iter()
            .map(|&kind| {
                gpu.create_buffer_init(
                    &format!("{:?} material", kind),
                    &[MaterialUniform::from(presets.get(kind))],
                    wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                )
            })
            .collect();
        let material_bind_groups = material_buffers
            .iter()
            .map(|buffer| {
                gpu.create_bind_group(
                    "material bind group",
                    &material_layout,
                    &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                )
            })
            .collect();

        let mesh_shader = gpu.create_shader_module("mesh shader", &shaders::mesh_shader_source());
        let skybox_shader =
            gpu.create_shader_module("skybox shader", &shaders::skybox_shader_source());

        let mesh_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mesh pipeline layout"),
                bind_group_layouts: &[&frame_layout, &material_layout],
                push_constant_ranges: &[],
            });
        let skybox_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("skybox pipeline layout"),
                bind_group_layouts: &[&frame_layout],
                push_constant_ranges: &[],
            });

        let mesh_buffers = [vec3_layout(&POSITION_ATTRIBUTES), vec3_layout(&NORMAL_ATTRIBUTES)];
        let triangle_pipeline = create_pipeline(
            &gpu.device,
            PipelineDesc {
                label: "triangle pipeline",
                layout: &mesh_layout,
                shader: &mesh_shader,
                fragment_entry: "fs_surface",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_compare: wgpu::CompareFunction::Less,
                // Push filled triangles back so edges drawn on top stay visible
                depth_bias: wgpu::DepthBiasState {
                    constant: 1,
                    slope_scale: 1.0,
                    clamp: 0.0,
                },
                format: surface_format,
            },
        );
        let edge_pipeline = create_pipeline(
            &gpu.device,
            PipelineDesc {
                label: "edge pipeline",
                layout: &mesh_layout,
                shader: &mesh_shader,
                fragment_entry: "fs_edge",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                depth_compare: wgpu::CompareFunction::LessEqual,
                depth_bias: wgpu::DepthBiasState::default(),
                format: surface_format,
            },
        );
        let skybox_pipeline = create_pipeline(
            &gpu.device,
            PipelineDesc {
                label: "skybox pipeline",
                layout: &skybox_layout,
                shader: &skybox_shader,
                fragment_entry: "fs_main",
                buffers: &[vec3_layout(&POSITION_ATTRIBUTES)],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_compare: wgpu::CompareFunction::Less,
                depth_bias: wgpu::DepthBiasState::default(),
                format: surface_format,
            },
        );

        let cube = SkyboxMesh::new(config.skybox_scale);
        let skybox = GpuSkybox {
            positions: gpu.create_buffer_init(
                "skybox positions",
                cube.position_buffer(),
                wgpu::BufferUsages::VERTEX,
            ),
            indices: gpu.create_buffer_init(
                "skybox indices",
                cube.index_buffer(),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: cube.index_buffer().len() as u32,
        };

        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            gpu,
            surface,
            surface_config,
            depth_view,
            triangle_pipeline,
            edge_pipeline,
            skybox_pipeline,
            frame_buffer,
            light_buffer,
            frame_bind_group,
            material_buffers,
            material_bind_groups,
            skybox,
            skybox_ready: true,
            mesh: None,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Generate the sky gradient and upload it as a cube texture
    fn create_cube_map(gpu: &GpuContext, face_size: u32) -> wgpu::TextureView {
        let face_size = face_size.max(1);
        let extent = wgpu::Extent3d {
            width: face_size,
            height: face_size,
            depth_or_array_layers: CubeMapFace::ALL.len() as u32,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sky cube map"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for face in CubeMapFace::ALL {
            gpu.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: face.layer(),
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &face.pixels(face_size),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * face_size),
                    rows_per_image: Some(face_size),
                },
                wgpu::Extent3d {
                    width: face_size,
                    height: face_size,
                    depth_or_array_layers: 1,
                },
            );
        }
        debug!(face_size, "sky cube map uploaded");

        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("sky cube view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    /// Copy a ready mesh's flat buffers to the GPU, replacing any previous
    /// mesh
    pub fn upload_mesh(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let positions = mesh.position_buffer()?;
        let normals = mesh.normal_buffer()?;
        let triangles = mesh.triangle_index_buffer()?;
        let edges = mesh.edge_index_buffer()?;

        let vertex = wgpu::BufferUsages::VERTEX;
        let index = wgpu::BufferUsages::INDEX;
        self.mesh = Some(GpuMesh {
            positions: self.gpu.create_buffer_init("mesh positions", positions, vertex),
            normals: self.gpu.create_buffer_init("mesh normals", normals, vertex),
            triangles: self.gpu.create_buffer_init("mesh triangles", triangles, index),
            triangle_index_count: triangles.len() as u32,
            edges: self.gpu.create_buffer_init("mesh edges", edges, index),
            edge_index_count: edges.len() as u32,
        });

        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.face_count(),
            edges = mesh.edge_count(),
            "mesh uploaded"
        );
        Ok(())
    }

    pub fn mesh_ready(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn skybox_ready(&self) -> bool {
        self.skybox_ready
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Resize renderer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.gpu.device, &self.surface_config);
            self.depth_view = self.gpu.create_depth_view(width, height);
        }
    }

    fn write_uniforms(&self, ctx: &RenderContext) {
        let queue = &self.gpu.queue;
        let frame = ctx.frame_uniforms(&opengl_to_wgpu_matrix());
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::from(&ctx.light)),
        );
        for (kind, buffer) in MaterialKind::ALL.iter().zip(&self.material_buffers) {
            let material = MaterialUniform::from(ctx.materials.get(*kind));
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&material));
        }
    }
}

impl FrameRenderer for MeshRenderer {
    fn render(&mut self, ctx: &RenderContext, plan: &FramePlan) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {}", e))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.write_uniforms(ctx);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for command in plan.iter() {
                match *command {
                    DrawCommand::DrawTriangles { material } => {
                        let Some(mesh) = &self.mesh else { continue };
                        if mesh.triangle_index_count == 0 {
                            continue;
                        }
                        pass.set_pipeline(&self.triangle_pipeline);
                        pass.set_bind_group(1, &self.material_bind_groups[material.index()], &[]);
                        pass.set_vertex_buffer(0, mesh.positions.slice(..));
                        pass.set_vertex_buffer(1, mesh.normals.slice(..));
                        pass.set_index_buffer(mesh.triangles.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..mesh.triangle_index_count, 0, 0..1);
                    }
                    DrawCommand::DrawEdges { material } => {
                        let Some(mesh) = &self.mesh else { continue };
                        if mesh.edge_index_count == 0 {
                            continue;
                        }
                        pass.set_pipeline(&self.edge_pipeline);
                        pass.set_bind_group(1, &self.material_bind_groups[material.index()], &[]);
                        pass.set_vertex_buffer(0, mesh.positions.slice(..));
                        pass.set_vertex_buffer(1, mesh.normals.slice(..));
                        pass.set_index_buffer(mesh.edges.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..mesh.edge_index_count, 0, 0..1);
                    }
                    DrawCommand::DrawSkybox => {
                        pass.set_pipeline(&self.skybox_pipeline);
                        pass.set_vertex_buffer(0, self.skybox.positions.slice(..));
                        pass.set_index_buffer(
                            self.skybox.indices.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        pass.draw_indexed(0..self.skybox.index_count, 0, 0..1);
                    }
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Tightly packed `vec3<f32>` buffer
fn vec3_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    fragment_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_compare: wgpu::CompareFunction,
    depth_bias: wgpu::DepthBiasState,
    format: wgpu::TextureFormat,
}

fn create_pipeline(device: &wgpu::Device, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: "vs_main",
            buffers: desc.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: desc.fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: primitive_state(desc.topology),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: desc.depth_bias,
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// No face culling: open meshes and mixed winding show both sides.
fn primitive_state(topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_clip_correction_maps_depth_range() {
        let near = opengl_to_wgpu_matrix() * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = opengl_to_wgpu_matrix() * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
    }

    #[test]
    fn test_vec3_layout() {
        let layout = vec3_layout(&NORMAL_ATTRIBUTES);
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes[0].shader_location, 1);
    }

    #[test]
    fn test_triangles_draw_both_sides() {
        let state = primitive_state(wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(state.cull_mode, None);
        assert_eq!(state.polygon_mode, wgpu::PolygonMode::Fill);
        assert_eq!(primitive_state(wgpu::PrimitiveTopology::LineList).cull_mode, None);
    }
}
