//! Visualization and rendering for skyglass
//!
//! This crate displays a [`TriangleMesh`](skyglass_core::TriangleMesh)
//! inside a procedural skybox using wgpu and winit:
//! - Render context with camera, light, materials and a transform stack
//! - Keyboard control of mesh rotation and camera position
//! - Reflection, refraction and Phong shading
//! - Polygon, wire-poly and wireframe display modes
//! - Background mesh loading
//!
//! Everything except [`renderer`] and [`viewer`] works without a GPU.

pub mod camera;
pub mod config;
pub mod context;
pub mod frame;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod loader;
pub mod modes;
pub mod renderer;
pub mod shaders;
pub mod skybox;
pub mod transform_stack;
pub mod viewer;

pub use camera::*;
pub use config::*;
pub use context::*;
pub use frame::*;
pub use input::*;
pub use lighting::*;
pub use loader::*;
pub use modes::*;
pub use renderer::MeshRenderer;
pub use skybox::*;
pub use transform_stack::*;
pub use viewer::*;
