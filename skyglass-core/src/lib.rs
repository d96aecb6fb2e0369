//! Core data structures for skyglass
//!
//! This crate provides the mesh model behind the viewer: indexed triangle
//! storage, area-weighted vertex normals, deduplicated wireframe edges and
//! the flat buffers handed to the renderer. It performs no I/O, no logging
//! and no GPU calls.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Matrix4};
