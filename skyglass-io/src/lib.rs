//! I/O operations for meshes
//!
//! This crate turns OBJ-style mesh descriptions into ready
//! [`TriangleMesh`] values and writes them back out.

pub mod obj;

pub use obj::{parse_obj, parse_obj_with, ObjData, ObjReadOptions, ObjReader, ObjWriter, PolygonPolicy};

use std::path::Path;

use skyglass_core::{Error, Result, TriangleMesh};
use tracing::debug;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Parse mesh-description text and build a ready mesh
pub fn load_mesh_from_str(text: &str) -> Result<TriangleMesh> {
    load_mesh_from_str_with(text, &ObjReadOptions::default())
}

/// Parse mesh-description text with explicit options and build a ready mesh
pub fn load_mesh_from_str_with(text: &str, options: &ObjReadOptions) -> Result<TriangleMesh> {
    parse_obj_with(text, options)?.into_mesh()
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    read_mesh_with(path, &ObjReadOptions::default())
}

/// Auto-detect format and read mesh with explicit OBJ options
pub fn read_mesh_with<P: AsRef<Path>>(path: P, options: &ObjReadOptions) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => {
            debug!(path = %path.display(), ?options, "reading OBJ mesh");
            ObjReader::read_mesh_with(path, options)
        }
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Write a mesh, picking the format from the extension
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => ObjWriter::write_mesh(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}
