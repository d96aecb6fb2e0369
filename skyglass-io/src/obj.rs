//! OBJ format support
//!
//! Only geometry records are read: `v x y z` declares a vertex and
//! `f a b c` declares a triangle by 1-based vertex references. Every other
//! record (normals, texture coordinates, groups, materials, comments) is
//! skipped.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use skyglass_core::{Error, Face, Point3f, Result, TriangleMesh};

use crate::{MeshReader, MeshWriter};

/// What to do with face records listing more than three vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonPolicy {
    /// Fail with a parse error
    #[default]
    Reject,
    /// Split into a triangle fan around the first vertex
    Fan,
}

/// Options for OBJ parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjReadOptions {
    pub polygons: PolygonPolicy,
}

impl ObjReadOptions {
    /// Options that fan-triangulate polygon faces
    pub fn fan_polygons() -> Self {
        Self {
            polygons: PolygonPolicy::Fan,
        }
    }
}

/// Raw geometry read from OBJ text, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub vertices: Vec<Point3f>,
    /// 0-based vertex indices
    pub faces: Vec<Face>,
}

impl ObjData {
    /// Build a ready mesh from the parsed geometry
    pub fn into_mesh(self) -> Result<TriangleMesh> {
        TriangleMesh::from_vertices_and_faces(self.vertices, self.faces)
    }
}

/// Parse OBJ text with default options
pub fn parse_obj(text: &str) -> Result<ObjData> {
    parse_obj_with(text, &ObjReadOptions::default())
}

/// Parse OBJ text into vertex and face lists.
///
/// Faces may only reference vertices declared on earlier lines.
pub fn parse_obj_with(text: &str, options: &ObjReadOptions) -> Result<ObjData> {
    let mut data = ObjData::default();

    for (line_index, raw_line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = match raw_line.find('#') {
            Some(comment) => &raw_line[..comment],
            None => raw_line,
        };

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let vertex = parse_vertex(&mut tokens, line_number)?;
                data.vertices.push(vertex);
            }
            Some("f") => {
                let refs = tokens
                    .map(|token| resolve_reference(token, data.vertices.len(), line_number))
                    .collect::<Result<Vec<usize>>>()?;
                push_face(&mut data.faces, &refs, options, line_number)?;
            }
            _ => {}
        }
    }

    Ok(data)
}

fn parse_vertex<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line_number: usize,
) -> Result<Point3f> {
    let mut coords = [0.0f32; 3];
    for (axis, coord) in ["x", "y", "z"].iter().zip(coords.iter_mut()) {
        let token = tokens.next().ok_or_else(|| {
            Error::parse(line_number, format!("vertex record is missing its {} coordinate", axis))
        })?;
        *coord = token.parse::<f32>().map_err(|_| {
            Error::parse(line_number, format!("invalid {} coordinate '{}'", axis, token))
        })?;
    }
    Ok(Point3f::new(coords[0], coords[1], coords[2]))
}

/// Turn one face token (`7`, `7/2`, `7//3`, `-1`) into a 0-based index
fn resolve_reference(token: &str, vertex_count: usize, line_number: usize) -> Result<usize> {
    let index_part = token.split('/').next().unwrap_or(token);
    let index: i64 = index_part.parse().map_err(|_| {
        Error::parse(line_number, format!("invalid vertex reference '{}'", token))
    })?;

    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(vertex_count as i64 + i),
    };

    match resolved {
        Some(i) if i >= 0 && (i as usize) < vertex_count => Ok(i as usize),
        _ => Err(Error::parse(
            line_number,
            format!(
                "vertex reference {} is out of range ({} vertices declared so far)",
                index, vertex_count
            ),
        )),
    }
}

fn push_face(
    faces: &mut Vec<Face>,
    refs: &[usize],
    options: &ObjReadOptions,
    line_number: usize,
) -> Result<()> {
    match refs.len() {
        0..=2 => Err(Error::parse(
            line_number,
            format!("face record needs 3 vertex references, found {}", refs.len()),
        )),
        3 => {
            faces.push([refs[0], refs[1], refs[2]]);
            Ok(())
        }
        n => match options.polygons {
            PolygonPolicy::Reject => Err(Error::parse(
                line_number,
                format!("face record has {} vertices; only triangles are accepted", n),
            )),
            PolygonPolicy::Fan => {
                for pair in refs[1..].windows(2) {
                    faces.push([refs[0], pair[0], pair[1]]);
                }
                Ok(())
            }
        },
    }
}

/// Write the vertices and faces of a ready mesh as OBJ text
pub fn write_obj<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    if !mesh.is_ready() {
        return Err(Error::InvalidState(format!(
            "cannot write a mesh in state {:?}",
            mesh.state()
        )));
    }

    writeln!(writer, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for f in mesh.faces() {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    Ok(())
}

pub struct ObjReader;
pub struct ObjWriter;

impl ObjReader {
    /// Read and build a mesh from an OBJ file with explicit options
    pub fn read_mesh_with<P: AsRef<Path>>(path: P, options: &ObjReadOptions) -> Result<TriangleMesh> {
        let text = fs::read_to_string(path)?;
        parse_obj_with(&text, options)?.into_mesh()
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        Self::read_mesh_with(path, &ObjReadOptions::default())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        write_obj(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
