//! Triangle mesh storage and derived render geometry
//!
//! A [`TriangleMesh`] is populated by a single call to
//! [`TriangleMesh::build_from_vertex_and_face_lists`], which validates the
//! input and derives everything the renderer needs in one go:
//!
//! - area-weighted per-vertex normals,
//! - a deduplicated edge list for wireframe drawing,
//! - flat position/normal/index buffers ready for GPU upload.
//!
//! After a successful build the mesh is read-only. Buffer accessors fail with
//! [`Error::InvalidState`] until then.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::*;

/// An undirected mesh edge stored as its canonical `(min, max)` index pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    /// Create an edge between two vertices, in either order
    pub fn new(i: usize, j: usize) -> Self {
        Self {
            a: i.min(j),
            b: i.max(j),
        }
    }
}

/// Lifecycle of a [`TriangleMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshState {
    /// Constructed, never built
    #[default]
    Empty,
    /// A build is in progress
    Building,
    /// The last build succeeded; buffers are valid
    Ready,
    /// The last build was rejected; buffers are unavailable
    Failed,
}

/// Flat sequences handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
struct RenderBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    triangles: Vec<u32>,
    edges: Vec<u32>,
}

impl RenderBuffers {
    fn new(vertices: &[Point3f], normals: &[Vector3f], faces: &[Face], edges: &[Edge]) -> Self {
        Self {
            positions: vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect(),
            normals: normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect(),
            // Indices were checked against `u32::MAX` during validation.
            triangles: faces
                .iter()
                .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
                .collect(),
            edges: edges
                .iter()
                .flat_map(|e| [e.a as u32, e.b as u32])
                .collect(),
        }
    }
}

/// Serialized form of a [`TriangleMesh`]: only the source lists.
///
/// Derived data is never read from a document; deserializing a mesh runs a
/// full build, so a document with bad face indices is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshDocument {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<Face>,
}

impl TryFrom<MeshDocument> for TriangleMesh {
    type Error = Error;

    fn try_from(doc: MeshDocument) -> Result<Self> {
        Self::from_vertices_and_faces(doc.vertices, doc.faces)
    }
}

impl From<TriangleMesh> for MeshDocument {
    fn from(mesh: TriangleMesh) -> Self {
        Self {
            vertices: mesh.vertices,
            faces: mesh.faces,
        }
    }
}

/// An indexed triangle mesh with derived normals and edges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "MeshDocument", into = "MeshDocument")]
pub struct TriangleMesh {
    vertices: Vec<Point3f>,
    faces: Vec<Face>,
    normals: Vec<Vector3f>,
    edges: Vec<Edge>,
    buffers: RenderBuffers,
    state: MeshState,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ready mesh from vertices and faces in one step
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<Face>) -> Result<Self> {
        let mut mesh = Self::new();
        mesh.build_from_vertex_and_face_lists(vertices, faces)?;
        Ok(mesh)
    }

    /// Populate the mesh and derive normals, edges and render buffers.
    ///
    /// Fails with [`Error::Validation`] when faces are given without any
    /// vertices or when a face references a vertex that does not exist. A
    /// failed build leaves the mesh empty and in [`MeshState::Failed`].
    pub fn build_from_vertex_and_face_lists(
        &mut self,
        vertices: Vec<Point3f>,
        faces: Vec<Face>,
    ) -> Result<()> {
        self.clear();
        self.state = MeshState::Building;

        if let Err(err) = validate(&vertices, &faces) {
            self.state = MeshState::Failed;
            return Err(err);
        }

        let normals = compute_vertex_normals(&vertices, &faces);
        let edges = extract_edges(&faces);
        self.buffers = RenderBuffers::new(&vertices, &normals, &faces, &edges);

        self.vertices = vertices;
        self.faces = faces;
        self.normals = normals;
        self.edges = edges;
        self.state = MeshState::Ready;
        Ok(())
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of unique edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// True once a build has completed successfully
    pub fn is_ready(&self) -> bool {
        self.state == MeshState::Ready
    }

    pub fn state(&self) -> MeshState {
        self.state
    }

    pub fn vertices(&self) -> &[Point3f] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Per-vertex normals, aligned with [`vertices`](Self::vertices)
    pub fn normals(&self) -> &[Vector3f] {
        &self.normals
    }

    /// Unique edges in first-seen order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 3 coordinates per vertex, in vertex order
    pub fn position_buffer(&self) -> Result<&[f32]> {
        self.ensure_ready("position buffer")?;
        Ok(&self.buffers.positions)
    }

    /// 3 components per vertex, aligned with the position buffer
    pub fn normal_buffer(&self) -> Result<&[f32]> {
        self.ensure_ready("normal buffer")?;
        Ok(&self.buffers.normals)
    }

    /// 3 vertex indices per face, in face order
    pub fn triangle_index_buffer(&self) -> Result<&[u32]> {
        self.ensure_ready("triangle index buffer")?;
        Ok(&self.buffers.triangles)
    }

    /// 2 vertex indices per unique edge
    pub fn edge_index_buffer(&self) -> Result<&[u32]> {
        self.ensure_ready("edge index buffer")?;
        Ok(&self.buffers.edges)
    }

    fn ensure_ready(&self, what: &str) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{} requested while mesh is {:?}",
                what, self.state
            )))
        }
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals.clear();
        self.edges.clear();
        self.buffers = RenderBuffers::default();
    }
}

fn validate(vertices: &[Point3f], faces: &[Face]) -> Result<()> {
    if vertices.is_empty() && !faces.is_empty() {
        return Err(Error::Validation(format!(
            "{} faces given but the vertex list is empty",
            faces.len()
        )));
    }
    if vertices.len() > u32::MAX as usize {
        return Err(Error::Validation(format!(
            "{} vertices do not fit 32-bit indices",
            vertices.len()
        )));
    }
    for (face_index, face) in faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&i| i >= vertices.len()) {
            return Err(Error::Validation(format!(
                "face {} references vertex {} but only {} vertices exist",
                face_index,
                bad,
                vertices.len()
            )));
        }
    }
    Ok(())
}

/// Un-normalised face normal `(v1 - v0) x (v2 - v0)`; its length is twice
/// the triangle area.
fn face_normal(vertices: &[Point3f], face: &Face) -> Vector3f {
    let v0 = vertices[face[0]];
    let v1 = vertices[face[1]];
    let v2 = vertices[face[2]];

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    edge1.cross(&edge2)
}

/// Compute area-weighted vertex normals.
///
/// Every face adds its un-normalised normal to each of its three vertices;
/// the sums are then normalised. Vertices whose sum is exactly zero keep the
/// zero vector.
///
/// # Panics
///
/// Panics if a face index is out of range for `vertices`.
pub fn compute_vertex_normals(vertices: &[Point3f], faces: &[Face]) -> Vec<Vector3f> {
    let mut normals = vec![Vector3f::zeros(); vertices.len()];

    for face in faces {
        let n = face_normal(vertices, face);
        for &i in face {
            normals[i] += n;
        }
    }

    for normal in &mut normals {
        let length = normal.norm();
        if length > 0.0 {
            *normal /= length;
        }
    }

    normals
}

/// Collect each undirected edge of `faces` once, in first-seen order.
///
/// Collapsed edges of degenerate faces (both ends on the same vertex) are
/// skipped.
pub fn extract_edges(faces: &[Face]) -> Vec<Edge> {
    let mut seen: HashSet<Edge> = HashSet::with_capacity(faces.len() * 2);
    let mut edges = Vec::with_capacity(faces.len() * 2);

    for &[i0, i1, i2] in faces {
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            if a == b {
                continue;
            }
            let edge = Edge::new(a, b);
            if seen.insert(edge) {
                edges.push(edge);
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_single_triangle() -> (Vec<Point3f>, Vec<Face>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn make_quad() -> (Vec<Point3f>, Vec<Face>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn make_tetrahedron() -> (Vec<Point3f>, Vec<Face>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    #[test]
    fn test_new_mesh_is_empty_and_not_ready() {
        let mesh = TriangleMesh::new();
        assert_eq!(mesh.state(), MeshState::Empty);
        assert!(!mesh.is_ready());
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn test_buffers_unavailable_before_build() {
        let mesh = TriangleMesh::new();
        assert!(matches!(mesh.position_buffer(), Err(Error::InvalidState(_))));
        assert!(matches!(mesh.normal_buffer(), Err(Error::InvalidState(_))));
        assert!(matches!(mesh.triangle_index_buffer(), Err(Error::InvalidState(_))));
        assert!(matches!(mesh.edge_index_buffer(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = make_single_triangle();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();

        assert!(mesh.is_ready());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 3);

        let normals = mesh.normal_buffer().unwrap();
        for n in normals.chunks(3) {
            assert_relative_eq!(n[0], 0.0);
            assert_relative_eq!(n[1], 0.0);
            assert_relative_eq!(n[2], 1.0);
        }
    }

    #[test]
    fn test_buffer_layout() {
        let (vertices, faces) = make_quad();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();

        assert_eq!(
            mesh.position_buffer().unwrap(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(mesh.triangle_index_buffer().unwrap(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.normal_buffer().unwrap().len(), 12);
        assert_eq!(mesh.edge_index_buffer().unwrap().len(), 2 * mesh.edge_count());
    }

    #[test]
    fn test_quad_shares_diagonal() {
        let (vertices, faces) = make_quad();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn test_edges_first_seen_order() {
        let edges = extract_edges(&[[0, 1, 2], [2, 1, 3]]);
        assert_eq!(
            edges,
            vec![
                Edge::new(0, 1),
                Edge::new(1, 2),
                Edge::new(0, 2),
                Edge::new(1, 3),
                Edge::new(2, 3),
            ]
        );
    }

    #[test]
    fn test_edge_is_canonical() {
        assert_eq!(Edge::new(5, 2), Edge { a: 2, b: 5 });
        assert_eq!(Edge::new(2, 5), Edge::new(5, 2));
    }

    #[test]
    fn test_degenerate_face_skips_collapsed_edge() {
        let edges = extract_edges(&[[0, 0, 1]]);
        assert_eq!(edges, vec![Edge::new(0, 1)]);
    }

    #[test]
    fn test_closed_mesh_edge_count() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();
        assert_eq!(mesh.edge_count(), 3 * mesh.face_count() / 2);
    }

    #[test]
    fn test_tetrahedron_normals_point_outward() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();

        let centroid = Vector3f::new(0.25, 0.25, 0.25);
        for (vertex, normal) in mesh.vertices().iter().zip(mesh.normals()) {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
            assert!(normal.dot(&(vertex.coords - centroid)) > 0.0);
        }
    }

    #[test]
    fn test_normals_are_area_weighted() {
        // A large triangle in the XY plane and a small one in the XZ plane
        // share vertex 0. The large one must dominate that vertex's normal.
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(10.0, 0.0, 0.0),
            Point3f::new(0.0, 10.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 4]];
        let normals = compute_vertex_normals(&vertices, &faces);

        // Face normals: (0, 0, 100) and (0, 1, 0).
        let expected = Vector3f::new(0.0, 1.0, 100.0).normalize();
        assert_relative_eq!(normals[0], expected, epsilon = 1e-6);
    }

    #[test]
    fn test_isolated_vertex_keeps_zero_normal() {
        let (mut vertices, faces) = make_single_triangle();
        vertices.push(Point3f::new(5.0, 5.0, 5.0));
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();

        assert_eq!(mesh.normals()[3], Vector3f::zeros());
        assert_eq!(&mesh.normal_buffer().unwrap()[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cancelling_faces_leave_zero_normal() {
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        let normals = compute_vertex_normals(&vertices, &[[0, 1, 2], [0, 2, 1]]);
        assert!(normals.iter().all(|n| *n == Vector3f::zeros()));
    }

    #[test]
    fn test_out_of_range_face_fails() {
        let (vertices, _) = make_single_triangle();
        let mut mesh = TriangleMesh::new();
        let result = mesh.build_from_vertex_and_face_lists(vertices, vec![[0, 1, 5]]);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(!mesh.is_ready());
        assert_eq!(mesh.state(), MeshState::Failed);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(matches!(mesh.position_buffer(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_faces_without_vertices_fail() {
        let result = TriangleMesh::from_vertices_and_faces(Vec::new(), vec![[0, 1, 2]]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_input_builds_empty_ready_mesh() {
        let mesh = TriangleMesh::from_vertices_and_faces(Vec::new(), Vec::new()).unwrap();
        assert!(mesh.is_ready());
        assert!(mesh.position_buffer().unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_after_failure() {
        let mut mesh = TriangleMesh::new();
        assert!(mesh
            .build_from_vertex_and_face_lists(Vec::new(), vec![[0, 1, 2]])
            .is_err());

        let (vertices, faces) = make_single_triangle();
        mesh.build_from_vertex_and_face_lists(vertices, faces).unwrap();
        assert!(mesh.is_ready());
        assert_eq!(mesh.triangle_index_buffer().unwrap(), &[0, 1, 2]);
    }

    #[test]
    fn test_buffers_are_stable_between_calls() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();

        assert_eq!(mesh.position_buffer().unwrap(), mesh.position_buffer().unwrap());
        assert_eq!(mesh.normal_buffer().unwrap(), mesh.normal_buffer().unwrap());
        assert_eq!(
            mesh.triangle_index_buffer().unwrap(),
            mesh.triangle_index_buffer().unwrap()
        );
    }

    #[test]
    fn test_deserialize_runs_a_full_build() {
        let doc = "vertices = [[0.0, 0.0, 0.0]]\nfaces = [[0, 1, 9]]\n";
        let err = toml::from_str::<TriangleMesh>(doc).unwrap_err();
        assert!(err.to_string().contains("references vertex"), "{}", err);

        // Derived fields in a document are not accepted
        let forged = "vertices = [[0.0, 0.0, 0.0]]\nfaces = []\nstate = \"Ready\"\n";
        assert!(toml::from_str::<TriangleMesh>(forged).is_err());

        let doc = "vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]\nfaces = [[0, 1, 2]]\n";
        let mesh: TriangleMesh = toml::from_str(doc).unwrap();
        assert!(mesh.is_ready());
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.triangle_index_buffer().unwrap(), &[0, 1, 2]);
    }

    #[test]
    fn test_serialize_writes_source_lists_only() {
        let (vertices, faces) = make_single_triangle();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces).unwrap();
        let text = toml::to_string(&mesh).unwrap();
        assert!(text.contains("faces"));
        assert!(!text.contains("normals"));
        assert!(!text.contains("state"));
    }
}
