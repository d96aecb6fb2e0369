//! Integration tests for skyglass-io
//!
//! These tests go from OBJ text or files all the way to ready render buffers.

use std::fs;

use approx::assert_relative_eq;
use skyglass_core::{Error, TriangleMesh, Vector3};
use skyglass_io::{load_mesh_from_str, load_mesh_from_str_with, read_mesh, write_mesh, ObjReadOptions};

/// A closed unit cube, 8 vertices and 12 outward-facing triangles
const CUBE_OBJ: &str = "\
# unit cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 2 3 7
f 2 7 6
f 3 4 8
f 3 8 7
f 4 1 5
f 4 5 8
";

/// The cube with its top face left open
fn open_box_obj() -> String {
    CUBE_OBJ
        .lines()
        .filter(|line| *line != "f 5 6 7" && *line != "f 5 7 8")
        .collect::<Vec<_>>()
        .join("\n")
}

fn count_records(text: &str, marker: &str) -> usize {
    text.lines()
        .filter(|line| line.split_whitespace().next() == Some(marker))
        .count()
}

#[test]
fn test_counts_match_records() {
    let mesh = load_mesh_from_str(CUBE_OBJ).unwrap();
    assert_eq!(mesh.vertex_count(), count_records(CUBE_OBJ, "v"));
    assert_eq!(mesh.face_count(), count_records(CUBE_OBJ, "f"));
}

#[test]
fn test_closed_mesh_edge_count() {
    let mesh = load_mesh_from_str(CUBE_OBJ).unwrap();
    assert_eq!(mesh.edge_count(), 3 * mesh.face_count() / 2);
    assert_eq!(mesh.edge_count(), 18);
}

#[test]
fn test_open_mesh_edge_count_bounds() {
    let mesh = load_mesh_from_str(&open_box_obj()).unwrap();
    let f = mesh.face_count();
    assert_eq!(f, 10);
    assert!(mesh.edge_count() <= 3 * f);
    assert!(mesh.edge_count() >= 3 * f / 2);
}

#[test]
fn test_indices_in_range_and_normals_unit() {
    let mesh = load_mesh_from_str(CUBE_OBJ).unwrap();
    let vertex_count = mesh.vertex_count() as u32;

    for &i in mesh.triangle_index_buffer().unwrap() {
        assert!(i < vertex_count);
    }
    for &i in mesh.edge_index_buffer().unwrap() {
        assert!(i < vertex_count);
    }
    for n in mesh.normal_buffer().unwrap().chunks(3) {
        let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert_relative_eq!(length, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_cube_corner_normals_point_away_from_center() {
    let mesh = load_mesh_from_str(CUBE_OBJ).unwrap();
    for (vertex, normal) in mesh.vertices().iter().zip(mesh.normals()) {
        let outward = vertex.coords - Vector3::new(0.5, 0.5, 0.5);
        assert!(normal.dot(&outward) > 0.0);
    }
}

#[test]
fn test_out_of_range_face_leaves_mesh_not_ready() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 5\n";
    assert!(matches!(load_mesh_from_str(text), Err(Error::Parse { .. })));

    // The same geometry handed straight to the mesh model is a validation error.
    let data = skyglass_io::parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
    let mut mesh = TriangleMesh::new();
    let result = mesh.build_from_vertex_and_face_lists(data.vertices, vec![[0, 1, 5]]);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(!mesh.is_ready());
}

#[test]
fn test_fan_option_loads_quads() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    assert!(load_mesh_from_str(text).is_err());

    let mesh = load_mesh_from_str_with(text, &ObjReadOptions::fan_polygons()).unwrap();
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.edge_count(), 5);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.obj");

    let mesh = load_mesh_from_str(CUBE_OBJ).unwrap();
    write_mesh(&mesh, &path).unwrap();

    let reread = read_mesh(&path).unwrap();
    assert_eq!(reread.position_buffer().unwrap(), mesh.position_buffer().unwrap());
    assert_eq!(
        reread.triangle_index_buffer().unwrap(),
        mesh.triangle_index_buffer().unwrap()
    );
    assert_eq!(reread.edge_count(), mesh.edge_count());

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(count_records(&text, "f"), 12);
}
