//! Load OBJ files without a window and print what the viewer would draw

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use skyglass_core::{Drawable, TriangleMesh};
use skyglass_io::ObjReadOptions;

#[derive(Parser)]
#[command(name = "mesh-stats")]
#[command(version, about = "Print vertex, face and edge counts of OBJ meshes")]
struct Cli {
    /// OBJ files to inspect
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Triangulate faces with more than three vertices instead of rejecting them
    #[arg(long)]
    fan_polygons: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let options = if cli.fan_polygons {
        ObjReadOptions::fan_polygons()
    } else {
        ObjReadOptions::default()
    };

    for path in &cli.paths {
        let mesh = skyglass_io::read_mesh_with(path, &options)
            .with_context(|| format!("loading {}", path.display()))?;
        print_stats(path, &mesh)?;
    }

    Ok(())
}

fn print_stats(path: &Path, mesh: &TriangleMesh) -> anyhow::Result<()> {
    println!("{}", path.display());
    println!("  vertices:  {}", mesh.vertex_count());
    println!("  triangles: {}", mesh.face_count());
    println!("  edges:     {}", mesh.edge_count());
    println!(
        "  buffers:   {} position floats, {} triangle indices, {} edge indices",
        mesh.position_buffer()?.len(),
        mesh.triangle_index_buffer()?.len(),
        mesh.edge_index_buffer()?.len()
    );

    let (min, max) = mesh.bounding_box();
    println!(
        "  bounds:    ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    println!("  radius:    {:.3}", mesh.bounding_radius());

    let euler = mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64;
    println!("  V - E + F: {}", euler);
    Ok(())
}
