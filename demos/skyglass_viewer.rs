//! Interactive OBJ viewer
//!
//! Controls:
//!   A / D         rotate the mesh about Y
//!   Left / Right  orbit the camera about Y
//!   Up / Down     move the camera along Z
//!   1 / 2 / 3     reflection, refraction, Phong shading
//!   M             cycle polygon, wire-poly, wireframe
//!   R             reset the view
//!   Esc           quit

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use skyglass_io::PolygonPolicy;
use skyglass_visualization::{DisplayMode, InteractiveViewer, TextureMode, ViewerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skyglass-viewer")]
#[command(version, about = "View an OBJ mesh inside an environment-mapped skybox")]
struct Cli {
    /// Mesh to display (overrides the config file)
    mesh: Option<PathBuf>,

    /// Viewer configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial shading: reflection, refraction or phong
    #[arg(short, long)]
    texture_mode: Option<TextureMode>,

    /// Initial display: polygon, wire-poly or wireframe
    #[arg(short, long)]
    display_mode: Option<DisplayMode>,

    /// Triangulate faces with more than three vertices instead of rejecting them
    #[arg(long)]
    fan_polygons: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(mesh) = cli.mesh {
        config.mesh_path = mesh;
    }
    if let Some(mode) = cli.texture_mode {
        config.texture_mode = mode;
    }
    if let Some(mode) = cli.display_mode {
        config.display_mode = mode;
    }
    if cli.fan_polygons {
        config.polygons = PolygonPolicy::Fan;
    }

    tracing::info!(
        mesh = %config.mesh_path.display(),
        texture_mode = %config.texture_mode,
        display_mode = %config.display_mode,
        "starting viewer"
    );

    InteractiveViewer::new(config)?.run()?;
    Ok(())
}
