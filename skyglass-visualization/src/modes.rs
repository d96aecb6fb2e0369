//! Surface shading and display mode selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the mesh surface is shaded. The discriminant is the integer the
/// fragment shader switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureMode {
    /// Mirror the skybox
    #[default]
    Reflection = 0,
    /// Bend the skybox through the surface
    Refraction = 1,
    /// Plain Phong lighting with the surface material
    Phong = 2,
}

impl TextureMode {
    pub const ALL: [TextureMode; 3] = [
        TextureMode::Reflection,
        TextureMode::Refraction,
        TextureMode::Phong,
    ];

    pub fn shader_index(self) -> u32 {
        self as u32
    }
}

/// Which parts of the mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Shaded triangles only
    #[default]
    Polygon,
    /// Shaded triangles with dark edges on top
    WirePoly,
    /// Light edges only
    Wireframe,
}

impl DisplayMode {
    /// The mode after this one, wrapping around
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Polygon => DisplayMode::WirePoly,
            DisplayMode::WirePoly => DisplayMode::Wireframe,
            DisplayMode::Wireframe => DisplayMode::Polygon,
        }
    }

    pub fn draws_triangles(self) -> bool {
        matches!(self, DisplayMode::Polygon | DisplayMode::WirePoly)
    }

    pub fn draws_edges(self) -> bool {
        matches!(self, DisplayMode::WirePoly | DisplayMode::Wireframe)
    }
}

impl fmt::Display for TextureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureMode::Reflection => "reflection",
            TextureMode::Refraction => "refraction",
            TextureMode::Phong => "phong",
        };
        f.write_str(name)
    }
}

impl FromStr for TextureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reflection" | "reflect" => Ok(TextureMode::Reflection),
            "refraction" | "refract" => Ok(TextureMode::Refraction),
            "phong" | "shading" => Ok(TextureMode::Phong),
            other => Err(format!(
                "unknown texture mode '{}' (expected reflection, refraction or phong)",
                other
            )),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayMode::Polygon => "polygon",
            DisplayMode::WirePoly => "wire-poly",
            DisplayMode::Wireframe => "wireframe",
        };
        f.write_str(name)
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polygon" => Ok(DisplayMode::Polygon),
            "wire-poly" | "wirepoly" => Ok(DisplayMode::WirePoly),
            "wireframe" => Ok(DisplayMode::Wireframe),
            other => Err(format!(
                "unknown display mode '{}' (expected polygon, wire-poly or wireframe)",
                other
            )),
        }
    }
}
