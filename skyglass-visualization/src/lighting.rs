//! Light and material parameters for Phong shading

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A point light, position given in view coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Light {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: [20.0, 20.0, 20.0],
            ambient: [0.0, 0.0, 0.0],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
        }
    }
}

/// Phong reflection coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

/// Named materials used by the draw commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Golden surface for shaded triangles
    Surface,
    /// Dark edges drawn over the surface
    EdgeBlack,
    /// Light edges for wireframe-only display
    EdgeWhite,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] = [
        MaterialKind::Surface,
        MaterialKind::EdgeBlack,
        MaterialKind::EdgeWhite,
    ];

    /// Position in [`MaterialKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The three materials a frame can draw with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPresets {
    pub surface: Material,
    pub edge_black: Material,
    pub edge_white: Material,
}

impl MaterialPresets {
    pub fn get(&self, kind: MaterialKind) -> &Material {
        match kind {
            MaterialKind::Surface => &self.surface,
            MaterialKind::EdgeBlack => &self.edge_black,
            MaterialKind::EdgeWhite => &self.edge_white,
        }
    }
}

impl Default for MaterialPresets {
    fn default() -> Self {
        let ambient = [0.1, 0.0, 0.0];
        let specular = [1.0, 1.0, 1.0];
        let shininess = 230.0;

        Self {
            surface: Material {
                ambient,
                diffuse: [205.0 / 255.0, 163.0 / 255.0, 63.0 / 255.0],
                specular,
                shininess,
            },
            edge_black: Material {
                ambient,
                diffuse: [0.0, 0.0, 0.0],
                specular,
                shininess,
            },
            edge_white: Material {
                ambient,
                diffuse: [1.0, 1.0, 1.0],
                specular,
                shininess,
            },
        }
    }
}

/// GPU layout of [`Light`]; every `vec3` is padded to 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub _padding0: f32,
    pub ambient: [f32; 3],
    pub _padding1: f32,
    pub diffuse: [f32; 3],
    pub _padding2: f32,
    pub specular: [f32; 3],
    pub _padding3: f32,
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position,
            ambient: light.ambient,
            diffuse: light.diffuse,
            specular: light.specular,
            ..Self::zeroed()
        }
    }
}

/// GPU layout of [`Material`]; shininess fills the slot after `ambient`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 3],
    pub shininess: f32,
    pub diffuse: [f32; 3],
    pub _padding0: f32,
    pub specular: [f32; 3],
    pub _padding1: f32,
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient,
            shininess: material.shininess,
            diffuse: material.diffuse,
            specular: material.specular,
            ..Self::zeroed()
        }
    }
}
