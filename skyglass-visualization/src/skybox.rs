//! Environment cube geometry and its generated cube map

use serde::{Deserialize, Serialize};

/// Unit cube as 12 triangles, listed face by face (front, right, left,
/// back, top, bottom)
const UNIT_CUBE: [[f32; 3]; 36] = [
    // front
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    // right
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    // left
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    // back
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    // top
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    // bottom
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
];

/// Skybox cube geometry as flat buffers, one vertex per triangle corner
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxMesh {
    positions: Vec<f32>,
    indices: Vec<u32>,
}

impl SkyboxMesh {
    /// Cube spanning `[-half_extent, half_extent]` on every axis
    pub fn new(half_extent: f32) -> Self {
        let positions = UNIT_CUBE
            .iter()
            .flat_map(|corner| corner.map(|c| c * half_extent))
            .collect();
        let indices = (0..UNIT_CUBE.len() as u32).collect();
        Self { positions, indices }
    }

    pub fn position_buffer(&self) -> &[f32] {
        &self.positions
    }

    pub fn index_buffer(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Cube map faces in texture array layer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

const ZENITH: [f32; 3] = [0.22, 0.42, 0.78];
const HORIZON: [f32; 3] = [0.86, 0.90, 0.95];
const GROUND: [f32; 3] = [0.30, 0.26, 0.21];

impl CubeMapFace {
    pub const ALL: [CubeMapFace; 6] = [
        CubeMapFace::PositiveX,
        CubeMapFace::NegativeX,
        CubeMapFace::PositiveY,
        CubeMapFace::NegativeY,
        CubeMapFace::PositiveZ,
        CubeMapFace::NegativeZ,
    ];

    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Direction through a face texel; `u`, `v` in [-1, 1] with `v`
    /// growing downwards
    pub fn direction(self, u: f32, v: f32) -> [f32; 3] {
        match self {
            CubeMapFace::PositiveX => [1.0, -v, -u],
            CubeMapFace::NegativeX => [-1.0, -v, u],
            CubeMapFace::PositiveY => [u, 1.0, v],
            CubeMapFace::NegativeY => [u, -1.0, -v],
            CubeMapFace::PositiveZ => [u, -v, 1.0],
            CubeMapFace::NegativeZ => [-u, -v, -1.0],
        }
    }

    /// RGBA8 texels of a `size` x `size` sky gradient: blue overhead,
    /// pale at the horizon, brown below.
    pub fn pixels(self, size: u32) -> Vec<u8> {
        let size = size.max(1);
        let mut texels = Vec::with_capacity((size * size * 4) as usize);

        for row in 0..size {
            for col in 0..size {
                let u = 2.0 * (col as f32 + 0.5) / size as f32 - 1.0;
                let v = 2.0 * (row as f32 + 0.5) / size as f32 - 1.0;
                let [x, y, z] = self.direction(u, v);
                let height = y / (x * x + y * y + z * z).sqrt();

                let rgb = if height >= 0.0 {
                    mix(HORIZON, ZENITH, height)
                } else {
                    mix(HORIZON, GROUND, (-height * 4.0).min(1.0))
                };
                texels.extend(rgb.map(|c| (c * 255.0).round() as u8));
                texels.push(255);
            }
        }

        texels
    }
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
