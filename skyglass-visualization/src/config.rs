//! Viewer configuration
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! mesh_path = "assets/cube.obj"
//! texture_mode = "refraction"
//! display_mode = "wire-poly"
//!
//! [camera]
//! eye = [0.0, 2.0, 8.0]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyglass_core::{Error, Result};
use skyglass_io::{ObjReadOptions, PolygonPolicy};

use crate::lighting::Light;
use crate::modes::{DisplayMode, TextureMode};

/// Initial camera placement and projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 11.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// Top-level viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub mesh_path: PathBuf,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub texture_mode: TextureMode,
    pub display_mode: DisplayMode,
    pub polygons: PolygonPolicy,
    pub camera: CameraConfig,
    pub light: Light,
    /// Half-extent of the skybox cube
    pub skybox_scale: f32,
    /// Edge length in texels of each generated cube map face
    pub skybox_face_size: u32,
    pub clear_color: [f64; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from("teapot_0.obj"),
            window_title: "skyglass".to_string(),
            window_width: 1024,
            window_height: 768,
            texture_mode: TextureMode::default(),
            display_mode: DisplayMode::default(),
            polygons: PolygonPolicy::default(),
            camera: CameraConfig::default(),
            light: Light::default(),
            skybox_scale: 35.0,
            skybox_face_size: 64,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn obj_options(&self) -> ObjReadOptions {
        ObjReadOptions {
            polygons: self.polygons,
        }
    }

    /// Reject values the renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(Error::Config(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::Config(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if !(self.skybox_scale > 0.0) || self.skybox_face_size == 0 {
            return Err(Error::Config(
                "skybox_scale and skybox_face_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
