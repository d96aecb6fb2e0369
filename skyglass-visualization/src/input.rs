//! Keyboard handling for the interactive viewer

use std::collections::HashSet;

use crate::context::RenderContext;
use crate::modes::TextureMode;

/// Mesh rotation per key press, degrees
pub const ROTATION_STEP_DEG: f32 = 5.0;
/// Camera orbit per key press, degrees
pub const ORBIT_STEP_DEG: f32 = 1.0;
/// Eye movement along Z per key press
pub const DOLLY_STEP: f32 = 0.01;

/// Keys the viewer reacts to, independent of the windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerKey {
    A,
    D,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Digit1,
    Digit2,
    Digit3,
    M,
    R,
}

/// Tracks held keys and applies their effect to a [`RenderContext`].
///
/// Every key-down re-evaluates the held set: within each pair (A/D,
/// Left/Right, Up/Down) the first key wins when both are held.
#[derive(Debug, Default, Clone)]
pub struct KeyboardController {
    pressed: HashSet<ViewerKey>,
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: ViewerKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Record a key press and update the context.
    /// Returns true when anything visible changed.
    pub fn key_down(&mut self, key: ViewerKey, ctx: &mut RenderContext) -> bool {
        self.pressed.insert(key);

        let moved = self.apply_held(ctx);

        match key {
            ViewerKey::Digit1 => ctx.texture_mode = TextureMode::Reflection,
            ViewerKey::Digit2 => ctx.texture_mode = TextureMode::Refraction,
            ViewerKey::Digit3 => ctx.texture_mode = TextureMode::Phong,
            ViewerKey::M => ctx.display_mode = ctx.display_mode.next(),
            ViewerKey::R => ctx.reset_view(),
            _ => return moved,
        }
        true
    }

    pub fn key_up(&mut self, key: ViewerKey) {
        self.pressed.remove(&key);
    }

    /// Drop all held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    fn apply_held(&self, ctx: &mut RenderContext) -> bool {
        let mut changed = false;

        if self.is_pressed(ViewerKey::A) {
            ctx.model_rotation_deg = (ctx.model_rotation_deg - ROTATION_STEP_DEG) % 360.0;
            changed = true;
        } else if self.is_pressed(ViewerKey::D) {
            ctx.model_rotation_deg = (ctx.model_rotation_deg + ROTATION_STEP_DEG) % 360.0;
            changed = true;
        }

        if self.is_pressed(ViewerKey::ArrowLeft) {
            ctx.camera.orbit_y(-ORBIT_STEP_DEG.to_radians());
            changed = true;
        } else if self.is_pressed(ViewerKey::ArrowRight) {
            ctx.camera.orbit_y(ORBIT_STEP_DEG.to_radians());
            changed = true;
        }

        if self.is_pressed(ViewerKey::ArrowUp) {
            ctx.camera.dolly_z(DOLLY_STEP);
            changed = true;
        } else if self.is_pressed(ViewerKey::ArrowDown) {
            ctx.camera.dolly_z(-DOLLY_STEP);
            changed = true;
        }

        changed
    }
}
