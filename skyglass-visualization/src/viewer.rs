//! Interactive viewer window
//!
//! Owns the winit event loop: keyboard events go to the
//! [`KeyboardController`], the background loader is polled every frame
//! and each redraw plans and renders one frame.

use std::sync::Arc;

use skyglass_core::{Error, Result};
use tracing::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::config::ViewerConfig;
use crate::context::RenderContext;
use crate::frame::draw_frame;
use crate::input::{KeyboardController, ViewerKey};
use crate::loader::{LoadStatus, MeshLoader, PendingMesh};
use crate::renderer::MeshRenderer;

/// Translate a winit logical key into a viewer key
pub fn viewer_key(key: &Key) -> Option<ViewerKey> {
    match key {
        Key::Named(NamedKey::ArrowLeft) => Some(ViewerKey::ArrowLeft),
        Key::Named(NamedKey::ArrowRight) => Some(ViewerKey::ArrowRight),
        Key::Named(NamedKey::ArrowUp) => Some(ViewerKey::ArrowUp),
        Key::Named(NamedKey::ArrowDown) => Some(ViewerKey::ArrowDown),
        Key::Character(text) => match text.to_ascii_lowercase().as_str() {
            "a" => Some(ViewerKey::A),
            "d" => Some(ViewerKey::D),
            "m" => Some(ViewerKey::M),
            "r" => Some(ViewerKey::R),
            "1" => Some(ViewerKey::Digit1),
            "2" => Some(ViewerKey::Digit2),
            "3" => Some(ViewerKey::Digit3),
            _ => None,
        },
        _ => None,
    }
}

/// Window title showing the current interactive state
pub fn window_title(base: &str, ctx: &RenderContext) -> String {
    format!("{} - {}", base, ctx.status_line())
}

/// Interactive 3D viewer for a single OBJ mesh
pub struct InteractiveViewer {
    config: ViewerConfig,
}

impl InteractiveViewer {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Open the window and run until it is closed
    pub fn run(self) -> Result<()> {
        let config = self.config;

        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.window_title.as_str())
                .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer = pollster::block_on(MeshRenderer::new(window.clone(), &config))?;
        let mut ctx = RenderContext::from_config(&config);
        let (width, height) = renderer.size();
        ctx.camera.set_viewport(width, height);

        let mut keys = KeyboardController::new();
        let mut pending = Some(MeshLoader::spawn(&config.mesh_path, config.obj_options())?);
        info!(path = %config.mesh_path.display(), "loading mesh");

        window.set_title(&window_title(&config.window_title, &ctx));

        event_loop
            .run(move |event, target| match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::Resized(size) => {
                            renderer.resize(size.width, size.height);
                            ctx.camera.set_viewport(size.width, size.height);
                        }
                        WindowEvent::Focused(false) => keys.release_all(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key, state, ..
                                },
                            ..
                        } => {
                            if state == ElementState::Pressed
                                && logical_key == Key::Named(NamedKey::Escape)
                            {
                                target.exit();
                                return;
                            }
                            let Some(key) = viewer_key(&logical_key) else {
                                return;
                            };
                            match state {
                                ElementState::Pressed => {
                                    if keys.key_down(key, &mut ctx) {
                                        debug!(?key, status = %ctx.status_line(), "view changed");
                                        window.set_title(&window_title(&config.window_title, &ctx));
                                    }
                                }
                                ElementState::Released => keys.key_up(key),
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            poll_loader(&mut pending, &mut renderer);

                            let mesh_ready = renderer.mesh_ready();
                            let skybox_ready = renderer.skybox_ready();
                            if let Err(e) = draw_frame(&mut ctx, &mut renderer, mesh_ready, skybox_ready) {
                                error!(error = %e, "frame failed");
                                target.exit();
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            })
            .map_err(|e| Error::Visualization(format!("Event loop failed: {}", e)))
    }
}

/// Check the background load once; a finished load is uploaded or logged
/// and the handle dropped
fn poll_loader(pending: &mut Option<PendingMesh>, renderer: &mut MeshRenderer) {
    let Some(loading) = pending else { return };

    match loading.poll() {
        LoadStatus::Pending => {}
        LoadStatus::Ready(mesh) => {
            if let Err(e) = renderer.upload_mesh(&mesh) {
                error!(error = %e, "mesh upload failed");
            }
            *pending = None;
        }
        LoadStatus::Failed(e) => {
            error!(source = loading.source(), error = %e, "mesh could not be loaded; nothing will be drawn");
            *pending = None;
        }
    }
}
