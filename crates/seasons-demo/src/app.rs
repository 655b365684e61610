//! Windowed application implementing winit's ApplicationHandler

use std::sync::Arc;

use seasons_core::DemoConfig;
use seasons_render::{FrameTarget, RenderContext, RenderError};
use seasons_runtime::Season;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::scene::Scene;

/// Pixels of touchpad scrolling treated as one wheel line
const PIXELS_PER_LINE: f64 = 40.0;

pub struct SeasonsApp {
    scene: Scene,
    first_season: Season,
    fullscreen: bool,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    /// First fatal error; the loop exits and `main` reports it
    failure: Option<RenderError>,
}

impl SeasonsApp {
    pub fn new(config: DemoConfig, first_season: Season, fullscreen: bool) -> Self {
        Self {
            scene: Scene::new(config),
            first_season,
            fullscreen,
            window: None,
            render_context: None,
            failure: None,
        }
    }

    /// Error that stopped the event loop, if any
    pub fn take_failure(&mut self) -> Option<RenderError> {
        self.failure.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RenderError> {
        let window_config = &self.scene.config().window;
        let window_attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?,
        );
        if self.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        self.window = Some(window.clone());

        let render_context = pollster::block_on(RenderContext::new(window))?;
        self.scene.start(render_context.gpu(), self.first_season)?;
        self.render_context = Some(render_context);

        info!("Controls: arrows/left-drag look, WASD move, wheel zoom, R reset weather, 1 next season, Esc quit");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RenderError) {
        error!(error = %err, "Stopping");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let Some(context) = &mut self.render_context else {
            return Ok(());
        };

        if !self.scene.flags.should_render() {
            self.scene.input.end_frame();
            return Ok(());
        }

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(RenderError::SurfaceError(e.to_string())),
        };
        // A skipped frame's time folds into the next tick's delta
        self.scene.clock.tick();

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let target = FrameTarget {
            color: &view,
            depth: &context.depth_view,
        };
        self.scene.frame(context.gpu(), target)?;

        output.present();
        Ok(())
    }
}

impl ApplicationHandler for SeasonsApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.initialize(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.scene.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
                self.scene.resize(new_size.width, new_size.height);
            }

            WindowEvent::Focused(focused) => {
                self.scene.set_focused(focused);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if key_code == KeyCode::Escape && event.state == ElementState::Pressed {
                        self.scene.shutdown();
                        event_loop.exit();
                        return;
                    }
                    self.scene.input.on_key(key_code, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.scene.input.on_button(button, state);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                self.scene.input.on_wheel(lines);
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.scene.input.on_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
