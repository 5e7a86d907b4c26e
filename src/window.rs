//! Windowed runner.
//!
//! Opens a square window sized to the arena, steps the swarm once per
//! redraw and presents the framebuffer through [`Presenter`]. The latest
//! light reading is shown in the window title. Escape, Backspace or closing
//! the window stops the swarm.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::error::SwarmError;
use crate::gpu::Presenter;
use crate::swarm::PhotonSwarm;

struct App {
    swarm: PhotonSwarm,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    error: Option<SwarmError>,
    title: String,
}

impl App {
    fn new(swarm: PhotonSwarm) -> Self {
        let title = swarm.readout();
        Self {
            swarm,
            window: None,
            presenter: None,
            error: None,
            title,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SwarmError) {
        tracing::error!("{error}");
        self.error = Some(error);
        self.swarm.shutdown_handle().trigger();
        event_loop.exit();
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        tracing::info!(frames = self.swarm.scheduler().time().frame(), "shutting down");
        self.swarm.shutdown_handle().trigger();
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.swarm.tick();

        if let Some(presenter) = &mut self.presenter {
            presenter.upload(self.swarm.framebuffer());
            match presenter.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    presenter.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory");
                    self.shutdown(event_loop);
                    return;
                }
                Err(e) => tracing::warn!("render error: {:?}", e),
            }
        }

        let title = self.swarm.readout();
        if let Some(window) = &self.window {
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let side = self.swarm.config().surface_side();
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(side, side));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        let (width, height) = self.swarm.simulation().surface_size();
        match pollster::block_on(Presenter::new(window.clone(), width, height)) {
            Ok(presenter) => {
                self.presenter = Some(presenter);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape | KeyCode::Backspace),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.swarm.is_shutdown() {
            event_loop.exit();
        }
    }
}

/// Run `swarm` in a window until it is closed.
pub fn run(swarm: PhotonSwarm) -> Result<(), SwarmError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(swarm);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
