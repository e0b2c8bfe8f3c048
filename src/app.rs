//! Native demo shell: one window, one [`Engine`], one [`GpuState`].
//!
//! Window events are translated by [`Input`] and stamped with the frame
//! clock; every redraw advances the engine and renders its frame state.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::engine::{Engine, Response};
use crate::error::AppError;
use crate::gpu::GpuState;
use crate::input::Input;
use crate::time::Time;

/// Open a window and run `config` until it is closed.
pub fn run(config: SceneConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    engine: Engine,
    input: Input,
    clock: Time,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// Status line currently shown in the title bar.
    shown_status: String,
    /// First fatal error; reported once the loop has exited.
    error: Option<AppError>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            engine: Engine::new(config),
            input: Input::new(),
            clock: Time::new(),
            window: None,
            gpu_state: None,
            shown_status: String::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_config = &self.engine.config().window;
        let window_attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(window_config.width, window_config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.engine.resize(size.width, size.height);

        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            self.engine.particles(),
            self.engine.ambient_field(),
        ))?;
        self.gpu_state = Some(gpu_state);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.update();
        let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) else {
            return;
        };

        let frame = self.engine.frame(now);
        match gpu_state.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }

        if frame.status != self.shown_status {
            self.shown_status = frame.status.to_string();
            let title = &self.engine.config().window.title;
            if self.shown_status.is_empty() {
                window.set_title(title);
            } else {
                window.set_title(&format!("{} - {}", title, self.shown_status));
            }
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(*physical_size);
                }
                self.engine.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        if let Some(input_event) = self.input.translate(&event) {
            if self.engine.handle_input(input_event, self.clock.instant_ms()) == Response::Exit {
                event_loop.exit();
            }
        }
    }
}
