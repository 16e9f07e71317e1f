//! The application loop.
//!
//! [`Application::run`] opens a window, brings up the GPU and then, once per
//! frame, feeds window events down the [`LayerStack`] and updates every layer
//! against the window's swapchain image.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use arcane_core::config::{EngineConfig, ProfilingMode};
use arcane_core::geometry::PhysicalSize;
use arcane_core::profiling::{self, ProfilingBackend, profile_function, profile_scope};
use arcane_render::{
    GraphicsContext, GraphicsContextDescriptor, RenderError, WgpuBackend, WindowSurface,
};
use arcane_winit::app::{App, AppCtx, EventLoopError, OsError, run_app};
use arcane_winit::event::{Event, EventBatch, HandleStatus};
use arcane_winit::input::InputState;
use arcane_winit::window::{Window, WindowDescriptor};
use arcane_winit::{FrameTime, WindowId};

use crate::layer::{Graphics, Layer, LayerContext, LayerId, LayerStack};

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] OsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub struct Application {
    window: Window,
    surface: WindowSurface,
    backend: Arc<WgpuBackend>,
    graphics: Graphics,
    layers: LayerStack,
    input: InputState,
    frame_time: FrameTime,
    minimized: bool,
}

impl Application {
    /// Set up logging and profiling from `config`, open the window and run
    /// until it closes.
    ///
    /// `setup` runs once the window and renderers exist; push layers there.
    pub fn run<F>(config: EngineConfig, setup: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(&mut Application) + 'static,
    {
        match config.log_filter.as_deref() {
            Some(filter) => arcane_core::logging::init_with_filter(filter),
            None => arcane_core::logging::init(),
        }
        match config.profiling {
            ProfilingMode::Off => {}
            ProfilingMode::On => profiling::init_profiling(ProfilingBackend::InProcess),
            ProfilingMode::WithWebserver => profiling::init_profiling(ProfilingBackend::PuffinHttp),
        }

        let startup_error = Rc::new(RefCell::new(None));
        let factory_error = startup_error.clone();

        run_app(move |ctx| -> Box<dyn App> {
            match Application::new(ctx, &config) {
                Ok(mut app) => {
                    setup(&mut app);
                    Box::new(app)
                }
                Err(err) => {
                    tracing::error!("Failed to start application: {}", err);
                    *factory_error.borrow_mut() = Some(err);
                    ctx.exit();
                    Box::new(Stopped)
                }
            }
        })?;

        match startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn new(ctx: &mut AppCtx, config: &EngineConfig) -> Result<Self, ApplicationError> {
        profile_function!();
        let window = ctx.create_window(WindowDescriptor::from_config(config))?;

        let context = GraphicsContext::new_sync(GraphicsContextDescriptor::default())?;
        let surface = WindowSurface::new(context.clone(), &window, config.vsync)?;
        let backend = Arc::new(WgpuBackend::new(context));
        let graphics = Graphics::new(backend.clone())?;

        let size = window.physical_size();
        graphics.renderer.on_window_resize(size.width, size.height);

        Ok(Self {
            window,
            surface,
            backend,
            graphics,
            layers: LayerStack::new(),
            input: InputState::new(),
            frame_time: FrameTime::new(),
            minimized: size.is_zero_area(),
        })
    }

    pub fn push_layer(&mut self, mut layer: Box<dyn Layer>) -> LayerId {
        layer.on_attach(&mut self.graphics);
        self.layers.push_layer(layer)
    }

    pub fn push_overlay(&mut self, mut overlay: Box<dyn Layer>) -> LayerId {
        overlay.on_attach(&mut self.graphics);
        self.layers.push_overlay(overlay)
    }

    /// Detach and return a regular layer.
    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let mut layer = self.layers.pop_layer(id)?;
        layer.on_detach();
        Some(layer)
    }

    /// Detach and return an overlay.
    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let mut overlay = self.layers.pop_overlay(id)?;
        overlay.on_detach();
        Some(overlay)
    }

    pub fn graphics(&mut self) -> &mut Graphics {
        &mut self.graphics
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    fn on_event(&mut self, ctx: &AppCtx, event: &Event) -> HandleStatus {
        self.input.on_event(event);

        match event {
            Event::CloseRequested => {
                tracing::info!("Window close requested");
                ctx.exit();
                return HandleStatus::consumed();
            }
            Event::WindowResized(size) => self.on_resize(*size),
            _ => {}
        }

        self.layers.dispatch_event(event)
    }

    fn on_resize(&mut self, size: PhysicalSize<u32>) {
        self.minimized = size.is_zero_area();
        if self.minimized {
            tracing::debug!("Window minimized");
            return;
        }

        self.surface.resize(size);
        self.graphics
            .renderer
            .on_window_resize(size.width, size.height);
    }

    fn render_frame(&mut self) {
        profile_function!();
        let Some(frame) = self.surface.acquire() else {
            return;
        };

        self.backend
            .begin_frame(frame.view(), frame.format(), frame.size());
        {
            profile_scope!("update_layers");
            let mut ctx = LayerContext {
                graphics: &mut self.graphics,
                input: &self.input,
            };
            self.layers.update(&mut ctx, &self.frame_time);
        }
        self.backend.end_frame();

        frame.present();
    }
}

impl App for Application {
    fn update(&mut self, _ctx: &mut AppCtx, time: &FrameTime) {
        self.frame_time = time.clone();
    }

    fn render(&mut self, ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch) {
        if window_id != self.window.id() {
            return;
        }

        events.dispatch(|event| self.on_event(ctx, event));

        if !self.minimized {
            self.render_frame();
        }

        self.input.new_frame();
        self.window.request_redraw();
    }

    fn on_exit(&mut self) {
        tracing::info!("Shutting down, detaching {} layers", self.layers.len());
        self.layers.clear();
    }
}

/// Stand-in app for a failed startup while the event loop winds down.
struct Stopped;

impl App for Stopped {
    fn render(&mut self, _ctx: &mut AppCtx, _window_id: WindowId, _events: &mut EventBatch) {}
}
