use std::collections::HashMap;

pub use winit::error::{EventLoopError, OsError};
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use crate::{
    event::{Event, EventBatch, EventQueue, HandleStatus},
    time::{FrameTime, TimeTracker},
    window::{Window, WindowDescriptor},
};

struct WindowResources {
    events: EventQueue,
    scale_factor: f64,
}

pub struct AppCtx<'a> {
    event_loop: &'a ActiveEventLoop,
    windows: &'a mut HashMap<WindowId, WindowResources>,
}

impl AppCtx<'_> {
    pub fn create_window(&mut self, descriptor: WindowDescriptor) -> Result<Window, OsError> {
        let window = Window::new(self.event_loop, descriptor)?;

        self.windows.insert(
            window.id(),
            WindowResources {
                events: EventQueue::new(),
                scale_factor: window.scale_factor(),
            },
        );

        Ok(window)
    }

    pub fn exit(&self) {
        self.event_loop.exit();
    }
}

pub trait App {
    /// Called once when the event loop starts, after the app has been built.
    #[allow(unused_variables)]
    fn on_start(&mut self, ctx: &mut AppCtx) {}

    /// Called once per frame, before any window renders.
    #[allow(unused_variables)]
    fn update(&mut self, ctx: &mut AppCtx, time: &FrameTime) {}

    /// Called for every window that needs a redraw, with the events it received since
    /// its last redraw. Events left unconsumed get the default handling
    /// (`CloseRequested` exits the loop).
    fn render(&mut self, ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch);

    /// Called when the event loop is shutting down.
    fn on_exit(&mut self) {}
}

type AppFactory = Box<dyn FnOnce(&mut AppCtx) -> Box<dyn App>>;

struct AppProxy {
    factory: Option<AppFactory>,
    app: Option<Box<dyn App>>,
    update_called_this_frame: bool,
    windows: HashMap<WindowId, WindowResources>,
    time_tracker: TimeTracker,
}

impl winit::application::ApplicationHandler for AppProxy {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(factory) = self.factory.take() else {
            return;
        };

        let mut ctx = AppCtx {
            event_loop,
            windows: &mut self.windows,
        };
        let mut app = factory(&mut ctx);
        app.on_start(&mut ctx);
        self.app = Some(app);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.update_called_this_frame = false;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: winit::event::WindowEvent,
    ) {
        use winit::event::WindowEvent;

        let Some(app) = self.app.as_mut() else {
            return;
        };

        let mut ctx = AppCtx {
            event_loop,
            windows: &mut self.windows,
        };

        match event {
            WindowEvent::RedrawRequested => {
                if !self.update_called_this_frame {
                    let frame_time = self.time_tracker.tick();
                    arcane_core::profiling::new_frame();
                    app.update(&mut ctx, &frame_time);
                    self.update_called_this_frame = true;
                }

                let Some(window) = ctx.windows.get_mut(&window_id) else {
                    return;
                };
                let mut events = window.events.drain();

                app.render(&mut ctx, window_id, &mut events);

                events.dispatch(|event| match event {
                    Event::CloseRequested => {
                        tracing::info!("Close requested for window {:?}", window_id);
                        ctx.exit();
                        HandleStatus::consumed()
                    }
                    _ => HandleStatus::ignored(),
                });
            }
            event => {
                let Some(window) = self.windows.get_mut(&window_id) else {
                    return;
                };
                if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
                    window.scale_factor = scale_factor;
                }
                if let Some(event) = Event::from_winit(event, window.scale_factor) {
                    window.events.push(event);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.as_mut() {
            app.on_exit();
        }
    }
}

/// Run the event loop, building the app with `factory` once the loop is live.
pub fn run_app<F>(factory: F) -> Result<(), EventLoopError>
where
    F: FnOnce(&mut AppCtx) -> Box<dyn App> + 'static,
{
    use winit::event_loop::{ControlFlow, EventLoop};

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app_proxy = AppProxy {
        factory: Some(Box::new(factory)),
        app: None,
        update_called_this_frame: false,
        windows: HashMap::new(),
        time_tracker: TimeTracker::new(),
    };
    event_loop.run_app(&mut app_proxy)
}
