use std::sync::Arc;

use arcane_core::geometry::{LogicalSize, PhysicalSize};
pub use winit::window::Window as WinitWindow;
use winit::{error::OsError, event_loop::ActiveEventLoop};

pub struct WindowDescriptor {
    pub title: String,
    pub resizable: bool,
    /// Inner size in logical pixels. `None` lets the platform decide.
    pub size: Option<LogicalSize<u32>>,
    pub visible: bool,
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self {
            title: "ARcane Engine".to_string(),
            resizable: true,
            size: None,
            visible: true,
        }
    }
}

impl WindowDescriptor {
    pub fn from_config(config: &arcane_core::config::EngineConfig) -> Self {
        Self {
            title: config.title.clone(),
            resizable: config.resizable,
            size: Some(LogicalSize::new(config.width, config.height)),
            visible: true,
        }
    }
}

pub struct Window {
    pub window: Arc<WinitWindow>,
}

impl Window {
    pub fn id(&self) -> winit::window::WindowId {
        self.window.id()
    }

    pub fn logical_size(&self) -> LogicalSize<u32> {
        self.physical_size().to_logical(self.window.scale_factor())
    }

    /// Size of the drawable area in pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        let size = self.window.inner_size();
        PhysicalSize::new(size.width, size.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub(crate) fn new(
        event_loop: &ActiveEventLoop,
        descriptor: WindowDescriptor,
    ) -> Result<Self, OsError> {
        let mut attributes = WinitWindow::default_attributes()
            .with_title(descriptor.title)
            .with_resizable(descriptor.resizable)
            .with_visible(descriptor.visible);

        if let Some(size) = descriptor.size {
            attributes =
                attributes.with_inner_size(winit::dpi::LogicalSize::new(size.width, size.height));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        tracing::info!(
            "Created window {:?} ({}x{})",
            window.id(),
            window.inner_size().width,
            window.inner_size().height
        );

        Ok(Window { window })
    }
}
