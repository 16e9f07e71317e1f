use std::sync::Arc;

use arcane_core::geometry::PhysicalSize;
use arcane_core::profiling::profile_function;
use arcane_winit::window::Window;

use crate::context::GraphicsContext;
use crate::error::{RenderError, Result};

/// A window's swapchain.
pub struct WindowSurface {
    context: Arc<GraphicsContext>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    /// Configure a surface for `window`.
    ///
    /// A linear (non-sRGB) format is preferred so colors written by shaders
    /// reach the screen unchanged.
    pub fn new(context: Arc<GraphicsContext>, window: &Window, vsync: bool) -> Result<Self> {
        let PhysicalSize { width, height } = window.physical_size();
        let surface = context.instance().create_surface(window.window.clone())?;

        let mut config = surface
            .get_default_config(context.adapter(), width.max(1), height.max(1))
            .ok_or(RenderError::SurfaceConfig)?;

        let capabilities = surface.get_capabilities(context.adapter());
        if let Some(format) = capabilities.formats.iter().find(|f| !f.is_srgb()) {
            config.format = *format;
        }
        config.present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        surface.configure(context.device(), &config);
        tracing::info!(
            "Configured surface {}x{} ({:?}, {:?})",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            context,
            surface,
            config,
        })
    }

    /// Reconfigure for a new window size. Zero-sized windows keep the old configuration.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.is_zero_area() {
            return;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(self.context.device(), &self.config);
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Acquire the next frame. Returns `None` when this frame should be skipped.
    pub fn acquire(&mut self) -> Option<SurfaceFrame> {
        profile_function!();

        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Some(SurfaceFrame {
                    texture,
                    view,
                    size: self.size(),
                })
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(self.context.device(), &self.config);
                None
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Timed out acquiring surface texture");
                None
            }
            Err(err) => {
                tracing::error!("Failed to acquire surface texture: {}", err);
                None
            }
        }
    }
}

/// One acquired swapchain image.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    size: PhysicalSize<u32>,
}

impl SurfaceFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.texture.format()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn present(self) {
        self.texture.present();
    }
}
