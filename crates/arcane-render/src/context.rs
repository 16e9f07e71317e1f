use std::sync::Arc;

use crate::error::{RenderError, Result};

/// Texture units addressable by one draw. Matches the `u_Textures` binding array.
pub const MAX_TEXTURE_UNITS: u32 = 32;

/// Options for creating a [`GraphicsContext`].
#[derive(Debug, Clone)]
pub struct GraphicsContextDescriptor {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub force_fallback_adapter: bool,
    /// Base limits. The texture array limits needed by the renderers are raised on top.
    pub limits: wgpu::Limits,
    pub label: Option<&'static str>,
}

impl Default for GraphicsContextDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            limits: wgpu::Limits::default(),
            label: Some("ARcane Device"),
        }
    }
}

/// The wgpu instance, adapter, device and queue shared by every surface and
/// by the backend.
pub struct GraphicsContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GraphicsContext {
    /// Features every ARcane device must support: indexing a texture array
    /// with a per-vertex slot.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::TEXTURE_BINDING_ARRAY
            | wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING
    }

    pub async fn new(descriptor: GraphicsContextDescriptor) -> Result<Arc<Self>> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await?;

        let required = Self::required_features();
        let available = adapter.features();
        if !available.contains(required) {
            let missing = required.difference(available);
            tracing::error!(
                "Adapter '{}' is missing required features {:?}",
                adapter.get_info().name,
                missing
            );
            return Err(RenderError::MissingFeatures { missing });
        }

        let mut limits = descriptor.limits.clone();
        limits.max_binding_array_elements_per_shader_stage = limits
            .max_binding_array_elements_per_shader_stage
            .max(MAX_TEXTURE_UNITS);
        limits.max_sampled_textures_per_shader_stage = limits
            .max_sampled_textures_per_shader_stage
            .max(MAX_TEXTURE_UNITS);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: descriptor.label,
                required_features: required,
                required_limits: limits,
                ..Default::default()
            })
            .await?;

        let info = adapter.get_info();
        tracing::info!(
            "Created graphics context on '{}' ({:?})",
            info.name,
            info.backend
        );

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }

    /// Blocks the current thread until the context is created.
    pub fn new_sync(descriptor: GraphicsContextDescriptor) -> Result<Arc<Self>> {
        pollster::block_on(Self::new(descriptor))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    #[inline]
    pub fn max_texture_dimension_2d(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

impl std::fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("adapter", &self.adapter.get_info().name)
            .finish()
    }
}
