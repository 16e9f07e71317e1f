//! [`RenderBackend`] implemented on wgpu.
//!
//! Bound state (shader, vertex array, texture units, viewport, blending and
//! depth test) is tracked on the CPU. Every [`RenderBackend::draw_indexed`]
//! turns that state into one render pass against the current frame target,
//! so draws, uniform writes and buffer uploads reach the GPU in call order.

mod pipeline;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::HashMap;
use arcane_core::geometry::PhysicalSize;
use arcane_core::profiling::{profile_function, profile_scope};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use super::{
    BufferHandle, BufferKind, RenderBackend, ShaderDescriptor, ShaderHandle, TextureDescriptor,
    TextureHandle, VertexArrayHandle, Viewport,
};
use crate::buffer::BufferLayout;
use crate::color::Color;
use crate::context::{GraphicsContext, MAX_TEXTURE_UNITS};
use crate::error::{RenderError, Result};
use crate::shader::uniform::{UniformLayout, UniformValue};

pub use pipeline::{DEPTH_FORMAT, TEXTURE_FORMAT};

const UNIT_COUNT: usize = MAX_TEXTURE_UNITS as usize;

struct BufferEntry {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

#[derive(Default)]
struct VertexArrayEntry {
    vertex_buffers: Vec<(BufferHandle, BufferLayout)>,
    index_buffer: Option<(BufferHandle, u32)>,
}

struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct ShaderEntry {
    name: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniforms: UniformLayout,
    uniform_data: Vec<u8>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms_dirty: bool,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    shader: ShaderHandle,
    buffers: Vec<BufferLayout>,
    format: wgpu::TextureFormat,
    blending: bool,
    depth_test: bool,
}

struct RenderTarget {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: PhysicalSize<u32>,
}

struct TextureUnits {
    bound: [Option<TextureHandle>; UNIT_COUNT],
    /// Bind group for the bound set it was built from.
    cached: Option<([Option<TextureHandle>; UNIT_COUNT], wgpu::BindGroup)>,
}

struct State {
    buffers: HashMap<BufferHandle, BufferEntry>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexArrayEntry>,
    textures: HashMap<TextureHandle, TextureEntry>,
    shaders: HashMap<ShaderHandle, ShaderEntry>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    bound_buffers: [Option<BufferHandle>; 2],
    bound_shader: Option<ShaderHandle>,
    bound_vertex_array: Option<VertexArrayHandle>,
    units: TextureUnits,

    viewport: Option<Viewport>,
    clear_color: Color,
    blending: bool,
    depth_test: bool,

    target: Option<RenderTarget>,
    depth: Option<DepthBuffer>,
}

pub struct WgpuBackend {
    context: Arc<GraphicsContext>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    _fallback_texture: wgpu::Texture,
    fallback_view: wgpu::TextureView,
    next_id: AtomicU64,
    state: Mutex<State>,
}

impl WgpuBackend {
    pub fn new(context: Arc<GraphicsContext>) -> Self {
        profile_function!();
        let device = context.device();

        let uniform_layout = pipeline::create_uniform_bind_group_layout(device);
        let texture_layout = pipeline::create_texture_bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("arcane_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let sampler = pipeline::create_sampler(device);
        let (fallback_texture, fallback_view) =
            pipeline::create_fallback_texture(device, context.queue());

        tracing::info!("Created wgpu render backend");

        Self {
            context,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            _fallback_texture: fallback_texture,
            fallback_view,
            next_id: AtomicU64::new(1),
            state: Mutex::new(State {
                buffers: HashMap::default(),
                vertex_arrays: HashMap::default(),
                textures: HashMap::default(),
                shaders: HashMap::default(),
                pipelines: HashMap::default(),
                bound_buffers: [None; 2],
                bound_shader: None,
                bound_vertex_array: None,
                units: TextureUnits {
                    bound: [None; UNIT_COUNT],
                    cached: None,
                },
                viewport: None,
                clear_color: Color::BLACK,
                blending: false,
                depth_test: false,
                target: None,
                depth: None,
            }),
        }
    }

    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// Direct subsequent clears and draws at `view` until [`WgpuBackend::end_frame`].
    pub fn begin_frame(
        &self,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
    ) {
        let mut state = self.state.lock();
        state.target = Some(RenderTarget {
            view: view.clone(),
            format,
            size,
        });
    }

    pub fn end_frame(&self) {
        self.state.lock().target = None;
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn compile_module(&self, name: &str, stage: &str, source: &str) -> Result<wgpu::ShaderModule> {
        let device = self.context.device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name} ({stage})")),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!("{} shader compilation failure in '{}': {}", stage, name, error);
            return Err(RenderError::ShaderCompilation {
                name: name.to_owned(),
                message: error.to_string(),
            });
        }
        Ok(module)
    }

    fn ensure_depth(&self, state: &mut State, size: PhysicalSize<u32>) {
        if state.depth.as_ref().is_some_and(|depth| depth.size == size) {
            return;
        }
        let (texture, view) =
            pipeline::create_depth_texture(self.context.device(), size.width, size.height);
        state.depth = Some(DepthBuffer {
            _texture: texture,
            view,
            size,
        });
    }

    fn ensure_texture_bind_group(&self, state: &mut State) {
        let bound = state.units.bound;
        if state
            .units
            .cached
            .as_ref()
            .is_some_and(|(key, _)| *key == bound)
        {
            return;
        }

        let views: Vec<&wgpu::TextureView> = bound
            .iter()
            .map(|unit| {
                unit.and_then(|handle| state.textures.get(&handle))
                    .map_or(&self.fallback_view, |entry| &entry.view)
            })
            .collect();

        let bind_group = self
            .context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("arcane_texture_units"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureViewArray(&views),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

        state.units.cached = Some((bound, bind_group));
    }

    fn ensure_pipeline(&self, state: &mut State, key: &PipelineKey) -> bool {
        if state.pipelines.contains_key(key) {
            return true;
        }
        let Some(shader) = state.shaders.get(&key.shader) else {
            return false;
        };

        let pipeline = pipeline::create_render_pipeline(
            self.context.device(),
            &pipeline::PipelineDescriptor {
                label: &shader.name,
                layout: &self.pipeline_layout,
                vertex: &shader.vertex,
                fragment: &shader.fragment,
                buffers: &key.buffers,
                target_format: key.format,
                blending: key.blending,
                depth_test: key.depth_test,
            },
        );
        tracing::debug!(
            "Created pipeline for shader '{}' (blending: {}, depth test: {})",
            shader.name,
            key.blending,
            key.depth_test
        );
        state.pipelines.insert(key.clone(), pipeline);
        true
    }

    /// GL-style viewport (origin bottom-left) converted to a wgpu viewport
    /// inside the target. `None` when nothing of it is visible.
    fn effective_viewport(viewport: Option<Viewport>, target: PhysicalSize<u32>) -> Option<[f32; 4]> {
        let viewport = viewport.unwrap_or(Viewport::new(0, 0, target.width, target.height));
        let x = viewport.x.min(target.width);
        let y = viewport.y.min(target.height);
        let width = viewport.width.min(target.width - x);
        let height = viewport.height.min(target.height - y);
        if width == 0 || height == 0 {
            return None;
        }
        let top = target.height - y - height;
        Some([x as f32, top as f32, width as f32, height as f32])
    }
}

impl RenderBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn max_texture_dimension(&self) -> u32 {
        self.context.max_texture_dimension_2d()
    }

    fn create_vertex_buffer(&self, size: u64, data: Option<&[u8]>) -> BufferHandle {
        let handle = BufferHandle::from_raw(self.next_id());
        let device = self.context.device();
        let usage = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;

        let buffer = match data {
            Some(data) => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("arcane_vertex_buffer"),
                contents: data,
                usage,
            }),
            None => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("arcane_vertex_buffer"),
                size: size.max(4).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
                usage,
                mapped_at_creation: false,
            }),
        };

        self.state.lock().buffers.insert(
            handle,
            BufferEntry {
                buffer,
                kind: BufferKind::Vertex,
            },
        );
        handle
    }

    fn create_index_buffer(&self, indices: &[u32]) -> BufferHandle {
        let handle = BufferHandle::from_raw(self.next_id());
        let buffer = self
            .context
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("arcane_index_buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });

        self.state.lock().buffers.insert(
            handle,
            BufferEntry {
                buffer,
                kind: BufferKind::Index,
            },
        );
        handle
    }

    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let state = self.state.lock();
        let Some(entry) = state.buffers.get(&buffer) else {
            tracing::error!("write to unknown buffer {:?}", buffer);
            return;
        };

        let queue = self.context.queue();
        if data.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
            queue.write_buffer(&entry.buffer, offset, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(
                (data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT) as usize,
                0,
            );
            queue.write_buffer(&entry.buffer, offset, &padded);
        }
    }

    fn bind_buffer(&self, kind: BufferKind, buffer: Option<BufferHandle>) {
        let mut state = self.state.lock();
        if let Some(handle) = buffer
            && state.buffers.get(&handle).is_some_and(|entry| entry.kind != kind)
        {
            tracing::warn!("buffer {:?} bound as {:?}", handle, kind);
        }
        state.bound_buffers[kind as usize] = buffer;
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut state = self.state.lock();
        if let Some(entry) = state.buffers.remove(&buffer) {
            entry.buffer.destroy();
        }
        for bound in &mut state.bound_buffers {
            if *bound == Some(buffer) {
                *bound = None;
            }
        }
    }

    fn create_vertex_array(&self) -> VertexArrayHandle {
        let handle = VertexArrayHandle::from_raw(self.next_id());
        self.state
            .lock()
            .vertex_arrays
            .insert(handle, VertexArrayEntry::default());
        handle
    }

    fn attach_vertex_buffer(
        &self,
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        layout: &BufferLayout,
    ) {
        let mut state = self.state.lock();
        match state.vertex_arrays.get_mut(&vertex_array) {
            Some(entry) => entry.vertex_buffers.push((buffer, layout.clone())),
            None => tracing::error!("attach to unknown vertex array {:?}", vertex_array),
        }
    }

    fn attach_index_buffer(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle, count: u32) {
        let mut state = self.state.lock();
        match state.vertex_arrays.get_mut(&vertex_array) {
            Some(entry) => entry.index_buffer = Some((buffer, count)),
            None => tracing::error!("attach to unknown vertex array {:?}", vertex_array),
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        self.state.lock().bound_vertex_array = vertex_array;
    }

    fn destroy_vertex_array(&self, vertex_array: VertexArrayHandle) {
        let mut state = self.state.lock();
        state.vertex_arrays.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureHandle> {
        let max = self.max_texture_dimension();
        let (width, height) = (descriptor.width, descriptor.height);
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::InvalidTextureSize { width, height, max });
        }

        let handle = TextureHandle::from_raw(self.next_id());
        let (texture, view) = pipeline::create_texture(
            self.context.device(),
            descriptor.label.as_deref(),
            width,
            height,
        );

        self.state.lock().textures.insert(
            handle,
            TextureEntry {
                texture,
                view,
                width,
                height,
            },
        );
        Ok(handle)
    }

    fn write_texture(&self, texture: TextureHandle, data: &[u8]) {
        let state = self.state.lock();
        let Some(entry) = state.textures.get(&texture) else {
            tracing::error!("write to unknown texture {:?}", texture);
            return;
        };
        let expected = entry.width as usize * entry.height as usize * 4;
        if data.len() != expected {
            tracing::error!(
                "texture {:?} upload of {} bytes, expected {}",
                texture,
                data.len(),
                expected
            );
            return;
        }
        pipeline::write_texture(
            self.context.queue(),
            &entry.texture,
            entry.width,
            entry.height,
            data,
        );
    }

    fn bind_texture(&self, texture: TextureHandle, slot: u32) {
        let mut state = self.state.lock();
        match state.units.bound.get_mut(slot as usize) {
            Some(unit) => *unit = Some(texture),
            None => tracing::error!(
                "texture unit {} out of range (max {})",
                slot,
                MAX_TEXTURE_UNITS
            ),
        }
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        let mut state = self.state.lock();
        if let Some(entry) = state.textures.remove(&texture) {
            entry.texture.destroy();
        }
        let mut unbound = false;
        for unit in &mut state.units.bound {
            if *unit == Some(texture) {
                *unit = None;
                unbound = true;
            }
        }
        if unbound {
            state.units.cached = None;
        }
    }

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderHandle> {
        profile_function!();

        let vertex = self.compile_module(&descriptor.name, "vertex", &descriptor.vertex_source)?;
        let fragment =
            self.compile_module(&descriptor.name, "fragment", &descriptor.fragment_source)?;

        let uniforms = descriptor.uniforms.clone();
        let uniform_size = u64::from(uniforms.size()).max(16);
        let device = self.context.device();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} uniforms", descriptor.name)),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} uniforms", descriptor.name)),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let handle = ShaderHandle::from_raw(self.next_id());
        self.state.lock().shaders.insert(
            handle,
            ShaderEntry {
                name: descriptor.name.clone(),
                vertex,
                fragment,
                uniforms,
                uniform_data: vec![0; uniform_size as usize],
                uniform_buffer,
                bind_group,
                uniforms_dirty: true,
            },
        );
        Ok(handle)
    }

    fn bind_shader(&self, shader: Option<ShaderHandle>) {
        self.state.lock().bound_shader = shader;
    }

    fn set_uniform(&self, shader: ShaderHandle, name: &str, value: &UniformValue) {
        let mut state = self.state.lock();
        let Some(entry) = state.shaders.get_mut(&shader) else {
            tracing::error!("uniform '{}' set on unknown shader {:?}", name, shader);
            return;
        };
        if entry.uniforms.write(&mut entry.uniform_data, name, value) {
            entry.uniforms_dirty = true;
        } else {
            tracing::trace!("shader '{}' has no uniform '{}' of that type", entry.name, name);
        }
    }

    fn destroy_shader(&self, shader: ShaderHandle) {
        let mut state = self.state.lock();
        if let Some(entry) = state.shaders.remove(&shader) {
            entry.uniform_buffer.destroy();
        }
        state.pipelines.retain(|key, _| key.shader != shader);
        if state.bound_shader == Some(shader) {
            state.bound_shader = None;
        }
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.lock().viewport = Some(viewport);
    }

    fn set_clear_color(&self, color: Color) {
        self.state.lock().clear_color = color;
    }

    fn clear(&self) {
        profile_function!();
        let mut state = self.state.lock();
        let Some(target) = state.target.as_ref() else {
            tracing::trace!("clear without a frame target");
            return;
        };
        let size = target.size;
        self.ensure_depth(&mut state, size);

        let state = &*state;
        let (Some(target), Some(depth)) = (state.target.as_ref(), state.depth.as_ref()) else {
            return;
        };

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("arcane_clear"),
                });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("arcane_clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(state.clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.context.queue().submit(std::iter::once(encoder.finish()));
    }

    fn set_blending(&self, enabled: bool) {
        self.state.lock().blending = enabled;
    }

    fn set_depth_test(&self, enabled: bool) {
        self.state.lock().depth_test = enabled;
    }

    fn draw_indexed(&self, index_count: u32) {
        profile_function!();
        if index_count == 0 {
            return;
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(target) = state.target.as_ref() else {
            tracing::warn!("draw without a frame target");
            return;
        };
        let (target_format, target_size) = (target.format, target.size);
        let Some(viewport) = Self::effective_viewport(state.viewport, target_size) else {
            return;
        };
        let Some(shader_handle) = state.bound_shader else {
            tracing::error!("draw with no shader bound");
            return;
        };
        let Some(vertex_array) = state
            .bound_vertex_array
            .and_then(|handle| state.vertex_arrays.get(&handle))
        else {
            tracing::error!("draw with no vertex array bound");
            return;
        };
        let Some((index_buffer, available)) = vertex_array.index_buffer else {
            tracing::error!("draw with a vertex array that has no index buffer");
            return;
        };
        let index_count = if index_count > available {
            tracing::warn!("draw of {} indices clamped to {}", index_count, available);
            available
        } else {
            index_count
        };

        let key = PipelineKey {
            shader: shader_handle,
            buffers: vertex_array
                .vertex_buffers
                .iter()
                .map(|(_, layout)| layout.clone())
                .collect(),
            format: target_format,
            blending: state.blending,
            depth_test: state.depth_test,
        };
        let vertex_buffers: Vec<BufferHandle> = vertex_array
            .vertex_buffers
            .iter()
            .map(|(handle, _)| *handle)
            .collect();

        if !self.ensure_pipeline(state, &key) {
            tracing::error!("draw with unknown shader {:?}", shader_handle);
            return;
        }
        self.ensure_texture_bind_group(state);
        self.ensure_depth(state, target_size);

        let queue = self.context.queue();
        let Some(shader) = state.shaders.get_mut(&shader_handle) else {
            return;
        };
        if shader.uniforms_dirty {
            queue.write_buffer(&shader.uniform_buffer, 0, &shader.uniform_data);
            shader.uniforms_dirty = false;
        }

        let state = &*state;
        let (Some(target), Some(depth), Some(shader), Some(pipeline), Some((_, texture_group))) = (
            state.target.as_ref(),
            state.depth.as_ref(),
            state.shaders.get(&shader_handle),
            state.pipelines.get(&key),
            state.units.cached.as_ref(),
        ) else {
            return;
        };
        let Some(index_buffer) = state.buffers.get(&index_buffer) else {
            tracing::error!("index buffer {:?} was destroyed", index_buffer);
            return;
        };

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("arcane_draw"),
                });
        {
            profile_scope!("encode_pass");
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("arcane_draw"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let [x, y, width, height] = viewport;
            pass.set_viewport(x, y, width, height, 0.0, 1.0);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &shader.bind_group, &[]);
            pass.set_bind_group(1, texture_group, &[]);
            for (slot, handle) in vertex_buffers.iter().enumerate() {
                match state.buffers.get(handle) {
                    Some(entry) => pass.set_vertex_buffer(slot as u32, entry.buffer.slice(..)),
                    None => {
                        tracing::error!("vertex buffer {:?} was destroyed", handle);
                        return;
                    }
                }
            }
            pass.set_index_buffer(index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..index_count, 0, 0..1);
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_defaults_to_target() {
        let target = PhysicalSize::new(800, 600);
        assert_eq!(
            WgpuBackend::effective_viewport(None, target),
            Some([0.0, 0.0, 800.0, 600.0])
        );
    }

    #[test]
    fn test_viewport_is_flipped_and_clamped() {
        let target = PhysicalSize::new(800, 600);
        let viewport = Viewport::new(100, 50, 1000, 100);
        assert_eq!(
            WgpuBackend::effective_viewport(Some(viewport), target),
            Some([100.0, 450.0, 700.0, 100.0])
        );
        assert_eq!(
            WgpuBackend::effective_viewport(Some(Viewport::new(0, 0, 0, 10)), target),
            None
        );
    }
}
