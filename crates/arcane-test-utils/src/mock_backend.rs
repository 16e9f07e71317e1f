//! A [`RenderBackend`] that records calls for verification in tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ahash::HashMap;
use arcane_render::backend::{
    BufferHandle, BufferKind, RenderBackend, ShaderDescriptor, ShaderHandle, TextureDescriptor,
    TextureHandle, VertexArrayHandle, Viewport,
};
use arcane_render::buffer::BufferLayout;
use arcane_render::{Color, RenderError, Result, UniformValue};
use parking_lot::Mutex;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateVertexBuffer {
        buffer: BufferHandle,
        size: u64,
    },
    CreateIndexBuffer {
        buffer: BufferHandle,
        count: u32,
    },
    WriteBuffer {
        buffer: BufferHandle,
        offset: u64,
        size: usize,
    },
    BindBuffer {
        kind: BufferKind,
        buffer: Option<BufferHandle>,
    },
    DestroyBuffer(BufferHandle),
    CreateVertexArray(VertexArrayHandle),
    AttachVertexBuffer {
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        layout: BufferLayout,
    },
    AttachIndexBuffer {
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        count: u32,
    },
    BindVertexArray(Option<VertexArrayHandle>),
    DestroyVertexArray(VertexArrayHandle),
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
    },
    WriteTexture {
        texture: TextureHandle,
        size: usize,
    },
    BindTexture {
        texture: TextureHandle,
        slot: u32,
    },
    DestroyTexture(TextureHandle),
    CreateShader {
        shader: ShaderHandle,
        name: String,
    },
    BindShader(Option<ShaderHandle>),
    SetUniform {
        shader: ShaderHandle,
        name: String,
        value: UniformValue,
    },
    DestroyShader(ShaderHandle),
    SetViewport(Viewport),
    SetClearColor(Color),
    Clear,
    SetBlending(bool),
    SetDepthTest(bool),
    DrawIndexed {
        index_count: u32,
        shader: Option<ShaderHandle>,
        vertex_array: Option<VertexArrayHandle>,
    },
}

#[derive(Debug, Clone)]
struct MockBuffer {
    kind: BufferKind,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct MockTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Default)]
struct Bound {
    shader: Option<ShaderHandle>,
    vertex_array: Option<VertexArrayHandle>,
}

/// Mock implementation of [`RenderBackend`].
///
/// Methods take `&self` and record into `Mutex`-guarded state, so the mock can
/// be shared as `Arc<dyn RenderBackend>` exactly like the real backend.
pub struct MockBackend {
    calls: Mutex<Vec<RenderCall>>,
    buffers: Mutex<HashMap<BufferHandle, MockBuffer>>,
    textures: Mutex<HashMap<TextureHandle, MockTexture>>,
    uniforms: Mutex<HashMap<(ShaderHandle, String), UniformValue>>,
    bound: Mutex<Bound>,
    next_id: AtomicU64,
    max_texture_dimension: u32,
    fail_shader_compilation: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            buffers: Mutex::new(HashMap::default()),
            textures: Mutex::new(HashMap::default()),
            uniforms: Mutex::new(HashMap::default()),
            bound: Mutex::new(Bound::default()),
            next_id: AtomicU64::new(1),
            max_texture_dimension: 8192,
            fail_shader_compilation: AtomicBool::new(false),
        }
    }

    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    /// Make every later `create_shader` fail with a compilation error.
    pub fn fail_shader_compilation(&self, fail: bool) {
        self.fail_shader_compilation.store(fail, Ordering::Relaxed);
    }

    fn record(&self, call: RenderCall) {
        self.calls.lock().push(call);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls (useful between test steps). Buffer contents are kept.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn count(&self, predicate: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    /// Index counts of every draw, in order.
    pub fn draw_calls(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::DrawIndexed { index_count, .. } => Some(*index_count),
                _ => None,
            })
            .collect()
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, RenderCall::DrawIndexed { .. }))
    }

    /// Sizes of every write to `buffer`, in order.
    pub fn buffer_writes(&self, buffer: BufferHandle) -> Vec<usize> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::WriteBuffer {
                    buffer: written,
                    size,
                    ..
                } if *written == buffer => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn count_buffer_writes(&self) -> usize {
        self.count(|call| matches!(call, RenderCall::WriteBuffer { .. }))
    }

    /// Current contents of a buffer.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<Vec<u8>> {
        self.buffers.lock().get(&buffer).map(|b| b.data.clone())
    }

    /// The first `count` records of a vertex buffer, read as `T`.
    pub fn read_vertices<T: bytemuck::Pod>(&self, buffer: BufferHandle, count: usize) -> Vec<T> {
        let data = self.buffer_data(buffer).unwrap_or_default();
        let bytes = (count * std::mem::size_of::<T>()).min(data.len());
        bytemuck::pod_collect_to_vec(&data[..bytes])
    }

    /// Handles of every vertex buffer created, in order.
    pub fn vertex_buffers(&self) -> Vec<BufferHandle> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::CreateVertexBuffer { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect()
    }

    /// Every `(texture, slot)` bind, in order.
    pub fn texture_binds(&self) -> Vec<(TextureHandle, u32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::BindTexture { texture, slot } => Some((*texture, *slot)),
                _ => None,
            })
            .collect()
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count(|call| matches!(call, RenderCall::CreateTexture { .. }))
    }

    pub fn count_shader_creates(&self) -> usize {
        self.count(|call| matches!(call, RenderCall::CreateShader { .. }))
    }

    /// Pixels last written to a texture.
    pub fn texture_data(&self, texture: TextureHandle) -> Option<Vec<u8>> {
        self.textures.lock().get(&texture).map(|t| t.data.clone())
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.lock().get(&texture).map(|t| (t.width, t.height))
    }

    pub fn live_textures(&self) -> usize {
        self.textures.lock().len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.lock().len()
    }

    /// The last value set for a uniform, declared or not.
    pub fn uniform(&self, shader: ShaderHandle, name: &str) -> Option<UniformValue> {
        self.uniforms
            .lock()
            .get(&(shader, name.to_owned()))
            .cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn create_vertex_buffer(&self, size: u64, data: Option<&[u8]>) -> BufferHandle {
        let buffer = BufferHandle::from_raw(self.next_id());
        let mut contents = vec![0; size as usize];
        if let Some(data) = data {
            contents[..data.len()].copy_from_slice(data);
        }
        self.buffers.lock().insert(
            buffer,
            MockBuffer {
                kind: BufferKind::Vertex,
                data: contents,
            },
        );
        self.record(RenderCall::CreateVertexBuffer { buffer, size });
        buffer
    }

    fn create_index_buffer(&self, indices: &[u32]) -> BufferHandle {
        let buffer = BufferHandle::from_raw(self.next_id());
        self.buffers.lock().insert(
            buffer,
            MockBuffer {
                kind: BufferKind::Index,
                data: bytemuck::cast_slice(indices).to_vec(),
            },
        );
        self.record(RenderCall::CreateIndexBuffer {
            buffer,
            count: indices.len() as u32,
        });
        buffer
    }

    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        if let Some(entry) = self.buffers.lock().get_mut(&buffer) {
            let start = offset as usize;
            let end = start + data.len();
            assert!(
                end <= entry.data.len(),
                "write of {} bytes at {} overflows {:?} buffer of {} bytes",
                data.len(),
                offset,
                entry.kind,
                entry.data.len()
            );
            entry.data[start..end].copy_from_slice(data);
        }
        self.record(RenderCall::WriteBuffer {
            buffer,
            offset,
            size: data.len(),
        });
    }

    fn bind_buffer(&self, kind: BufferKind, buffer: Option<BufferHandle>) {
        self.record(RenderCall::BindBuffer { kind, buffer });
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        self.buffers.lock().remove(&buffer);
        self.record(RenderCall::DestroyBuffer(buffer));
    }

    fn create_vertex_array(&self) -> VertexArrayHandle {
        let vertex_array = VertexArrayHandle::from_raw(self.next_id());
        self.record(RenderCall::CreateVertexArray(vertex_array));
        vertex_array
    }

    fn attach_vertex_buffer(
        &self,
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        layout: &BufferLayout,
    ) {
        self.record(RenderCall::AttachVertexBuffer {
            vertex_array,
            buffer,
            layout: layout.clone(),
        });
    }

    fn attach_index_buffer(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle, count: u32) {
        self.record(RenderCall::AttachIndexBuffer {
            vertex_array,
            buffer,
            count,
        });
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        self.bound.lock().vertex_array = vertex_array;
        self.record(RenderCall::BindVertexArray(vertex_array));
    }

    fn destroy_vertex_array(&self, vertex_array: VertexArrayHandle) {
        self.record(RenderCall::DestroyVertexArray(vertex_array));
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureHandle> {
        let (width, height) = (descriptor.width, descriptor.height);
        let max = self.max_texture_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::InvalidTextureSize { width, height, max });
        }

        let texture = TextureHandle::from_raw(self.next_id());
        self.textures.lock().insert(
            texture,
            MockTexture {
                width,
                height,
                data: vec![0; descriptor.byte_size()],
            },
        );
        self.record(RenderCall::CreateTexture {
            texture,
            width,
            height,
        });
        Ok(texture)
    }

    fn write_texture(&self, texture: TextureHandle, data: &[u8]) {
        if let Some(entry) = self.textures.lock().get_mut(&texture) {
            entry.data = data.to_vec();
        }
        self.record(RenderCall::WriteTexture {
            texture,
            size: data.len(),
        });
    }

    fn bind_texture(&self, texture: TextureHandle, slot: u32) {
        self.record(RenderCall::BindTexture { texture, slot });
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        self.textures.lock().remove(&texture);
        self.record(RenderCall::DestroyTexture(texture));
    }

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderHandle> {
        if self.fail_shader_compilation.load(Ordering::Relaxed) {
            return Err(RenderError::ShaderCompilation {
                name: descriptor.name.clone(),
                message: "compilation disabled by test".to_owned(),
            });
        }

        let shader = ShaderHandle::from_raw(self.next_id());
        self.record(RenderCall::CreateShader {
            shader,
            name: descriptor.name.clone(),
        });
        Ok(shader)
    }

    fn bind_shader(&self, shader: Option<ShaderHandle>) {
        self.bound.lock().shader = shader;
        self.record(RenderCall::BindShader(shader));
    }

    fn set_uniform(&self, shader: ShaderHandle, name: &str, value: &UniformValue) {
        self.uniforms
            .lock()
            .insert((shader, name.to_owned()), value.clone());
        self.record(RenderCall::SetUniform {
            shader,
            name: name.to_owned(),
            value: value.clone(),
        });
    }

    fn destroy_shader(&self, shader: ShaderHandle) {
        self.record(RenderCall::DestroyShader(shader));
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.record(RenderCall::SetViewport(viewport));
    }

    fn set_clear_color(&self, color: Color) {
        self.record(RenderCall::SetClearColor(color));
    }

    fn clear(&self) {
        self.record(RenderCall::Clear);
    }

    fn set_blending(&self, enabled: bool) {
        self.record(RenderCall::SetBlending(enabled));
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(RenderCall::SetDepthTest(enabled));
    }

    fn draw_indexed(&self, index_count: u32) {
        let bound = self.bound.lock();
        let call = RenderCall::DrawIndexed {
            index_count,
            shader: bound.shader,
            vertex_array: bound.vertex_array,
        };
        drop(bound);
        self.record(call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_contents_are_tracked() {
        let mock = MockBackend::new();
        let buffer = mock.create_vertex_buffer(8, None);
        mock.write_buffer(buffer, 4, &[1, 2, 3, 4]);

        assert_eq!(mock.buffer_data(buffer), Some(vec![0, 0, 0, 0, 1, 2, 3, 4]));
        assert_eq!(mock.buffer_writes(buffer), vec![4]);
        assert_eq!(mock.vertex_buffers(), vec![buffer]);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_write_past_end_panics() {
        let mock = MockBackend::new();
        let buffer = mock.create_vertex_buffer(4, None);
        mock.write_buffer(buffer, 2, &[0; 4]);
    }

    #[test]
    fn test_draw_records_bound_state() {
        let mock = MockBackend::new();
        let vertex_array = mock.create_vertex_array();
        mock.bind_vertex_array(Some(vertex_array));
        mock.draw_indexed(12);

        assert_eq!(mock.draw_calls(), vec![12]);
        assert!(mock.calls().contains(&RenderCall::DrawIndexed {
            index_count: 12,
            shader: None,
            vertex_array: Some(vertex_array),
        }));
    }

    #[test]
    fn test_texture_size_limit() {
        let mock = MockBackend::new().with_max_texture_dimension(16);
        assert!(mock.create_texture(&TextureDescriptor::new(16, 16)).is_ok());
        assert!(matches!(
            mock.create_texture(&TextureDescriptor::new(17, 1)),
            Err(RenderError::InvalidTextureSize { max: 16, .. })
        ));
        assert_eq!(mock.count_texture_creates(), 1);
    }

    #[test]
    fn test_clear_calls_keeps_resources() {
        let mock = MockBackend::new();
        let texture = mock.create_texture(&TextureDescriptor::new(1, 1)).unwrap();
        mock.write_texture(texture, &[9, 9, 9, 9]);
        mock.clear_calls();

        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.texture_data(texture), Some(vec![9, 9, 9, 9]));
        assert_eq!(mock.live_textures(), 1);
    }
}
