//! GPU buffers and the vertex attribute layout they are read with.

use std::sync::Arc;

use crate::backend::{BufferHandle, BufferKind, RenderBackend};

/// Data types understood by vertex layouts and shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size in bytes when tightly packed in a vertex.
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 4 * 2,
            ShaderDataType::Float3 => 4 * 3,
            ShaderDataType::Float4 => 4 * 4,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Int => 4,
            ShaderDataType::Int2 => 4 * 2,
            ShaderDataType::Int3 => 4 * 3,
            ShaderDataType::Int4 => 4 * 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Components per attribute location. Matrices span one location per column.
    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float => 1,
            ShaderDataType::Float2 => 2,
            ShaderDataType::Float3 => 3,
            ShaderDataType::Float4 => 4,
            ShaderDataType::Mat3 => 3,
            ShaderDataType::Mat4 => 4,
            ShaderDataType::Int => 1,
            ShaderDataType::Int2 => 2,
            ShaderDataType::Int3 => 3,
            ShaderDataType::Int4 => 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Number of attribute locations the type occupies.
    pub const fn location_count(self) -> u32 {
        match self {
            ShaderDataType::Mat3 => 3,
            ShaderDataType::Mat4 => 4,
            _ => 1,
        }
    }
}

/// One named attribute inside an interleaved vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferElement {
    pub name: String,
    pub data_type: ShaderDataType,
    pub size: u32,
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            size: data_type.size(),
            offset: 0,
            normalized: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Ordered attribute list with offsets and stride computed from the element sizes.
///
/// ```
/// use arcane_render::buffer::{BufferLayout, ShaderDataType};
///
/// let layout = BufferLayout::from_elements([
///     (ShaderDataType::Float3, "a_Position"),
///     (ShaderDataType::Float4, "a_Color"),
/// ]);
/// assert_eq!(layout.stride(), 28);
/// assert_eq!(layout.elements()[1].offset, 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(elements: impl IntoIterator<Item = BufferElement>) -> Self {
        let mut elements: Vec<BufferElement> = elements.into_iter().collect();
        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }

        Self {
            elements,
            stride: offset,
        }
    }

    pub fn from_elements<'a>(elements: impl IntoIterator<Item = (ShaderDataType, &'a str)>) -> Self {
        Self::new(
            elements
                .into_iter()
                .map(|(data_type, name)| BufferElement::new(data_type, name)),
        )
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferElement> {
        self.elements.iter()
    }
}

/// A GPU vertex buffer. Released when dropped.
pub struct VertexBuffer {
    backend: Arc<dyn RenderBackend>,
    handle: BufferHandle,
    size: u64,
    layout: BufferLayout,
}

impl VertexBuffer {
    /// Allocate `size` bytes of uninitialised vertex storage, for dynamic data.
    pub fn with_size(backend: Arc<dyn RenderBackend>, size: u64) -> Self {
        let handle = backend.create_vertex_buffer(size, None);
        Self {
            backend,
            handle,
            size,
            layout: BufferLayout::default(),
        }
    }

    /// Create a vertex buffer holding `data`.
    pub fn with_data(backend: Arc<dyn RenderBackend>, data: &[u8]) -> Self {
        let size = data.len() as u64;
        let handle = backend.create_vertex_buffer(size, Some(data));
        Self {
            backend,
            handle,
            size,
            layout: BufferLayout::default(),
        }
    }

    pub fn bind(&self) {
        self.backend.bind_buffer(BufferKind::Vertex, Some(self.handle));
    }

    pub fn unbind(&self) {
        self.backend.bind_buffer(BufferKind::Vertex, None);
    }

    /// Upload `data` to the start of the buffer.
    ///
    /// # Panics
    /// If `data` is larger than the buffer.
    pub fn set_data(&self, data: &[u8]) {
        if data.len() as u64 > self.size {
            tracing::error!(
                "vertex upload of {} bytes exceeds buffer size {}",
                data.len(),
                self.size
            );
        }
        assert!(
            data.len() as u64 <= self.size,
            "vertex upload of {} bytes exceeds buffer size {}",
            data.len(),
            self.size
        );
        self.backend.write_buffer(self.handle, 0, data);
    }

    pub fn set_layout(&mut self, layout: BufferLayout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.backend.destroy_buffer(self.handle);
    }
}

/// A GPU buffer of `u32` indices. Released when dropped.
pub struct IndexBuffer {
    backend: Arc<dyn RenderBackend>,
    handle: BufferHandle,
    count: u32,
}

impl IndexBuffer {
    pub fn new(backend: Arc<dyn RenderBackend>, indices: &[u32]) -> Self {
        let handle = backend.create_index_buffer(indices);
        Self {
            backend,
            handle,
            count: indices.len() as u32,
        }
    }

    pub fn bind(&self) {
        self.backend.bind_buffer(BufferKind::Index, Some(self.handle));
    }

    pub fn unbind(&self) {
        self.backend.bind_buffer(BufferKind::Index, None);
    }

    /// Number of indices in the buffer.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        self.backend.destroy_buffer(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(ShaderDataType::Float.size(), 4);
        assert_eq!(ShaderDataType::Float3.size(), 12);
        assert_eq!(ShaderDataType::Mat3.size(), 36);
        assert_eq!(ShaderDataType::Mat4.size(), 64);
        assert_eq!(ShaderDataType::Int4.size(), 16);
        assert_eq!(ShaderDataType::Bool.size(), 1);
    }

    #[test]
    fn test_component_counts() {
        assert_eq!(ShaderDataType::Float2.component_count(), 2);
        assert_eq!(ShaderDataType::Mat3.component_count(), 3);
        assert_eq!(ShaderDataType::Mat4.component_count(), 4);
        assert_eq!(ShaderDataType::Mat4.location_count(), 4);
        assert_eq!(ShaderDataType::Float4.location_count(), 1);
    }

    #[test]
    fn test_layout_offsets_and_stride() {
        let layout = BufferLayout::from_elements([
            (ShaderDataType::Float3, "a_Position"),
            (ShaderDataType::Float4, "a_Color"),
            (ShaderDataType::Float2, "a_TexCoord"),
            (ShaderDataType::Float, "a_TexIndex"),
            (ShaderDataType::Float, "a_TilingFactor"),
        ]);

        let offsets: Vec<u32> = layout.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 12, 28, 36, 40]);
        assert_eq!(layout.stride(), 44);
        assert_eq!(layout.elements()[4].name, "a_TilingFactor");
    }

    #[test]
    fn test_normalized_flag() {
        let layout = BufferLayout::new([
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color").normalized(),
        ]);
        assert!(!layout.elements()[0].normalized);
        assert!(layout.elements()[1].normalized);
    }

    #[test]
    fn test_empty_layout() {
        let layout = BufferLayout::default();
        assert!(layout.is_empty());
        assert_eq!(layout.stride(), 0);
    }
}
