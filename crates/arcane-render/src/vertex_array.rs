use std::sync::Arc;

use crate::backend::{RenderBackend, VertexArrayHandle};
use crate::buffer::{IndexBuffer, VertexBuffer};

/// Binds vertex buffers and one index buffer together for a draw.
///
/// The vertex array keeps its buffers alive for as long as it exists.
pub struct VertexArray {
    backend: Arc<dyn RenderBackend>,
    handle: VertexArrayHandle,
    vertex_buffers: Vec<Arc<VertexBuffer>>,
    index_buffer: Option<Arc<IndexBuffer>>,
}

impl VertexArray {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        let handle = backend.create_vertex_array();
        Self {
            backend,
            handle,
            vertex_buffers: Vec::new(),
            index_buffer: None,
        }
    }

    pub fn bind(&self) {
        self.backend.bind_vertex_array(Some(self.handle));
    }

    pub fn unbind(&self) {
        self.backend.bind_vertex_array(None);
    }

    /// Attach a vertex buffer. Its attributes take the next free locations.
    ///
    /// # Panics
    /// If the buffer has no layout.
    pub fn add_vertex_buffer(&mut self, vertex_buffer: Arc<VertexBuffer>) {
        if vertex_buffer.layout().is_empty() {
            tracing::error!("vertex buffer {:?} has no layout", vertex_buffer.handle());
        }
        assert!(
            !vertex_buffer.layout().is_empty(),
            "vertex buffer has no layout"
        );

        self.backend
            .attach_vertex_buffer(self.handle, vertex_buffer.handle(), vertex_buffer.layout());
        self.vertex_buffers.push(vertex_buffer);
    }

    /// Set the index buffer, replacing any previous one.
    ///
    /// # Panics
    /// If the buffer holds no indices.
    pub fn set_index_buffer(&mut self, index_buffer: Arc<IndexBuffer>) {
        if index_buffer.count() == 0 {
            tracing::error!("index buffer {:?} has no indices", index_buffer.handle());
        }
        assert!(index_buffer.count() > 0, "index buffer has no indices");

        self.backend
            .attach_index_buffer(self.handle, index_buffer.handle(), index_buffer.count());
        self.index_buffer = Some(index_buffer);
    }

    pub fn vertex_buffers(&self) -> &[Arc<VertexBuffer>] {
        &self.vertex_buffers
    }

    pub fn index_buffer(&self) -> Option<&Arc<IndexBuffer>> {
        self.index_buffer.as_ref()
    }

    /// Index count of the attached index buffer, 0 without one.
    pub fn index_count(&self) -> u32 {
        self.index_buffer.as_ref().map_or(0, |ib| ib.count())
    }

    pub fn handle(&self) -> VertexArrayHandle {
        self.handle
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.backend.destroy_vertex_array(self.handle);
    }
}
