//! Vertex buffers, index buffers and vertex arrays.

use std::sync::Arc;

use arcane_render::{
    BufferKind, BufferLayout, IndexBuffer, ShaderDataType, VertexArray, VertexBuffer,
};
use arcane_test_utils::{MockBackend, RenderCall};

fn position_layout() -> BufferLayout {
    BufferLayout::from_elements([(ShaderDataType::Float3, "a_Position")])
}

#[test]
fn test_vertex_buffer_data_and_bind() {
    let mock = Arc::new(MockBackend::new());
    let data: [f32; 3] = [1.0, 2.0, 3.0];
    let buffer = VertexBuffer::with_data(mock.clone(), bytemuck::cast_slice(&data));

    assert_eq!(buffer.size(), 12);
    assert_eq!(mock.read_vertices::<f32>(buffer.handle(), 3), data.to_vec());

    buffer.bind();
    buffer.unbind();
    assert!(mock.calls().ends_with(&[
        RenderCall::BindBuffer {
            kind: BufferKind::Vertex,
            buffer: Some(buffer.handle()),
        },
        RenderCall::BindBuffer {
            kind: BufferKind::Vertex,
            buffer: None,
        },
    ]));
}

#[test]
fn test_partial_upload() {
    let mock = Arc::new(MockBackend::new());
    let buffer = VertexBuffer::with_size(mock.clone(), 64);
    buffer.set_data(&[1; 16]);
    assert_eq!(mock.buffer_writes(buffer.handle()), vec![16]);
}

#[test]
#[should_panic(expected = "exceeds buffer size")]
fn test_upload_past_end_panics() {
    let mock = Arc::new(MockBackend::new());
    let buffer = VertexBuffer::with_size(mock, 8);
    buffer.set_data(&[0; 12]);
}

#[test]
fn test_index_buffer_count() {
    let mock = Arc::new(MockBackend::new());
    let buffer = IndexBuffer::new(mock.clone(), &[0, 1, 2, 2, 3, 0]);
    assert_eq!(buffer.count(), 6);
    assert!(mock.calls().contains(&RenderCall::CreateIndexBuffer {
        buffer: buffer.handle(),
        count: 6
    }));
}

#[test]
fn test_vertex_array_attaches_buffers() {
    let mock = Arc::new(MockBackend::new());
    let mut vertex_buffer = VertexBuffer::with_size(mock.clone(), 36);
    vertex_buffer.set_layout(position_layout());
    let vertex_buffer = Arc::new(vertex_buffer);

    let mut vertex_array = VertexArray::new(mock.clone());
    assert_eq!(vertex_array.index_count(), 0);
    vertex_array.add_vertex_buffer(vertex_buffer.clone());
    vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(mock.clone(), &[0, 1, 2])));

    assert_eq!(vertex_array.index_count(), 3);
    assert_eq!(vertex_array.vertex_buffers().len(), 1);
    assert!(mock.calls().contains(&RenderCall::AttachVertexBuffer {
        vertex_array: vertex_array.handle(),
        buffer: vertex_buffer.handle(),
        layout: position_layout(),
    }));
}

#[test]
#[should_panic(expected = "vertex buffer has no layout")]
fn test_vertex_buffer_without_layout_panics() {
    let mock = Arc::new(MockBackend::new());
    let mut vertex_array = VertexArray::new(mock.clone());
    vertex_array.add_vertex_buffer(Arc::new(VertexBuffer::with_size(mock, 16)));
}

#[test]
#[should_panic]
fn test_empty_index_buffer_panics() {
    let mock = Arc::new(MockBackend::new());
    let mut vertex_array = VertexArray::new(mock.clone());
    vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(mock, &[])));
}

#[test]
fn test_vertex_array_keeps_buffers_alive() {
    let mock = Arc::new(MockBackend::new());
    let mut vertex_buffer = VertexBuffer::with_size(mock.clone(), 36);
    vertex_buffer.set_layout(position_layout());

    let mut vertex_array = VertexArray::new(mock.clone());
    vertex_array.add_vertex_buffer(Arc::new(vertex_buffer));
    vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(mock.clone(), &[0, 1, 2])));
    assert_eq!(mock.live_buffers(), 2);

    drop(vertex_array);
    assert_eq!(mock.live_buffers(), 0);
}
