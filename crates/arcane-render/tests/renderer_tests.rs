//! Scene submission against the recording mock backend.

use std::sync::Arc;

use arcane_render::shader::builtin;
use arcane_render::{
    BufferLayout, Camera, Color, IndexBuffer, OrthographicCamera, ProjectionCamera, Renderer,
    Shader, ShaderDataType, UniformValue, VertexArray, VertexBuffer, Viewport,
};
use arcane_test_utils::{MockBackend, RenderCall};
use glam::{Mat4, Vec3};

fn triangle(mock: &Arc<MockBackend>) -> VertexArray {
    let positions: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
    let mut vertex_buffer = VertexBuffer::with_data(mock.clone(), bytemuck::cast_slice(&positions));
    vertex_buffer.set_layout(BufferLayout::from_elements([(
        ShaderDataType::Float3,
        "a_Position",
    )]));

    let mut vertex_array = VertexArray::new(mock.clone());
    vertex_array.add_vertex_buffer(Arc::new(vertex_buffer));
    vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(mock.clone(), &[0, 1, 2])));
    vertex_array
}

#[test]
fn test_new_enables_blending_and_depth() {
    let mock = Arc::new(MockBackend::new());
    let _renderer = Renderer::new(mock.clone());

    let calls = mock.calls();
    assert!(calls.contains(&RenderCall::SetBlending(true)));
    assert!(calls.contains(&RenderCall::SetDepthTest(true)));
}

#[test]
fn test_submit_uploads_scene_and_transform() {
    let mock = Arc::new(MockBackend::new());
    let mut renderer = Renderer::new(mock.clone());
    let shader = Shader::from_combined(mock.clone(), "FlatColor", builtin::FLAT_COLOR).unwrap();
    let vertex_array = triangle(&mock);

    let mut camera = OrthographicCamera::new(-1.6, 1.6, -0.9, 0.9);
    camera.set_rotation(30.0);
    let transform = Mat4::from_translation(Vec3::new(0.25, 0.0, 0.0));

    mock.clear_calls();
    renderer.begin_scene(&camera);
    renderer.submit(&shader, &vertex_array, transform);
    renderer.end_scene();

    assert_eq!(
        mock.uniform(shader.handle(), "u_ViewProjection"),
        Some(UniformValue::Mat4(camera.view_projection()))
    );
    assert_eq!(
        mock.uniform(shader.handle(), "u_Transform"),
        Some(UniformValue::Mat4(transform))
    );
    assert_eq!(
        mock.calls().last(),
        Some(&RenderCall::DrawIndexed {
            index_count: 3,
            shader: Some(shader.handle()),
            vertex_array: Some(vertex_array.handle()),
        })
    );
}

#[test]
fn test_draw_indexed_count() {
    let mock = Arc::new(MockBackend::new());
    let renderer = Renderer::new(mock.clone());
    let vertex_array = triangle(&mock);

    renderer.draw_indexed(&vertex_array, 0);
    renderer.draw_indexed(&vertex_array, 2);
    assert_eq!(mock.draw_calls(), vec![3, 2]);
}

#[test]
fn test_projection_camera_scene() {
    let mock = Arc::new(MockBackend::new());
    let mut renderer = Renderer::new(mock);
    let camera = ProjectionCamera::perspective_fov(45.0, 1280.0, 720.0, 0.1, 1000.0);

    renderer.begin_scene(&camera);
    assert_eq!(renderer.view_projection(), camera.projection());
}

#[test]
fn test_frame_state_commands() {
    let mock = Arc::new(MockBackend::new());
    let renderer = Renderer::new(mock.clone());
    mock.clear_calls();

    renderer.set_clear_color(Color::rgba(0.1, 0.1, 0.1, 1.0));
    renderer.clear();
    renderer.on_window_resize(1280, 720);

    assert_eq!(
        mock.calls(),
        vec![
            RenderCall::SetClearColor(Color::rgba(0.1, 0.1, 0.1, 1.0)),
            RenderCall::Clear,
            RenderCall::SetViewport(Viewport::new(0, 0, 1280, 720)),
        ]
    );
}
