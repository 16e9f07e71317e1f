//! Unbatched scene submission.

use std::sync::Arc;

use glam::Mat4;

use crate::backend::{RenderBackend, Viewport};
use crate::camera::Camera;
use crate::color::Color;
use crate::shader::Shader;
use crate::vertex_array::VertexArray;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SceneData {
    view_projection: Mat4,
}

/// Submits one draw per mesh with the view-projection captured by
/// [`Renderer::begin_scene`].
pub struct Renderer {
    backend: Arc<dyn RenderBackend>,
    scene: SceneData,
}

impl Renderer {
    /// Enables alpha blending and depth testing on the backend.
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        tracing::info!("Initializing renderer on backend '{}'", backend.name());
        backend.set_blending(true);
        backend.set_depth_test(true);

        Self {
            backend,
            scene: SceneData {
                view_projection: Mat4::IDENTITY,
            },
        }
    }

    pub fn backend(&self) -> &Arc<dyn RenderBackend> {
        &self.backend
    }

    pub fn begin_scene(&mut self, camera: &dyn Camera) {
        self.scene.view_projection = camera.view_projection();
    }

    pub fn end_scene(&mut self) {}

    /// Draw `vertex_array` with `shader`, uploading `u_ViewProjection` and `u_Transform`.
    pub fn submit(&self, shader: &Shader, vertex_array: &VertexArray, transform: Mat4) {
        arcane_core::profiling::profile_function!();

        shader.bind();
        shader.set_mat4("u_ViewProjection", self.scene.view_projection);
        shader.set_mat4("u_Transform", transform);

        vertex_array.bind();
        self.draw_indexed(vertex_array, 0);
    }

    /// Draw `count` indices of the bound vertex array, or all of them when `count` is 0.
    pub fn draw_indexed(&self, vertex_array: &VertexArray, count: u32) {
        let count = if count == 0 {
            vertex_array.index_count()
        } else {
            count
        };
        self.backend.draw_indexed(count);
    }

    pub fn set_clear_color(&self, color: Color) {
        self.backend.set_clear_color(color);
    }

    pub fn clear(&self) {
        self.backend.clear();
    }

    pub fn on_window_resize(&self, width: u32, height: u32) {
        self.backend.set_viewport(Viewport::new(0, 0, width, height));
    }

    pub fn view_projection(&self) -> Mat4 {
        self.scene.view_projection
    }
}
