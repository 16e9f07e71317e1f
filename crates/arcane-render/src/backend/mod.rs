//! The GPU contract every renderer in this crate talks to.
//!
//! [`RenderBackend`] is a small, immediate-style API: create resources, bind
//! them, then issue an indexed draw that uses whatever is currently bound.
//! It is object-safe and takes `&self`, so one backend can be shared through
//! an `Arc<dyn RenderBackend>` by every resource wrapper and renderer.
//!
//! Two implementations exist: [`WgpuBackend`] renders through `wgpu`, and the
//! mock in `arcane-test-utils` records calls for assertions.

pub mod gpu;

use crate::buffer::BufferLayout;
use crate::color::Color;
use crate::error::Result;
use crate::shader::uniform::{UniformLayout, UniformValue};

pub use self::gpu::WgpuBackend;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

define_handle!(
    /// Identifies a vertex or index buffer owned by a backend.
    BufferHandle
);
define_handle!(
    /// Identifies a vertex array (vertex buffers plus index buffer).
    VertexArrayHandle
);
define_handle!(
    /// Identifies a texture. Texture equality in the batch renderer is handle equality.
    TextureHandle
);
define_handle!(
    /// Identifies a compiled shader program.
    ShaderHandle
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// An RGBA8 texture. Sampling uses linear minification, nearest magnification and
/// repeat addressing on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl TextureDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            label: None,
            width,
            height,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Bytes a full upload must contain.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A vertex + fragment program ready to be compiled by a backend.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor {
    pub name: String,
    pub vertex_source: String,
    pub fragment_source: String,
    /// Named uniforms the program reads, in declaration order.
    pub uniforms: UniformLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Immediate-style GPU interface.
///
/// Draws read the currently bound shader, vertex array and texture units.
/// Resource creation failures are returned; misuse of bound state is a
/// programmer error and is logged by the implementation.
pub trait RenderBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Largest width or height accepted by [`RenderBackend::create_texture`].
    fn max_texture_dimension(&self) -> u32;

    // Buffers

    /// Create a vertex buffer of `size` bytes, optionally filled with `data`.
    fn create_vertex_buffer(&self, size: u64, data: Option<&[u8]>) -> BufferHandle;

    fn create_index_buffer(&self, indices: &[u32]) -> BufferHandle;

    /// Overwrite `data.len()` bytes of `buffer` starting at `offset`.
    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Bind a buffer to its target, or unbind the target with `None`.
    fn bind_buffer(&self, kind: BufferKind, buffer: Option<BufferHandle>);

    fn destroy_buffer(&self, buffer: BufferHandle);

    // Vertex arrays

    fn create_vertex_array(&self) -> VertexArrayHandle;

    /// Attach a vertex buffer. Attribute locations continue from the previously
    /// attached buffers.
    fn attach_vertex_buffer(
        &self,
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        layout: &BufferLayout,
    );

    fn attach_index_buffer(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle, count: u32);

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>);

    fn destroy_vertex_array(&self, vertex_array: VertexArrayHandle);

    // Textures

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureHandle>;

    /// Replace the full contents of a texture with tightly packed RGBA8 rows.
    fn write_texture(&self, texture: TextureHandle, data: &[u8]);

    /// Bind a texture to a texture unit.
    fn bind_texture(&self, texture: TextureHandle, slot: u32);

    fn destroy_texture(&self, texture: TextureHandle);

    // Shaders

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderHandle>;

    fn bind_shader(&self, shader: Option<ShaderHandle>);

    /// Set a named uniform of `shader`. Names the shader does not declare are ignored.
    fn set_uniform(&self, shader: ShaderHandle, name: &str, value: &UniformValue);

    fn destroy_shader(&self, shader: ShaderHandle);

    // Frame state

    fn set_viewport(&self, viewport: Viewport);

    fn set_clear_color(&self, color: Color);

    /// Clear color and depth of the current target.
    fn clear(&self);

    fn set_blending(&self, enabled: bool);

    fn set_depth_test(&self, enabled: bool);

    /// Draw `index_count` indices from the bound vertex array with the bound shader.
    fn draw_indexed(&self, index_count: u32);
}
