//! Rendering for the ARcane engine.
//!
//! Everything draws through a [`RenderBackend`]: [`WgpuBackend`] on a real
//! GPU, or a recording mock in tests. [`Renderer2D`] batches quads into as
//! few draws as possible; [`Renderer`] submits one mesh at a time.

pub mod backend;
pub mod buffer;
pub mod camera;
pub mod color;
pub mod context;
pub mod error;
pub mod frame;
pub mod frame_stream;
pub mod renderer;
pub mod renderer2d;
pub mod shader;
pub mod surface;
pub mod texture;
pub mod vertex_array;

pub use backend::{
    BufferHandle, BufferKind, RenderBackend, ShaderDescriptor, ShaderHandle, TextureDescriptor,
    TextureHandle, VertexArrayHandle, Viewport, WgpuBackend,
};
pub use buffer::{BufferElement, BufferLayout, IndexBuffer, ShaderDataType, VertexBuffer};
pub use camera::{Camera, OrthographicCamera, ProjectionCamera};
pub use color::Color;
pub use context::{GraphicsContext, GraphicsContextDescriptor};
pub use error::{RenderError, Result};
pub use frame::{ImageFrame, PixelFormat};
pub use frame_stream::{FrameSlot, FrameSource, FrameStream, FrameStreamError, TcpFrameSource};
pub use renderer::Renderer;
pub use renderer2d::{QuadPosition, QuadVertex, Renderer2D, Renderer2DConfig, Renderer2DStats};
pub use shader::{Shader, UniformLayout, UniformValue};
pub use surface::{SurfaceFrame, WindowSurface};
pub use texture::Texture2D;
pub use vertex_array::VertexArray;

// Re-export wgpu so applications can name surface formats and views.
pub use wgpu;
