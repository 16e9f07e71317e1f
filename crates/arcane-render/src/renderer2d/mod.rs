//! Batched 2D quad renderer.
//!
//! Draw calls only write vertices into a host-side buffer. The batch reaches
//! the GPU as a single indexed draw when the scene ends, when the quad
//! capacity is exhausted, or when a new texture would not fit in the texture
//! slot table.

mod quad;
mod texture_slots;
mod types;

use std::sync::Arc;

use glam::{Mat4, Vec2};

use crate::backend::RenderBackend;
use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::camera::Camera;
use crate::color::Color;
use crate::error::Result;
use crate::frame::ImageFrame;
use crate::shader::{Shader, builtin};
use crate::texture::Texture2D;
use crate::vertex_array::VertexArray;

pub use quad::quad_transform;
pub use types::{QuadPosition, QuadVertex, Renderer2DConfig, Renderer2DStats};

use quad::{quad_indices, quad_vertices};
use texture_slots::{SlotLookup, TextureSlots};

pub struct Renderer2D {
    backend: Arc<dyn RenderBackend>,
    config: Renderer2DConfig,

    vertex_array: VertexArray,
    vertex_buffer: Arc<VertexBuffer>,
    shader: Shader,
    white_texture: Arc<Texture2D>,
    /// Recreated whenever an image frame of a different size is drawn.
    frame_texture: Option<Arc<Texture2D>>,

    vertices: Vec<QuadVertex>,
    cursor: usize,
    quad_index_count: u32,
    texture_slots: TextureSlots<Texture2D>,

    stats: Renderer2DStats,
}

impl Renderer2D {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Result<Self> {
        Self::with_config(backend, Renderer2DConfig::default())
    }

    /// # Panics
    /// If `config` asks for no quads or for more texture slots than the shader has.
    pub fn with_config(backend: Arc<dyn RenderBackend>, config: Renderer2DConfig) -> Result<Self> {
        if let Err(message) = config.validate() {
            tracing::error!("Invalid Renderer2D configuration: {}", message);
            panic!("invalid Renderer2D configuration: {message}");
        }
        tracing::info!(
            "Initializing Renderer2D ({} quads, {} texture slots)",
            config.max_quads,
            config.max_texture_slots
        );

        let max_vertices = config.max_vertices() as usize;

        let mut vertex_buffer =
            VertexBuffer::with_size(backend.clone(), (max_vertices * QuadVertex::SIZE) as u64);
        vertex_buffer.set_layout(QuadVertex::layout());
        let vertex_buffer = Arc::new(vertex_buffer);

        let mut vertex_array = VertexArray::new(backend.clone());
        vertex_array.add_vertex_buffer(vertex_buffer.clone());

        let indices = quad_indices(config.max_quads);
        vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(backend.clone(), &indices)));

        let white_texture = Arc::new(Texture2D::from_rgba8(
            backend.clone(),
            1,
            1,
            &[0xff, 0xff, 0xff, 0xff],
        )?);

        let shader = Shader::from_combined(backend.clone(), "Texture2D", builtin::TEXTURE_2D)?;
        let samplers: Vec<i32> = (0..config.max_texture_slots as i32).collect();
        shader.bind();
        shader.set_int_array("u_Textures", &samplers);

        let texture_slots = TextureSlots::new(white_texture.clone(), config.max_texture_slots);

        Ok(Self {
            backend,
            config,
            vertex_array,
            vertex_buffer,
            shader,
            white_texture,
            frame_texture: None,
            vertices: vec![QuadVertex::default(); max_vertices],
            cursor: 0,
            quad_index_count: 0,
            texture_slots,
            stats: Renderer2DStats::default(),
        })
    }

    /// Start a scene: upload the camera and reset the batch and the stats.
    pub fn begin_scene(&mut self, camera: &dyn Camera) {
        self.shader.bind();
        self.shader
            .set_mat4("u_ViewProjection", camera.view_projection());

        self.reset_batch();
        self.stats = Renderer2DStats::default();
    }

    /// Upload the written vertices and draw them.
    pub fn end_scene(&mut self) {
        arcane_core::profiling::profile_function!();

        if self.cursor > 0 {
            let written: &[QuadVertex] = &self.vertices[..self.cursor];
            self.vertex_buffer.set_data(bytemuck::cast_slice(written));
        }

        self.flush();
    }

    /// Bind every occupied texture slot and draw the batch.
    pub fn flush(&mut self) {
        if self.quad_index_count == 0 {
            return;
        }

        for (slot, texture) in self.texture_slots.iter() {
            texture.bind(slot);
        }

        self.shader.bind();
        self.vertex_array.bind();
        self.backend.draw_indexed(self.quad_index_count);

        self.stats.draw_calls += 1;
        self.stats.texture_binds += self.texture_slots.next_index();
        tracing::trace!(
            "Renderer2D flush: {} indices, {} texture slots",
            self.quad_index_count,
            self.texture_slots.next_index()
        );
    }

    /// End the current batch and start an empty one. The camera stays as uploaded.
    pub fn flush_and_reset(&mut self) {
        self.end_scene();
        self.reset_batch();
    }

    fn reset_batch(&mut self) {
        self.quad_index_count = 0;
        self.cursor = 0;
        self.texture_slots.reset();
    }

    pub fn draw_quad(&mut self, position: impl Into<QuadPosition>, size: Vec2, color: Color) {
        self.draw_rotated_quad(position, size, 0.0, color);
    }

    /// Draw a textured quad. `tint` multiplies the sampled color.
    pub fn draw_textured_quad(
        &mut self,
        position: impl Into<QuadPosition>,
        size: Vec2,
        texture: &Arc<Texture2D>,
        tiling_factor: f32,
        tint: Color,
    ) {
        self.draw_rotated_textured_quad(position, size, 0.0, texture, tiling_factor, tint);
    }

    /// Draw a solid quad rotated by `rotation` radians around its centre.
    pub fn draw_rotated_quad(
        &mut self,
        position: impl Into<QuadPosition>,
        size: Vec2,
        rotation: f32,
        color: Color,
    ) {
        self.ensure_index_capacity();

        let transform = quad_transform(position.into().0, size, rotation);
        self.push_quad(&transform, color, 0, 1.0);
    }

    /// Draw a textured quad rotated by `rotation` radians around its centre.
    pub fn draw_rotated_textured_quad(
        &mut self,
        position: impl Into<QuadPosition>,
        size: Vec2,
        rotation: f32,
        texture: &Arc<Texture2D>,
        tiling_factor: f32,
        tint: Color,
    ) {
        self.ensure_index_capacity();

        let slot = match self.texture_slots.lookup_or_assign(texture) {
            SlotLookup::Existing(slot) | SlotLookup::Assigned(slot) => slot,
            SlotLookup::Full => {
                self.flush_and_reset();
                match self.texture_slots.lookup_or_assign(texture) {
                    SlotLookup::Existing(slot) | SlotLookup::Assigned(slot) => slot,
                    SlotLookup::Full => unreachable!("slot table is empty after a reset"),
                }
            }
        };

        let transform = quad_transform(position.into().0, size, rotation);
        self.push_quad(&transform, tint, slot, tiling_factor);
    }

    /// Upload `frame` into the frame texture and draw it as a quad.
    ///
    /// Empty frames are skipped with a warning.
    pub fn draw_image_frame(
        &mut self,
        frame: &ImageFrame,
        position: impl Into<QuadPosition>,
        size: Vec2,
    ) {
        arcane_core::profiling::profile_function!();

        let Some(pixels) = frame.to_rgba_flipped() else {
            tracing::warn!("Empty frame passed to draw_image_frame");
            return;
        };

        let texture = match &self.frame_texture {
            Some(texture) if texture.width() == frame.width && texture.height() == frame.height => {
                texture.clone()
            }
            _ => match Texture2D::new(self.backend.clone(), frame.width, frame.height) {
                Ok(texture) => {
                    let texture = Arc::new(texture);
                    self.frame_texture = Some(texture.clone());
                    texture
                }
                Err(err) => {
                    tracing::error!("Failed to create frame texture: {}", err);
                    return;
                }
            },
        };

        texture.set_data(&pixels);
        self.draw_textured_quad(position, size, &texture, 1.0, Color::WHITE);
    }

    fn ensure_index_capacity(&mut self) {
        if self.quad_index_count >= self.config.max_indices() {
            self.flush_and_reset();
        }
    }

    fn push_quad(&mut self, transform: &Mat4, color: Color, slot: u32, tiling_factor: f32) {
        if self.cursor + 4 > self.vertices.len() {
            tracing::error!(
                "Renderer2D vertex cursor {} past capacity {}",
                self.cursor,
                self.vertices.len()
            );
        }
        assert!(
            self.cursor + 4 <= self.vertices.len(),
            "quad vertex buffer overflow"
        );

        let vertices = quad_vertices(transform, color, slot as f32, tiling_factor);
        self.vertices[self.cursor..self.cursor + 4].copy_from_slice(&vertices);
        self.cursor += 4;
        self.quad_index_count += 6;
        self.stats.quad_count += 1;
    }

    pub fn config(&self) -> Renderer2DConfig {
        self.config
    }

    pub fn stats(&self) -> Renderer2DStats {
        self.stats
    }

    /// Indices queued in the current batch.
    pub fn quad_index_count(&self) -> u32 {
        self.quad_index_count
    }

    /// Number of vertices written in the current batch.
    pub fn vertex_count(&self) -> usize {
        self.cursor
    }

    /// Next free texture slot. Slot 0 is the white texture.
    pub fn texture_slot_index(&self) -> u32 {
        self.texture_slots.next_index()
    }

    /// The vertices written in the current batch.
    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices[..self.cursor]
    }

    pub fn white_texture(&self) -> &Arc<Texture2D> {
        &self.white_texture
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }
}
