use glam::{Vec2, Vec3};
use static_assertions::const_assert_eq;

use crate::buffer::{BufferLayout, ShaderDataType};

/// One corner of a batched quad, laid out exactly as the vertex buffer expects.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
    /// Texture slot, encoded as a float for the shader.
    pub tex_index: f32,
    pub tiling_factor: f32,
}

const_assert_eq!(std::mem::size_of::<QuadVertex>(), 44);

impl QuadVertex {
    pub const SIZE: usize = std::mem::size_of::<QuadVertex>();

    pub fn layout() -> BufferLayout {
        BufferLayout::from_elements([
            (ShaderDataType::Float3, "a_Position"),
            (ShaderDataType::Float4, "a_Color"),
            (ShaderDataType::Float2, "a_TexCoord"),
            (ShaderDataType::Float, "a_TexIndex"),
            (ShaderDataType::Float, "a_TilingFactor"),
        ])
    }
}

/// Position of a quad's centre. A 2D position lies on `z = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuadPosition(pub Vec3);

impl From<Vec3> for QuadPosition {
    fn from(value: Vec3) -> Self {
        Self(value)
    }
}

impl From<Vec2> for QuadPosition {
    fn from(value: Vec2) -> Self {
        Self(value.extend(0.0))
    }
}

impl From<[f32; 2]> for QuadPosition {
    fn from([x, y]: [f32; 2]) -> Self {
        Self(Vec3::new(x, y, 0.0))
    }
}

impl From<[f32; 3]> for QuadPosition {
    fn from(value: [f32; 3]) -> Self {
        Self(Vec3::from_array(value))
    }
}

impl From<(f32, f32)> for QuadPosition {
    fn from((x, y): (f32, f32)) -> Self {
        Self(Vec3::new(x, y, 0.0))
    }
}

impl From<(f32, f32, f32)> for QuadPosition {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self(Vec3::new(x, y, z))
    }
}

impl From<QuadPosition> for Vec3 {
    fn from(value: QuadPosition) -> Self {
        value.0
    }
}

/// Capacity of a [`super::Renderer2D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer2DConfig {
    pub max_quads: u32,
    /// Texture units per batch, including the white texture in slot 0.
    pub max_texture_slots: u32,
}

impl Renderer2DConfig {
    /// The shader's `u_Textures` array has this many entries.
    pub const MAX_SUPPORTED_TEXTURE_SLOTS: u32 = 32;

    pub fn max_vertices(&self) -> u32 {
        self.max_quads * 4
    }

    pub fn max_indices(&self) -> u32 {
        self.max_quads * 6
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.max_quads == 0 {
            return Err("max_quads must be at least 1".to_owned());
        }
        if self.max_quads.checked_mul(6).is_none() {
            return Err(format!("max_quads {} overflows the index count", self.max_quads));
        }
        if !(2..=Self::MAX_SUPPORTED_TEXTURE_SLOTS).contains(&self.max_texture_slots) {
            return Err(format!(
                "max_texture_slots must be in 2..={}, got {}",
                Self::MAX_SUPPORTED_TEXTURE_SLOTS,
                self.max_texture_slots
            ));
        }
        Ok(())
    }
}

impl Default for Renderer2DConfig {
    fn default() -> Self {
        Self {
            max_quads: 10_000,
            max_texture_slots: 32,
        }
    }
}

/// Counters for the current scene, reset by `begin_scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Renderer2DStats {
    pub draw_calls: u32,
    pub quad_count: u32,
    /// Texture binds issued by flushes, white texture included.
    pub texture_binds: u32,
}

impl Renderer2DStats {
    pub fn vertex_count(&self) -> u32 {
        self.quad_count * 4
    }

    pub fn index_count(&self) -> u32 {
        self.quad_count * 6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_vertex_layout_matches_struct() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.stride() as usize, QuadVertex::SIZE);
        assert_eq!(layout.elements().len(), 5);
    }

    #[test]
    fn test_quad_position_from() {
        assert_eq!(QuadPosition::from(Vec2::new(1.0, 2.0)).0, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(QuadPosition::from((1.0, 2.0, 3.0)).0, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_config_validation() {
        let config = Renderer2DConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_vertices(), 40_000);
        assert_eq!(config.max_indices(), 60_000);

        let bad = Renderer2DConfig {
            max_texture_slots: 33,
            ..config
        };
        assert!(bad.validate().is_err());

        let bad = Renderer2DConfig {
            max_texture_slots: 1,
            ..config
        };
        assert!(bad.validate().is_err());

        let bad = Renderer2DConfig {
            max_quads: 0,
            ..config
        };
        assert!(bad.validate().is_err());
    }
}
