use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use super::types::QuadVertex;
use crate::color::Color;

/// Unit quad corners, counter-clockwise from the bottom-left.
pub(crate) const QUAD_CORNERS: [Vec4; 4] = [
    Vec4::new(-0.5, -0.5, 0.0, 1.0),
    Vec4::new(0.5, -0.5, 0.0, 1.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
    Vec4::new(-0.5, 0.5, 0.0, 1.0),
];

pub(crate) const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Six indices per quad, two triangles sharing the 0-2 diagonal.
pub(crate) const QUAD_INDEX_PATTERN: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// `translate(position) * rotate_z(rotation) * scale(size.x, size.y, 1)`, rotation in radians.
pub fn quad_transform(position: Vec3, size: Vec2, rotation: f32) -> Mat4 {
    let mut transform = Mat4::from_translation(position);
    if rotation != 0.0 {
        transform *= Mat4::from_quat(Quat::from_rotation_z(rotation));
    }
    transform * Mat4::from_scale(size.extend(1.0))
}

/// The four vertices of a quad.
pub(crate) fn quad_vertices(
    transform: &Mat4,
    color: Color,
    tex_index: f32,
    tiling_factor: f32,
) -> [QuadVertex; 4] {
    std::array::from_fn(|i| QuadVertex {
        position: (*transform * QUAD_CORNERS[i]).truncate().to_array(),
        color: color.to_array(),
        tex_coord: QUAD_TEX_COORDS[i],
        tex_index,
        tiling_factor,
    })
}

/// The static index buffer contents for `max_quads` quads.
pub(crate) fn quad_indices(max_quads: u32) -> Vec<u32> {
    (0..max_quads)
        .flat_map(|quad| QUAD_INDEX_PATTERN.map(|index| quad * 4 + index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_indices_follow_pattern() {
        let indices = quad_indices(2);
        assert_eq!(indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert_eq!(quad_indices(10_000).len(), 60_000);
    }

    #[test]
    fn test_unit_quad_corners() {
        let vertices = quad_vertices(&Mat4::IDENTITY, Color::WHITE, 0.0, 1.0);
        assert_eq!(vertices[0].position, [-0.5, -0.5, 0.0]);
        assert_eq!(vertices[2].position, [0.5, 0.5, 0.0]);
        assert_eq!(vertices[3].tex_coord, [0.0, 1.0]);
    }

    #[test]
    fn test_translate_and_scale() {
        let transform = quad_transform(Vec3::new(10.0, 5.0, 0.5), Vec2::new(4.0, 2.0), 0.0);
        let vertices = quad_vertices(&transform, Color::RED, 3.0, 2.0);
        assert_eq!(vertices[0].position, [8.0, 4.0, 0.5]);
        assert_eq!(vertices[2].position, [12.0, 6.0, 0.5]);
        assert!(vertices.iter().all(|v| v.tex_index == 3.0 && v.tiling_factor == 2.0));
        assert!(vertices.iter().all(|v| v.color == Color::RED.to_array()));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let transform = quad_transform(Vec3::ZERO, Vec2::new(2.0, 1.0), FRAC_PI_2);
        let vertices = quad_vertices(&transform, Color::WHITE, 0.0, 1.0);
        // (-1, -0.5) rotated 90 degrees counter-clockwise.
        assert!(approx(vertices[0].position, [0.5, -1.0, 0.0]));
        assert!(approx(vertices[2].position, [-0.5, 1.0, 0.0]));
    }
}
