//! Named shader uniforms and their byte layout inside a uniform buffer.
//!
//! A shader declares at most one uniform block, bound at `@group(0) @binding(0)`.
//! Its fields are laid out with the WGSL uniform address space rules, so a
//! `vec3<f32>` is aligned to 16 bytes and every `mat3x3<f32>` column is padded
//! to a `vec4`.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::buffer::ShaderDataType;

/// A value uploaded to a named uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    IntArray(Vec<i32>),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// The scalar or vector type this value fills, `None` for arrays.
    pub fn data_type(&self) -> Option<ShaderDataType> {
        match self {
            UniformValue::Int(_) => Some(ShaderDataType::Int),
            UniformValue::IntArray(_) => None,
            UniformValue::Float(_) => Some(ShaderDataType::Float),
            UniformValue::Float2(_) => Some(ShaderDataType::Float2),
            UniformValue::Float3(_) => Some(ShaderDataType::Float3),
            UniformValue::Float4(_) => Some(ShaderDataType::Float4),
            UniformValue::Mat3(_) => Some(ShaderDataType::Mat3),
            UniformValue::Mat4(_) => Some(ShaderDataType::Mat4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub data_type: ShaderDataType,
    pub offset: u32,
}

/// Byte layout of a shader's uniform block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: u32,
}

const fn align_of(data_type: ShaderDataType) -> u32 {
    match data_type {
        ShaderDataType::Float | ShaderDataType::Int | ShaderDataType::Bool => 4,
        ShaderDataType::Float2 | ShaderDataType::Int2 => 8,
        _ => 16,
    }
}

const fn uniform_size_of(data_type: ShaderDataType) -> u32 {
    match data_type {
        ShaderDataType::Mat3 => 48,
        other => other.size(),
    }
}

const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

impl UniformLayout {
    /// Lay out `fields` in declaration order.
    ///
    /// Returns an error for types that cannot live in a uniform buffer.
    pub fn new<'a>(
        fields: impl IntoIterator<Item = (&'a str, ShaderDataType)>,
    ) -> Result<Self, String> {
        let mut laid_out = Vec::new();
        let mut offset = 0;

        for (name, data_type) in fields {
            if data_type == ShaderDataType::Bool {
                return Err(format!("uniform '{name}' uses bool, which is not host-shareable"));
            }
            offset = round_up(offset, align_of(data_type));
            laid_out.push(UniformField {
                name: name.to_owned(),
                data_type,
                offset,
            });
            offset += uniform_size_of(data_type);
        }

        Ok(Self {
            fields: laid_out,
            size: round_up(offset, 16),
        })
    }

    /// Reflect the uniform block of a WGSL module.
    ///
    /// Supports one `var<uniform>` whose type is either a struct of scalar, vector
    /// and matrix fields or a single such type. Modules without a uniform give an
    /// empty layout.
    pub fn from_wgsl(source: &str) -> Result<Self, String> {
        let source = strip_comments(source);

        let mut declarations = source.match_indices("var<uniform>");
        let Some((start, _)) = declarations.next() else {
            return Ok(Self::default());
        };
        if declarations.next().is_some() {
            return Err("only one uniform block is supported".to_owned());
        }

        let rest = &source[start + "var<uniform>".len()..];
        let end = rest
            .find(';')
            .ok_or_else(|| "unterminated uniform declaration".to_owned())?;
        let (var_name, type_name) = rest[..end]
            .split_once(':')
            .ok_or_else(|| "uniform declaration is missing a type".to_owned())?;
        let var_name = var_name.trim();
        let type_name = type_name.trim();

        if let Some(data_type) = parse_type(type_name) {
            return Self::new([(var_name, data_type)]);
        }

        let body = struct_body(&source, type_name)
            .ok_or_else(|| format!("struct '{type_name}' used by uniform '{var_name}' not found"))?;

        let mut fields = Vec::new();
        for member in body.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            if member.starts_with('@') {
                return Err(format!("attributes on uniform members are not supported: '{member}'"));
            }
            let (name, ty) = member
                .split_once(':')
                .ok_or_else(|| format!("malformed struct member '{member}'"))?;
            let ty = ty.trim();
            let data_type =
                parse_type(ty).ok_or_else(|| format!("unsupported uniform type '{ty}'"))?;
            fields.push((name.trim(), data_type));
        }

        Self::new(fields)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Size of the uniform buffer in bytes, a multiple of 16.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Write `value` into `data` at the offset of `name`.
    ///
    /// Returns `false` when the name is unknown or the value has the wrong type.
    pub fn write(&self, data: &mut [u8], name: &str, value: &UniformValue) -> bool {
        let Some(field) = self.field(name) else {
            return false;
        };
        if value.data_type() != Some(field.data_type) {
            return false;
        }

        let offset = field.offset as usize;
        let mut put = |at: usize, bytes: &[u8]| {
            data[offset + at..offset + at + bytes.len()].copy_from_slice(bytes);
        };

        match value {
            UniformValue::Int(v) => put(0, bytemuck::bytes_of(v)),
            UniformValue::Float(v) => put(0, bytemuck::bytes_of(v)),
            UniformValue::Float2(v) => put(0, bytemuck::cast_slice(&v.to_array())),
            UniformValue::Float3(v) => put(0, bytemuck::cast_slice(&v.to_array())),
            UniformValue::Float4(v) => put(0, bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat3(m) => {
                for (i, column) in m.to_cols_array_2d().iter().enumerate() {
                    put(i * 16, bytemuck::cast_slice(column));
                }
            }
            UniformValue::Mat4(m) => put(0, bytemuck::cast_slice(&m.to_cols_array())),
            UniformValue::IntArray(_) => return false,
        }
        true
    }
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

fn struct_body<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let mut search = source;
    while let Some(pos) = search.find("struct") {
        let after = &search[pos + "struct".len()..];
        let open = after.find('{')?;
        if after[..open].trim() == name {
            let body = &after[open + 1..];
            let close = body.find('}')?;
            return Some(&body[..close]);
        }
        search = after;
    }
    None
}

fn parse_type(ty: &str) -> Option<ShaderDataType> {
    let compact: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
    let data_type = match compact.as_str() {
        "f32" => ShaderDataType::Float,
        "vec2<f32>" | "vec2f" => ShaderDataType::Float2,
        "vec3<f32>" | "vec3f" => ShaderDataType::Float3,
        "vec4<f32>" | "vec4f" => ShaderDataType::Float4,
        "mat3x3<f32>" | "mat3x3f" => ShaderDataType::Mat3,
        "mat4x4<f32>" | "mat4x4f" => ShaderDataType::Mat4,
        "i32" => ShaderDataType::Int,
        "vec2<i32>" | "vec2i" => ShaderDataType::Int2,
        "vec3<i32>" | "vec3i" => ShaderDataType::Int3,
        "vec4<i32>" | "vec4i" => ShaderDataType::Int4,
        _ => return None,
    };
    Some(data_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        struct Uniforms {
            u_ViewProjection: mat4x4<f32>,
            u_Color: vec3<f32>, // padded to 16
            u_Time: f32,
            u_Offset: vec2f,
        };

        @group(0) @binding(0)
        var<uniform> uniforms: Uniforms;
    "#;

    #[test]
    fn test_reflect_struct() {
        let layout = UniformLayout::from_wgsl(SOURCE).unwrap();
        let offsets: Vec<_> = layout.fields().iter().map(|f| (f.name.as_str(), f.offset)).collect();
        assert_eq!(
            offsets,
            vec![("u_ViewProjection", 0), ("u_Color", 64), ("u_Time", 76), ("u_Offset", 80)]
        );
        assert_eq!(layout.size(), 96);
    }

    #[test]
    fn test_reflect_single_value() {
        let layout =
            UniformLayout::from_wgsl("@group(0) @binding(0) var<uniform> u_Transform: mat4x4<f32>;")
                .unwrap();
        assert_eq!(layout.fields().len(), 1);
        assert_eq!(layout.fields()[0].name, "u_Transform");
        assert_eq!(layout.size(), 64);
    }

    #[test]
    fn test_no_uniforms() {
        let layout = UniformLayout::from_wgsl("@fragment fn fs_main() {}").unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.size(), 0);
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let source = "struct U { values: array<f32, 4> }; var<uniform> u: U;";
        assert!(UniformLayout::from_wgsl(source).is_err());
    }

    #[test]
    fn test_mat3_columns_padded() {
        let layout = UniformLayout::new([("m", ShaderDataType::Mat3), ("f", ShaderDataType::Float)])
            .unwrap();
        assert_eq!(layout.field("f").unwrap().offset, 48);

        let mut data = vec![0u8; layout.size() as usize];
        let m = Mat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert!(layout.write(&mut data, "m", &UniformValue::Mat3(m)));

        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&data);
        assert_eq!(&floats[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[4..7], &[4.0, 5.0, 6.0]);
        assert_eq!(&floats[8..11], &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_write_rejects_unknown_and_mismatched() {
        let layout = UniformLayout::new([("u_Color", ShaderDataType::Float4)]).unwrap();
        let mut data = vec![0u8; layout.size() as usize];

        assert!(!layout.write(&mut data, "u_Missing", &UniformValue::Float(1.0)));
        assert!(!layout.write(&mut data, "u_Color", &UniformValue::Float(1.0)));
        assert!(layout.write(&mut data, "u_Color", &UniformValue::Float4(Vec4::ONE)));

        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&data);
        assert_eq!(floats, &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_bool_rejected() {
        assert!(UniformLayout::new([("flag", ShaderDataType::Bool)]).is_err());
    }
}
