//! Shader programs.
//!
//! Programs are written in WGSL. The vertex stage entry point is `vs_main`
//! and the fragment stage entry point is `fs_main`. Uniforms live in a single
//! block at `@group(0) @binding(0)`; textures are read from
//! `@group(1) @binding(0) var u_Textures: binding_array<texture_2d<f32>, 32>`
//! with a sampler at `@group(1) @binding(1)`, indexed by texture unit.

pub mod preprocess;
pub mod uniform;

use std::path::Path;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::backend::{RenderBackend, ShaderDescriptor, ShaderHandle};
use crate::error::{RenderError, Result};

pub use preprocess::{ShaderSources, ShaderStage, preprocess};
pub use uniform::{UniformField, UniformLayout, UniformValue};

/// Shaders shipped with the engine, in the combined `#type` format.
pub mod builtin {
    /// Batched quads: `u_ViewProjection`, texture units indexed per vertex.
    pub const TEXTURE_2D: &str = include_str!("../../assets/shaders/Texture2D.wgsl");
    /// One mesh in one color: `u_ViewProjection`, `u_Transform`, `u_Color`.
    pub const FLAT_COLOR: &str = include_str!("../../assets/shaders/FlatColor.wgsl");
}

/// A compiled vertex + fragment program. Released when dropped.
pub struct Shader {
    backend: Arc<dyn RenderBackend>,
    handle: ShaderHandle,
    name: String,
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .finish()
    }
}

impl Shader {
    /// Compile a program from separate stage sources.
    pub fn from_source(
        backend: Arc<dyn RenderBackend>,
        name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let vertex_source = vertex_source.into();
        let fragment_source = fragment_source.into();

        let uniforms = reflect_uniforms(&name, &vertex_source, &fragment_source)?;
        let descriptor = ShaderDescriptor {
            name: name.clone(),
            vertex_source,
            fragment_source,
            uniforms,
        };

        let handle = backend.create_shader(&descriptor)?;
        tracing::info!("Created shader '{}' ({:?})", name, handle);

        Ok(Self {
            backend,
            handle,
            name,
        })
    }

    /// Compile a program from one source containing `#type` sections.
    pub fn from_combined(
        backend: Arc<dyn RenderBackend>,
        name: impl Into<String>,
        source: &str,
    ) -> Result<Self> {
        let name = name.into();
        let ShaderSources { vertex, fragment } =
            preprocess(source).map_err(|message| RenderError::ShaderParse {
                name: name.clone(),
                message,
            })?;
        Self::from_source(backend, name, vertex, fragment)
    }

    /// Load a combined shader file. The program is named after the file stem.
    pub fn from_file(backend: Arc<dyn RenderBackend>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            tracing::error!("Could not open shader file '{}': {}", path.display(), source);
            RenderError::ShaderIo {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_combined(backend, name, &source)
    }

    pub fn bind(&self) {
        self.backend.bind_shader(Some(self.handle));
    }

    pub fn unbind(&self) {
        self.backend.bind_shader(None);
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    pub fn set_int_array(&self, name: &str, values: &[i32]) {
        self.set(name, UniformValue::IntArray(values.to_vec()));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    pub fn set_float2(&self, name: &str, value: Vec2) {
        self.set(name, UniformValue::Float2(value));
    }

    pub fn set_float3(&self, name: &str, value: Vec3) {
        self.set(name, UniformValue::Float3(value));
    }

    pub fn set_float4(&self, name: &str, value: Vec4) {
        self.set(name, UniformValue::Float4(value));
    }

    pub fn set_mat3(&self, name: &str, value: Mat3) {
        self.set(name, UniformValue::Mat3(value));
    }

    pub fn set_mat4(&self, name: &str, value: Mat4) {
        self.set(name, UniformValue::Mat4(value));
    }

    fn set(&self, name: &str, value: UniformValue) {
        self.backend.set_uniform(self.handle, name, &value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.backend.destroy_shader(self.handle);
    }
}

fn reflect_uniforms(name: &str, vertex: &str, fragment: &str) -> Result<UniformLayout> {
    let parse_error = |message: String| RenderError::ShaderParse {
        name: name.to_owned(),
        message,
    };

    let vertex_layout = UniformLayout::from_wgsl(vertex).map_err(parse_error)?;
    let fragment_layout = UniformLayout::from_wgsl(fragment).map_err(parse_error)?;

    match (vertex_layout.is_empty(), fragment_layout.is_empty()) {
        (_, true) => Ok(vertex_layout),
        (true, false) => Ok(fragment_layout),
        (false, false) if vertex_layout == fragment_layout => Ok(vertex_layout),
        (false, false) => Err(parse_error(
            "vertex and fragment stages declare different uniform blocks".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_merges_stages() {
        let vs = "var<uniform> u_ViewProjection: mat4x4<f32>;";
        let fs = "@fragment fn fs_main() {}";
        let layout = reflect_uniforms("test", vs, fs).unwrap();
        assert_eq!(layout.fields().len(), 1);

        let layout = reflect_uniforms("test", fs, vs).unwrap();
        assert_eq!(layout.fields().len(), 1);
    }

    #[test]
    fn test_reflect_conflicting_stages() {
        let vs = "var<uniform> u_A: mat4x4<f32>;";
        let fs = "var<uniform> u_B: vec4<f32>;";
        let err = reflect_uniforms("conflict", vs, fs).unwrap_err();
        assert!(matches!(err, RenderError::ShaderParse { ref name, .. } if name == "conflict"));
    }
}
