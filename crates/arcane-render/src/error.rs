use std::path::PathBuf;

/// Failure to create a GPU resource.
///
/// These are never retried. Callers either propagate them up to the
/// application or abort startup.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface is not supported by the adapter")]
    SurfaceConfig,

    #[error("adapter is missing required features {missing:?}")]
    MissingFeatures { missing: wgpu::Features },

    #[error("shader '{name}' failed to compile: {message}")]
    ShaderCompilation { name: String, message: String },

    #[error("shader '{name}' is malformed: {message}")]
    ShaderParse { name: String, message: String },

    #[error("could not read shader '{}': {source}", path.display())]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("could not read image '{}': {source}", path.display())]
    ImageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid texture size {width}x{height} (max {max})")]
    InvalidTextureSize { width: u32, height: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RenderError::ShaderCompilation {
            name: "Texture2D".into(),
            message: "unknown identifier".into(),
        };
        assert_eq!(
            err.to_string(),
            "shader 'Texture2D' failed to compile: unknown identifier"
        );

        let err = RenderError::InvalidTextureSize {
            width: 0,
            height: 4,
            max: 8192,
        };
        assert_eq!(err.to_string(), "invalid texture size 0x4 (max 8192)");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let err = RenderError::ShaderIo {
            path: PathBuf::from("missing.wgsl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.wgsl"));
        assert!(err.source().is_some());
    }
}
