use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{RenderBackend, TextureDescriptor, TextureHandle};
use crate::error::{RenderError, Result};

/// An RGBA8 GPU texture.
///
/// Two textures are equal when they refer to the same GPU resource. Released
/// when dropped; share it through `Arc<Texture2D>`.
pub struct Texture2D {
    backend: Arc<dyn RenderBackend>,
    handle: TextureHandle,
    width: u32,
    height: u32,
    path: Option<PathBuf>,
}

impl Texture2D {
    /// Create an empty texture of the given size.
    pub fn new(backend: Arc<dyn RenderBackend>, width: u32, height: u32) -> Result<Self> {
        Self::create(backend, TextureDescriptor::new(width, height), None)
    }

    /// Create a texture and upload tightly packed RGBA8 pixels into it.
    pub fn from_rgba8(
        backend: Arc<dyn RenderBackend>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self> {
        let texture = Self::new(backend, width, height)?;
        texture.set_data(pixels);
        Ok(texture)
    }

    /// Decode an image file into a texture.
    ///
    /// Rows are flipped so that the first row in memory is the bottom of the
    /// image, matching texture coordinate (0, 0) at the bottom-left corner.
    pub fn from_file(backend: Arc<dyn RenderBackend>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            tracing::error!("Failed to load image '{}': {}", path.display(), source);
            RenderError::ImageIo {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let image = image::load_from_memory(&bytes)?.flipv().into_rgba8();
        let (width, height) = image.dimensions();

        let descriptor =
            TextureDescriptor::new(width, height).with_label(path.display().to_string());
        let texture = Self::create(backend, descriptor, Some(path.to_path_buf()))?;
        texture.set_data(image.as_raw());

        Ok(texture)
    }

    fn create(
        backend: Arc<dyn RenderBackend>,
        descriptor: TextureDescriptor,
        path: Option<PathBuf>,
    ) -> Result<Self> {
        let max = backend.max_texture_dimension();
        let (width, height) = (descriptor.width, descriptor.height);
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::InvalidTextureSize { width, height, max });
        }

        let handle = backend.create_texture(&descriptor)?;
        tracing::debug!("Created texture {:?} ({}x{})", handle, width, height);

        Ok(Self {
            backend,
            handle,
            width,
            height,
            path,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bind(&self, slot: u32) {
        self.backend.bind_texture(self.handle, slot);
    }

    /// Replace the texture contents.
    ///
    /// # Panics
    /// If `data` is not exactly `width * height * 4` bytes.
    pub fn set_data(&self, data: &[u8]) {
        let expected = self.width as usize * self.height as usize * 4;
        if data.len() != expected {
            tracing::error!(
                "texture upload of {} bytes, expected {} for {}x{} RGBA8",
                data.len(),
                expected,
                self.width,
                self.height
            );
        }
        assert_eq!(data.len(), expected, "data must be the entire texture");
        self.backend.write_texture(self.handle, data);
    }

    /// Source file, for textures loaded with [`Texture2D::from_file`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Texture2D {}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.backend.destroy_texture(self.handle);
    }
}
