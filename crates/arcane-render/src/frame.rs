//! CPU-side video frames.

/// Pixel layout of an [`ImageFrame`]. All formats use 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray8,
    Bgr8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A tightly packed image, first row at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl ImageFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// A frame with no pixels, or with fewer bytes than its dimensions need.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.len() < self.expected_len()
    }

    fn row_len(&self) -> usize {
        self.width as usize * self.format.channels()
    }

    fn expected_len(&self) -> usize {
        self.row_len() * self.height as usize
    }

    /// Convert to RGBA8 with the row order reversed, so the last row comes
    /// first as textures expect. Returns `None` for empty frames.
    pub fn to_rgba_flipped(&self) -> Option<Vec<u8>> {
        if self.is_empty() {
            return None;
        }

        let row_len = self.row_len();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);

        for row in self.data[..self.expected_len()].chunks_exact(row_len).rev() {
            match self.format {
                PixelFormat::Gray8 => {
                    for &v in row {
                        out.extend_from_slice(&[v, v, v, 255]);
                    }
                }
                PixelFormat::Bgr8 => {
                    for px in row.chunks_exact(3) {
                        out.extend_from_slice(&[px[2], px[1], px[0], 255]);
                    }
                }
                PixelFormat::Rgb8 => {
                    for px in row.chunks_exact(3) {
                        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                    }
                }
                PixelFormat::Rgba8 => out.extend_from_slice(row),
            }
        }

        Some(out)
    }
}

impl From<image::RgbaImage> for ImageFrame {
    fn from(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Rgba8, image.into_raw())
    }
}

impl From<image::RgbImage> for ImageFrame {
    fn from(image: image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Rgb8, image.into_raw())
    }
}

impl From<image::GrayImage> for ImageFrame {
    fn from(image: image::GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Gray8, image.into_raw())
    }
}

impl From<image::DynamicImage> for ImageFrame {
    fn from(image: image::DynamicImage) -> Self {
        match image {
            image::DynamicImage::ImageLuma8(gray) => gray.into(),
            image::DynamicImage::ImageRgb8(rgb) => rgb.into(),
            other => other.into_rgba8().into(),
        }
    }
}
