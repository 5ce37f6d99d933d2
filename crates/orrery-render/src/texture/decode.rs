//! CPU side of texture loading: decode files with `image` and pick an upload format.

use std::path::Path;

use super::TextureError;

/// How a map's texel values are read by the shaders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Color images. Sampling decodes sRGB to linear.
    Srgb,
    /// Data maps such as specular intensity. Sampled as stored.
    Linear,
}

/// Tightly packed pixels plus the format they should be uploaded as.
#[derive(Clone, Debug, PartialEq)]
pub struct TexturePixels {
    /// Rows top to bottom, no padding.
    pub data: Vec<u8>,
    /// Texels per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// `R8Unorm` or one of the RGBA8 formats.
    pub format: wgpu::TextureFormat,
}

impl TexturePixels {
    /// Wrap raw bytes; nothing is checked until [`TexturePixels::validate`].
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// A single RGBA texel.
    pub fn solid(rgba: [u8; 4], space: ColorSpace) -> Self {
        Self::new(rgba.to_vec(), 1, 1, upload_format(image::ColorType::Rgba8, space))
    }

    /// Repack a decoded image. Grey images keep one channel; anything else
    /// (RGB, grey + alpha, 16-bit) becomes 8-bit RGBA.
    pub fn from_image(image: image::DynamicImage, space: ColorSpace) -> Self {
        let (width, height) = (image.width(), image.height());
        let format = upload_format(image.color(), space);
        let data = if format == wgpu::TextureFormat::R8Unorm {
            image.into_luma8().into_raw()
        } else {
            image.into_rgba8().into_raw()
        };
        Self::new(data, width, height, format)
    }

    /// Read and decode a file. Any I/O or format failure names the path.
    pub fn open(path: &Path, space: ColorSpace) -> Result<Self, TextureError> {
        image::open(path)
            .map(|image| Self::from_image(image, space))
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn bytes_per_texel(&self) -> u32 {
        self.format.block_copy_size(None).unwrap_or(4)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.bytes_per_texel()
    }

    /// Non-empty, and exactly one texel's worth of bytes per texel.
    pub fn validate(&self) -> Result<(), TextureError> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.bytes_per_row() as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: self.data.len(),
                expected,
                width: self.width,
                height: self.height,
                format: self.format,
            });
        }
        Ok(())
    }
}

/// 1 channel → `R8Unorm`, everything else → RGBA8 (wgpu has no 24-bit format),
/// sRGB only for color images.
pub fn upload_format(color: image::ColorType, space: ColorSpace) -> wgpu::TextureFormat {
    match (color.channel_count(), space) {
        (1, _) => wgpu::TextureFormat::R8Unorm,
        (_, ColorSpace::Srgb) => wgpu::TextureFormat::Rgba8UnormSrgb,
        (_, ColorSpace::Linear) => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// Levels in a full chain down to 1×1: `floor(log2(max(w, h))) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}
