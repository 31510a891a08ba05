//! Texture data ready for GPU upload. PNG decoding via `image`.

use std::path::Path;

use anyhow::Context;

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub color_space: ColorSpace,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

/// How the renderer should interpret the stored channel values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Linear,
    /// Values are sRGB-encoded and decoded to linear on sampling.
    Srgb,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            data.len() == expected,
            "RGBA8 data for {}x{} must be {} bytes, got {}",
            width,
            height,
            expected,
            data.len()
        );
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
            color_space: ColorSpace::Linear,
        })
    }

    /// Load texture from a PNG file. Color space starts out linear.
    pub fn load_png<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());

        Self::new_rgba8(width, height, data)
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Flat single-colour texture.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let size = size.max(1);
        let data = rgba.repeat((size * size) as usize);
        Self {
            data,
            width: size,
            height: size,
            format: TextureFormat::Rgba8,
            color_space: ColorSpace::Linear,
        }
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.bytes_per_pixel()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_data() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
        let tex = TextureData::new_rgba8(2, 2, vec![0; 16]).unwrap();
        assert!(tex.is_valid());
        assert_eq!(tex.color_space, ColorSpace::Linear);
    }

    #[test]
    fn color_space_is_tagged() {
        let tex = TextureData::solid(4, [200, 100, 50, 255]).with_color_space(ColorSpace::Srgb);
        assert_eq!(tex.color_space, ColorSpace::Srgb);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[4..8], &[200, 100, 50, 255]);
    }

    #[test]
    fn missing_png_is_an_error() {
        let err = TextureData::load_png("does/not/exist.png").unwrap_err();
        assert!(err.to_string().contains("Failed to open image"));
    }
}
