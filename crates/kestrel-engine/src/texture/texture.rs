use anyhow::{Context, Result};
use thiserror::Error;

use crate::device::{GpuBackend, Release, ResourceGuard, TextureDesc, TextureId, TextureUsage};
use crate::frame::GraphicsDevice;
use crate::paint::Color;

use super::SpriteTexture;

/// Why an in-place texture reload was refused or failed.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The new image has different dimensions; the texture keeps its contents.
    #[error("texture size changed ({width}x{height} -> {new_width}x{new_height}), reload skipped")]
    SizeMismatch {
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    },
    #[error("expected {expected} bytes of RGBA pixels, got {actual}")]
    PixelLength { expected: usize, actual: usize },
    #[error(transparent)]
    Upload(#[from] anyhow::Error),
}

/// Immutable-size `Rgba8Unorm` image sampled by sprites.
///
/// The GPU image is released when the texture is dropped, after any frame
/// in flight has been submitted.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    _guard: ResourceGuard,
}

impl Texture {
    /// Creates a texture from tightly packed RGBA8 rows (`width * height * 4` bytes).
    ///
    /// The upload runs in its own submission and does not need an active frame.
    pub fn from_rgba<B: GpuBackend>(
        gfx: &mut GraphicsDevice<B>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self> {
        let expected = rgba_len(width, height);
        anyhow::ensure!(
            pixels.len() == expected,
            "texture {width}x{height} expects {expected} bytes of RGBA pixels, got {}",
            pixels.len()
        );

        let id = gfx.backend_mut().create_texture(&TextureDesc {
            label: "kestrel texture",
            width,
            height,
            usage: TextureUsage::Sampled,
        })?;
        let texture = Self {
            id,
            width,
            height,
            _guard: ResourceGuard::new(gfx.release_queue(), Release::Texture(id)),
        };

        gfx.backend_mut()
            .upload_texture(id, pixels)
            .with_context(|| format!("failed to upload {width}x{height} texture"))?;
        Ok(texture)
    }

    /// Creates a texture filled with one color.
    pub fn solid<B: GpuBackend>(
        gfx: &mut GraphicsDevice<B>,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<Self> {
        let px = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let pixels = px.repeat(width as usize * height as usize);
        Self::from_rgba(gfx, width, height, &pixels)
    }

    /// Replaces the pixels in place, keeping the same GPU image.
    ///
    /// The dimensions must match the original ones. On error the texture keeps
    /// its previous contents.
    pub fn reload<B: GpuBackend>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), ReloadError> {
        if (width, height) != (self.width, self.height) {
            let err = ReloadError::SizeMismatch {
                width: self.width,
                height: self.height,
                new_width: width,
                new_height: height,
            };
            log::warn!("{err}");
            return Err(err);
        }

        let expected = rgba_len(width, height);
        if pixels.len() != expected {
            let err = ReloadError::PixelLength {
                expected,
                actual: pixels.len(),
            };
            log::warn!("{err}");
            return Err(err);
        }

        gfx.backend_mut()
            .upload_texture(self.id, pixels)
            .map_err(ReloadError::from)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl SpriteTexture for Texture {
    fn texture_id(&self) -> TextureId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
