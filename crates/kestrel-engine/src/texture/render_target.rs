use anyhow::{Context, Result};

use crate::device::{DrawTarget, GpuBackend, Release, ResourceGuard, TextureDesc, TextureId, TextureUsage};
use crate::frame::GraphicsDevice;

use super::SpriteTexture;

/// Offscreen image in the surface format, drawable and sampleable.
///
/// Bind it with `set_render_target(rt.target())`, draw, switch back to
/// [`DrawTarget::Surface`] and then draw `rt` like any texture.
#[derive(Debug)]
pub struct RenderTarget {
    id: TextureId,
    width: u32,
    height: u32,
    _guard: ResourceGuard,
}

impl RenderTarget {
    pub fn new<B: GpuBackend>(gfx: &mut GraphicsDevice<B>, width: u32, height: u32) -> Result<Self> {
        let id = gfx
            .backend_mut()
            .create_texture(&TextureDesc {
                label: "kestrel render target",
                width,
                height,
                usage: TextureUsage::RenderTarget,
            })
            .with_context(|| format!("failed to create {width}x{height} render target"))?;

        Ok(Self {
            id,
            width,
            height,
            _guard: ResourceGuard::new(gfx.release_queue(), Release::Texture(id)),
        })
    }

    /// Draw destination for `set_render_target`.
    pub fn target(&self) -> DrawTarget {
        DrawTarget::Texture {
            id: self.id,
            width: self.width,
            height: self.height,
        }
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

impl SpriteTexture for RenderTarget {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessBackend;

    #[test]
    fn target_carries_size() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
        let rt = RenderTarget::new(&mut gfx, 128, 96).unwrap();
        assert_eq!(
            rt.target(),
            DrawTarget::Texture {
                id: rt.id(),
                width: 128,
                height: 96
            }
        );
        assert_eq!(gfx.backend().texture_size(rt.id()), Some((128, 96)));
    }

    #[test]
    fn zero_size_rejected() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
        assert!(RenderTarget::new(&mut gfx, 0, 16).is_err());
    }
}
