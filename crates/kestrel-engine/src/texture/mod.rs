//! GPU images: sampled textures and offscreen render targets.

mod render_target;
mod texture;

pub use render_target::RenderTarget;
pub use texture::{ReloadError, Texture};

use crate::device::TextureId;

/// Anything a sprite batch can sample from.
pub trait SpriteTexture {
    fn texture_id(&self) -> TextureId;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}
