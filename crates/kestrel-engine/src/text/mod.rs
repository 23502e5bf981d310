//! Bitmap fonts drawn through the sprite batch.

mod atlas;
mod sprite_font;

pub use sprite_font::{FontError, Glyph, GlyphLayout, PlacedGlyph, SpriteFont};
