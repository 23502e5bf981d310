//! Sprite batching.
//!
//! [`SpriteBatch`] turns `draw*` calls into [`SpriteRecord`]s and submits each
//! run of sprites sharing a texture as a single instanced-style draw: one
//! storage-buffer upload plus `6 × n` vertices pulled by the vertex stage.

mod effects;
mod record;
mod sprite_batch;

pub use effects::SpriteEffects;
pub use record::{
    source_uv, sprite_projection, SpriteRecord, CORNER_INDICES, MAX_SPRITES, SPRITE_RECORD_SIZE,
    UNIT_CORNERS, VERTICES_PER_SPRITE,
};
pub use sprite_batch::{SpriteBatch, SpriteParams, TextParams};
