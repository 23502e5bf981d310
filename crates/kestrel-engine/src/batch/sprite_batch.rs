use anyhow::{Context, Result};
use glam::{Mat4, Vec2};

use crate::coords::Rect;
use crate::device::{
    BufferId, GpuBackend, PipelineId, Release, ResourceGuard, SamplerDesc, SamplerId, TextureId,
};
use crate::effect::Effect;
use crate::frame::{GraphicsDevice, PendingBatches, PendingGuard};
use crate::paint::Color;
use crate::text::SpriteFont;
use crate::texture::SpriteTexture;

use super::effects::SpriteEffects;
use super::record::{
    source_uv, sprite_projection, SpriteRecord, MAX_SPRITES, SPRITE_RECORD_SIZE,
    VERTICES_PER_SPRITE,
};

/// Full set of per-sprite drawing options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteParams {
    pub position: Vec2,
    /// Texture region in pixels; `None` draws the whole texture.
    pub source: Option<Rect>,
    pub color: Color,
    /// Radians, clockwise on screen (+Y down).
    pub rotation: f32,
    /// Pivot for rotation and scale, in source pixels from the region's top-left.
    pub origin: Vec2,
    pub scale: Vec2,
    pub effects: SpriteEffects,
    /// Accepted for API compatibility; draw order alone decides stacking.
    pub layer_depth: f32,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            source: None,
            color: Color::WHITE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            effects: SpriteEffects::NONE,
            layer_depth: 0.0,
        }
    }
}

impl SpriteParams {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Options for [`SpriteBatch::draw_string_ex`]. Rotation, origin, scale and
/// effects apply to every glyph individually.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextParams {
    pub position: Vec2,
    pub color: Color,
    pub rotation: f32,
    pub origin: Vec2,
    pub scale: Vec2,
    pub effects: SpriteEffects,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            color: Color::WHITE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            effects: SpriteEffects::NONE,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Batching {
    pipeline: PipelineId,
    transform: Option<Mat4>,
}

#[derive(Debug, Copy, Clone)]
struct CurrentTexture {
    id: TextureId,
    width: u32,
    height: u32,
}

/// Accumulates sprites and submits each same-texture run as one draw call.
///
/// ```text
/// begin(effect, transform) → draw* → end
/// ```
///
/// A flush happens when the texture changes, when [`MAX_SPRITES`] records are
/// pending, and at [`Self::end`]. Each flush uploads the pending records to a
/// storage buffer, opens a pass on the current target, and draws
/// `6 × pending` vertices.
#[derive(Debug)]
pub struct SpriteBatch {
    default_effect: Effect,
    storage: BufferId,
    sampler: SamplerId,
    _storage_guard: ResourceGuard,
    _sampler_guard: ResourceGuard,

    sprites: Vec<SpriteRecord>,
    texture: Option<CurrentTexture>,
    batching: Option<Batching>,

    pending: PendingBatches,
    pending_guard: Option<PendingGuard>,

    total_draw_calls: u64,
    total_sprites: u64,
}

impl SpriteBatch {
    /// Creates the built-in effect, the sprite storage buffer and the point sampler.
    pub fn new<B: GpuBackend>(gfx: &mut GraphicsDevice<B>) -> Result<Self> {
        let default_effect = Effect::builtin(gfx)?;

        let storage = gfx
            .backend_mut()
            .create_storage_buffer("kestrel sprite storage", (MAX_SPRITES * SPRITE_RECORD_SIZE) as u64)
            .context("failed to create sprite storage buffer")?;
        let storage_guard = ResourceGuard::new(gfx.release_queue(), Release::Buffer(storage));

        let sampler = gfx
            .backend_mut()
            .create_sampler(&SamplerDesc::POINT_CLAMP)
            .context("failed to create sprite sampler")?;
        let sampler_guard = ResourceGuard::new(gfx.release_queue(), Release::Sampler(sampler));

        Ok(Self {
            default_effect,
            storage,
            sampler,
            _storage_guard: storage_guard,
            _sampler_guard: sampler_guard,

            sprites: Vec::with_capacity(MAX_SPRITES),
            texture: None,
            batching: None,

            pending: gfx.pending_batches(),
            pending_guard: None,

            total_draw_calls: 0,
            total_sprites: 0,
        })
    }

    /// Starts batching with `effect` (the built-in one if `None`) and an
    /// optional transform applied before the pixel projection.
    ///
    /// # Panics
    ///
    /// If called again before [`Self::end`].
    pub fn begin(&mut self, effect: Option<&Effect>, transform: Option<Mat4>) {
        assert!(self.batching.is_none(), "SpriteBatch::begin called twice without end");
        self.batching = Some(Batching {
            pipeline: effect.unwrap_or(&self.default_effect).pipeline(),
            transform,
        });
        self.texture = None;
    }

    pub fn is_batching(&self) -> bool {
        self.batching.is_some()
    }

    /// Sprites recorded since the last flush.
    pub fn pending(&self) -> usize {
        self.sprites.len()
    }

    /// Draw calls issued since creation.
    pub fn total_draw_calls(&self) -> u64 {
        self.total_draw_calls
    }

    /// Sprites submitted since creation.
    pub fn total_sprites(&self) -> u64 {
        self.total_sprites
    }

    pub fn draw<B: GpuBackend, T: SpriteTexture + ?Sized>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: &T,
        position: Vec2,
        color: Color,
    ) {
        self.draw_ex(gfx, texture, &SpriteParams {
            position,
            color,
            ..SpriteParams::default()
        });
    }

    pub fn draw_region<B: GpuBackend, T: SpriteTexture + ?Sized>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: &T,
        position: Vec2,
        source: Option<Rect>,
        color: Color,
    ) {
        self.draw_ex(gfx, texture, &SpriteParams {
            position,
            source,
            color,
            ..SpriteParams::default()
        });
    }

    /// Uniformly scaled draw.
    pub fn draw_scaled<B: GpuBackend, T: SpriteTexture + ?Sized>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: &T,
        position: Vec2,
        source: Option<Rect>,
        color: Color,
        scale: f32,
    ) {
        self.draw_ex(gfx, texture, &SpriteParams {
            position,
            source,
            color,
            scale: Vec2::splat(scale),
            ..SpriteParams::default()
        });
    }

    /// Stretches the source region over `dest`.
    pub fn draw_rect<B: GpuBackend, T: SpriteTexture + ?Sized>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: &T,
        dest: Rect,
        source: Option<Rect>,
        color: Color,
    ) {
        let (src_w, src_h) = match source {
            Some(r) => (r.width, r.height),
            None => (texture.width() as i32, texture.height() as i32),
        };
        if src_w == 0 || src_h == 0 {
            return;
        }
        self.draw_ex(gfx, texture, &SpriteParams {
            position: dest.location(),
            source,
            color,
            scale: Vec2::new(dest.width as f32 / src_w as f32, dest.height as f32 / src_h as f32),
            ..SpriteParams::default()
        });
    }

    /// # Panics
    ///
    /// If the batch is not between [`Self::begin`] and [`Self::end`].
    pub fn draw_ex<B: GpuBackend, T: SpriteTexture + ?Sized>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: &T,
        params: &SpriteParams,
    ) {
        let tex = CurrentTexture {
            id: texture.texture_id(),
            width: texture.width(),
            height: texture.height(),
        };
        let (uv, size) = source_uv(params.source, tex.width, tex.height);
        let scale = Vec2::from(params.effects.apply(params.scale.to_array()));

        self.push(
            gfx,
            tex,
            SpriteRecord::new(params.position, size, uv, params.color, params.origin, scale, params.rotation),
        );
    }

    pub fn draw_string<B: GpuBackend>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        font: &SpriteFont,
        text: &str,
        position: Vec2,
        color: Color,
    ) {
        self.draw_string_ex(gfx, font, text, &TextParams {
            position,
            color,
            ..TextParams::default()
        });
    }

    /// Draws `text` glyph by glyph from the font atlas.
    ///
    /// Glyph `i` lands at `position + (pen_i + glyph.offset) * scale`.
    /// Whitespace glyphs only advance the pen.
    pub fn draw_string_ex<B: GpuBackend>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        font: &SpriteFont,
        text: &str,
        params: &TextParams,
    ) {
        let atlas = font.atlas();
        for placed in font.layout(text) {
            if placed.glyph.source.is_empty() {
                continue;
            }
            self.draw_ex(gfx, atlas, &SpriteParams {
                position: params.position + placed.offset * params.scale,
                source: Some(placed.glyph.source),
                color: params.color,
                rotation: params.rotation,
                origin: params.origin,
                scale: params.scale,
                effects: params.effects,
                layer_depth: 0.0,
            });
        }
    }

    /// Flushes pending sprites and returns to idle.
    ///
    /// # Panics
    ///
    /// If [`Self::begin`] was not called.
    pub fn end<B: GpuBackend>(&mut self, gfx: &mut GraphicsDevice<B>) {
        assert!(self.batching.is_some(), "SpriteBatch::end called without begin");
        self.flush(gfx);
        self.batching = None;
        self.texture = None;
    }

    /// Flushes pending sprites, then redirects the device to `target`.
    pub fn set_render_target<B: GpuBackend>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        target: crate::device::DrawTarget,
    ) {
        self.flush(gfx);
        gfx.set_render_target(target);
    }

    fn push<B: GpuBackend>(
        &mut self,
        gfx: &mut GraphicsDevice<B>,
        texture: CurrentTexture,
        record: SpriteRecord,
    ) {
        assert!(self.batching.is_some(), "SpriteBatch draw called without begin");

        if self.texture.is_some_and(|t| t.id != texture.id) && !self.sprites.is_empty() {
            self.flush(gfx);
        }
        self.texture = Some(texture);

        if self.sprites.len() >= MAX_SPRITES {
            self.flush(gfx);
        }

        if self.sprites.is_empty() {
            self.pending_guard = Some(self.pending.hold());
        }
        self.sprites.push(record);
    }

    fn flush<B: GpuBackend>(&mut self, gfx: &mut GraphicsDevice<B>) {
        if self.sprites.is_empty() {
            return;
        }

        let (Some(batching), Some(texture)) = (self.batching, self.texture) else {
            self.discard();
            return;
        };

        if !gfx.has_drawable_target() {
            log::debug!("no drawable target; discarding {} sprites", self.sprites.len());
            self.discard();
            return;
        }

        gfx.upload_buffer(self.storage, bytemuck::cast_slice(&self.sprites));

        let Some(pass) = gfx.begin_render_pass() else {
            self.discard();
            return;
        };

        let transform = sprite_projection(gfx.render_width(), gfx.render_height(), batching.transform);
        let count = self.sprites.len() as u32;

        gfx.bind_pipeline(&pass, batching.pipeline);
        gfx.bind_vertex_storage_buffer(&pass, self.storage);
        gfx.bind_fragment_sampler(&pass, texture.id, self.sampler);
        gfx.push_vertex_uniform(&pass, bytemuck::bytes_of(&transform.to_cols_array()));
        gfx.draw_primitives(&pass, count * VERTICES_PER_SPRITE);
        gfx.end_render_pass(pass);

        self.total_draw_calls += 1;
        self.total_sprites += count as u64;
        self.discard();
    }

    fn discard(&mut self) {
        self.sprites.clear();
        self.pending_guard = None;
    }
}
