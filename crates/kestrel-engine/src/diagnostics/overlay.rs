use glam::Vec2;

use crate::batch::SpriteBatch;
use crate::device::GpuBackend;
use crate::frame::GraphicsDevice;
use crate::paint::Color;
use crate::text::SpriteFont;
use crate::time::FrameTime;

/// Seconds of frames averaged into one FPS reading.
const FPS_WINDOW: f32 = 0.5;

/// Text overlay with FPS, frame time, and the draw calls and sprites
/// submitted since its previous draw.
///
/// Call [`Self::update`] once per frame and [`Self::draw`] after all other
/// drawing, so the counts cover the whole frame but not the overlay itself.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    pub enabled: bool,
    pub position: Vec2,

    fps: u32,
    frame_time_ms: f32,
    draw_calls: u64,
    sprites: u64,

    frames: u32,
    fps_timer: f32,

    last_draw_calls: u64,
    last_sprites: u64,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Vec2::new(4.0, 4.0),
            fps: 0,
            frame_time_ms: 0.0,
            draw_calls: 0,
            sprites: 0,
            frames: 0,
            fps_timer: 0.0,
            last_draw_calls: 0,
            last_sprites: 0,
        }
    }
}

impl DebugOverlay {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Draw calls between the previous two overlay draws.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn sprites(&self) -> u64 {
        self.sprites
    }

    pub fn update(&mut self, time: &FrameTime) {
        self.frame_time_ms = time.dt * 1000.0;

        self.frames += 1;
        self.fps_timer += time.dt;
        if self.fps_timer >= FPS_WINDOW {
            self.fps = (self.frames as f32 / self.fps_timer) as u32;
            self.frames = 0;
            self.fps_timer = 0.0;
        }
    }

    pub fn text(&self) -> String {
        format!(
            "FPS: {}\nFrame: {:.1}ms\nDraws: {}\nSprites: {}",
            self.fps, self.frame_time_ms, self.draw_calls, self.sprites
        )
    }

    /// Samples the batch counters, then draws the metrics in its own
    /// begin/end pair with a 1px shadow. Does nothing when disabled.
    pub fn draw<B: GpuBackend>(
        &mut self,
        batch: &mut SpriteBatch,
        gfx: &mut GraphicsDevice<B>,
        font: &SpriteFont,
    ) {
        if !self.enabled {
            return;
        }

        self.draw_calls = batch.total_draw_calls().saturating_sub(self.last_draw_calls);
        self.sprites = batch.total_sprites().saturating_sub(self.last_sprites);

        let text = self.text();
        batch.begin(None, None);
        batch.draw_string(gfx, font, &text, self.position + Vec2::ONE, Color::BLACK);
        batch.draw_string(gfx, font, &text, self.position, Color::WHITE);
        batch.end(gfx);

        self.last_draw_calls = batch.total_draw_calls();
        self.last_sprites = batch.total_sprites();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Instant;

    use crate::coords::Rect;
    use crate::device::HeadlessBackend;
    use crate::text::Glyph;
    use crate::texture::{SpriteTexture, Texture};

    fn tick(dt: f32, frame_index: u64) -> FrameTime {
        FrameTime {
            dt,
            now: Instant::now(),
            frame_index,
        }
    }

    fn digit_font(gfx: &mut GraphicsDevice<HeadlessBackend>) -> SpriteFont {
        let atlas = Texture::solid(gfx, 16, 16, Color::WHITE).unwrap();
        let glyphs: HashMap<char, Glyph> = "FPSrameDwsitc:0123456789.m"
            .chars()
            .map(|ch| {
                (ch, Glyph {
                    source: Rect::new(0, 0, 4, 4),
                    offset: Vec2::ZERO,
                    advance: 5.0,
                })
            })
            .collect();
        SpriteFont::new(atlas, glyphs, 6.0, HashMap::new())
    }

    // ── fps ───────────────────────────────────────────────────────────────

    #[test]
    fn fps_updates_every_half_second() {
        let mut overlay = DebugOverlay::new(true);
        for i in 0..29 {
            overlay.update(&tick(1.0 / 60.0, i));
        }
        assert_eq!(overlay.fps(), 0);

        overlay.update(&tick(1.0 / 60.0 + 0.001, 29));
        assert!((58..=60).contains(&overlay.fps()), "fps {}", overlay.fps());
        assert!((overlay.frame_time_ms() - 17.666).abs() < 0.01);
    }

    // ── counters ──────────────────────────────────────────────────────────

    #[test]
    fn counts_exclude_overlay_text() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
        let mut batch = SpriteBatch::new(&mut gfx).unwrap();
        let font = digit_font(&mut gfx);
        let tex = Texture::solid(&mut gfx, 4, 4, Color::WHITE).unwrap();
        let mut overlay = DebugOverlay::new(true);

        for _ in 0..2 {
            gfx.begin_frame().unwrap();
            batch.begin(None, None);
            for _ in 0..3 {
                batch.draw(&mut gfx, &tex, Vec2::ZERO, Color::WHITE);
            }
            batch.draw(&mut gfx, font.atlas(), Vec2::ZERO, Color::WHITE);
            batch.end(&mut gfx);
            overlay.draw(&mut batch, &mut gfx, &font);
            gfx.end_frame();
        }

        assert_eq!(overlay.draw_calls(), 2);
        assert_eq!(overlay.sprites(), 4);
        assert_ne!(font.atlas().texture_id(), tex.texture_id());
    }

    #[test]
    fn switching_to_a_fresh_batch_clamps_counts() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
        let mut first = SpriteBatch::new(&mut gfx).unwrap();
        let font = digit_font(&mut gfx);
        let mut overlay = DebugOverlay::new(true);

        gfx.begin_frame().unwrap();
        overlay.draw(&mut first, &mut gfx, &font);
        gfx.end_frame();
        assert!(first.total_sprites() > 0);

        let mut second = SpriteBatch::new(&mut gfx).unwrap();
        gfx.begin_frame().unwrap();
        overlay.draw(&mut second, &mut gfx, &font);
        gfx.end_frame();

        assert_eq!(overlay.draw_calls(), 0);
        assert_eq!(overlay.sprites(), 0);
    }

    #[test]
    fn disabled_overlay_draws_nothing() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
        let mut batch = SpriteBatch::new(&mut gfx).unwrap();
        let font = digit_font(&mut gfx);
        let mut overlay = DebugOverlay::default();

        gfx.begin_frame().unwrap();
        overlay.draw(&mut batch, &mut gfx, &font);
        gfx.end_frame();

        assert_eq!(batch.total_draw_calls(), 0);
    }
}
