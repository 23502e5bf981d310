use std::collections::HashMap;

use glam::Vec2;
use thiserror::Error;

use crate::batch::{SpriteBatch, SpriteEffects, SpriteParams};
use crate::coords::Rect;
use crate::device::GpuBackend;
use crate::frame::GraphicsDevice;
use crate::paint::Color;
use crate::texture::SpriteTexture;

use super::animation::SpriteAnimation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnimationError {
    #[error("animation '{0}' not found")]
    NotFound(String),
}

/// Playback state for named animations over one spritesheet.
#[derive(Debug)]
pub struct AnimatedSprite<T> {
    texture: T,
    animations: HashMap<String, SpriteAnimation>,
    current: Option<String>,
    frame_index: usize,
    playing: bool,
    timer: f32,
}

impl<T: SpriteTexture> AnimatedSprite<T> {
    pub fn new(texture: T) -> Self {
        Self {
            texture,
            animations: HashMap::new(),
            current: None,
            frame_index: 0,
            playing: false,
            timer: 0.0,
        }
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    /// Registers `animation`, replacing any animation with the same name.
    pub fn add_animation(&mut self, animation: SpriteAnimation) {
        self.animations.insert(animation.name.clone(), animation);
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Source rectangle to draw: the current animation frame, or the whole
    /// texture when nothing has been played.
    pub fn current_frame(&self) -> Rect {
        self.current
            .as_ref()
            .and_then(|name| self.animations.get(name))
            .and_then(|anim| anim.frame(self.frame_index))
            .unwrap_or_else(|| Rect::new(0, 0, self.texture.width() as i32, self.texture.height() as i32))
    }

    /// Starts `name` from its first frame. Replaying the animation that is
    /// already running keeps its progress.
    pub fn play(&mut self, name: &str) -> Result<(), AnimationError> {
        if !self.animations.contains_key(name) {
            return Err(AnimationError::NotFound(name.to_owned()));
        }
        if self.playing && self.current.as_deref() == Some(name) {
            return Ok(());
        }

        self.current = Some(name.to_owned());
        self.frame_index = 0;
        self.timer = 0.0;
        self.playing = true;
        Ok(())
    }

    /// Pauses on the current frame.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Advances playback by `dt` seconds.
    ///
    /// Looping animations wrap to frame 0; one-shot animations hold their last
    /// frame and stop.
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let Some(anim) = self.current.as_ref().and_then(|n| self.animations.get(n)) else {
            return;
        };
        if anim.frame_duration <= 0.0 || anim.frames.is_empty() {
            return;
        }

        self.timer += dt;
        while self.timer >= anim.frame_duration {
            self.timer -= anim.frame_duration;
            self.frame_index += 1;

            if self.frame_index >= anim.frame_count() {
                if anim.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = anim.frame_count() - 1;
                    self.playing = false;
                    break;
                }
            }
        }
    }

    /// Draws the current frame with `params`; `params.source` is replaced.
    pub fn draw<B: GpuBackend>(
        &self,
        batch: &mut SpriteBatch,
        gfx: &mut GraphicsDevice<B>,
        params: &SpriteParams,
    ) {
        batch.draw_ex(gfx, &self.texture, &SpriteParams {
            source: Some(self.current_frame()),
            ..*params
        });
    }

    /// Draws the current frame at `position`, uniformly scaled.
    pub fn draw_at<B: GpuBackend>(
        &self,
        batch: &mut SpriteBatch,
        gfx: &mut GraphicsDevice<B>,
        position: Vec2,
        color: Color,
        scale: f32,
        effects: SpriteEffects,
    ) {
        self.draw(batch, gfx, &SpriteParams {
            position,
            color,
            scale: Vec2::splat(scale),
            effects,
            ..SpriteParams::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::TextureId;

    struct Sheet;

    impl SpriteTexture for Sheet {
        fn texture_id(&self) -> TextureId {
            TextureId(0)
        }

        fn width(&self) -> u32 {
            64
        }

        fn height(&self) -> u32 {
            32
        }
    }

    fn sprite() -> AnimatedSprite<Sheet> {
        let mut s = AnimatedSprite::new(Sheet);
        s.add_animation(SpriteAnimation::from_grid("run", 16, 16, 0, 4, 4, 0.1, true));
        s.add_animation(SpriteAnimation::from_grid("die", 16, 16, 4, 3, 4, 0.1, false));
        s
    }

    // ── playback ──────────────────────────────────────────────────────────

    #[test]
    fn idle_sprite_shows_whole_texture() {
        let s = sprite();
        assert_eq!(s.current_frame(), Rect::new(0, 0, 64, 32));
        assert!(!s.is_playing());
    }

    #[test]
    fn unknown_animation_is_an_error() {
        let mut s = sprite();
        assert_eq!(s.play("jump"), Err(AnimationError::NotFound("jump".into())));
        assert_eq!(s.current_animation(), None);
    }

    #[test]
    fn looping_wraps_to_first_frame() {
        let mut s = sprite();
        s.play("run").unwrap();
        s.update(0.25);
        assert_eq!(s.current_frame_index(), 2);
        s.update(0.2);
        assert_eq!(s.current_frame_index(), 0);
        assert!(s.is_playing());
    }

    #[test]
    fn one_shot_holds_last_frame() {
        let mut s = sprite();
        s.play("die").unwrap();
        s.update(10.0);
        assert_eq!(s.current_frame_index(), 2);
        assert_eq!(s.current_frame(), Rect::new(32, 16, 16, 16));
        assert!(!s.is_playing());
    }

    #[test]
    fn replay_keeps_progress_but_switch_resets() {
        let mut s = sprite();
        s.play("run").unwrap();
        s.update(0.15);
        s.play("run").unwrap();
        assert_eq!(s.current_frame_index(), 1);

        s.play("die").unwrap();
        assert_eq!(s.current_frame_index(), 0);
    }

    #[test]
    fn stop_freezes_frame() {
        let mut s = sprite();
        s.play("run").unwrap();
        s.update(0.1);
        s.stop();
        s.update(1.0);
        assert_eq!(s.current_frame_index(), 1);
    }
}
