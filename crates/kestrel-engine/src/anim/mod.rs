//! Spritesheet animation.
//!
//! A [`SpriteAnimation`] is an immutable list of source rectangles with a
//! fixed frame duration; an [`AnimatedSprite`] plays named animations over a
//! single spritesheet texture.

mod animated_sprite;
mod animation;

pub use animated_sprite::{AnimatedSprite, AnimationError};
pub use animation::SpriteAnimation;
