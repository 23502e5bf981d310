//! Shader pipelines ("effects") usable by the sprite batch.

pub mod builtin;
mod effect;

pub use effect::Effect;
