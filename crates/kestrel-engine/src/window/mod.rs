//! Window and event loop.
//!
//! Owns the `winit` event loop and the single window, and binds the window's
//! surface to a [`crate::frame::GraphicsDevice`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
