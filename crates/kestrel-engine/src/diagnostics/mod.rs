//! Opt-in runtime diagnostics drawn with the sprite batch.

mod overlay;

pub use overlay::DebugOverlay;
