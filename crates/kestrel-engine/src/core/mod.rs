//! Application contract.
//!
//! The runtime owns the window and graphics device and calls into an [`App`]
//! with a [`FrameCtx`] each frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
