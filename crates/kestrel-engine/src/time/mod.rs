//! Frame timing.
//!
//! The runtime owns one [`FrameClock`] and ticks it once per redraw; the
//! resulting [`FrameTime`] drives animation and the debug overlay.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
