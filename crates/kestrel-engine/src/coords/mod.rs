//! Coordinate and geometry types.
//!
//! Canonical CPU space for 2D drawing:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! Vectors and matrices come from `glam` and are re-exported here.

mod rect;

pub use glam::{Mat4, Vec2, Vec4};
pub use rect::Rect;
