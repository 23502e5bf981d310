//! World-to-screen transforms for sprite drawing.
//!
//! Pass [`Camera2D::view_matrix`] as the transform of `SpriteBatch::begin`.

mod camera2d;

pub use camera2d::Camera2D;
