//! Color model for sprite tinting and clear colors.

mod color;

pub use color::Color;
