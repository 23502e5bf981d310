//! Built-in sprite shaders.

use std::borrow::Cow;

use crate::device::{ShaderFormat, ShaderSource, ShaderStage, StageBindings};

/// WGSL source of the default sprite pipeline.
pub const SPRITE_WGSL: &str = include_str!("shaders/sprite_batch.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Formats the built-in shaders ship in, most preferred first.
pub const AVAILABLE_FORMATS: &[ShaderFormat] = &[ShaderFormat::Wgsl];

/// Picks the first built-in format the backend accepts.
pub fn select_format(supported: &[ShaderFormat]) -> Option<ShaderFormat> {
    AVAILABLE_FORMATS
        .iter()
        .copied()
        .find(|f| supported.contains(f))
}

/// Vertex and fragment stages of the default sprite pipeline.
pub(crate) fn sprite_stages(format: ShaderFormat) -> Option<(ShaderStage<'static>, ShaderStage<'static>)> {
    match format {
        ShaderFormat::Wgsl => Some((
            ShaderStage {
                source: ShaderSource::Wgsl(Cow::Borrowed(SPRITE_WGSL)),
                entry_point: VERTEX_ENTRY,
                bindings: StageBindings::SPRITE_VERTEX,
            },
            ShaderStage {
                source: ShaderSource::Wgsl(Cow::Borrowed(SPRITE_WGSL)),
                entry_point: FRAGMENT_ENTRY,
                bindings: StageBindings::SPRITE_FRAGMENT,
            },
        )),
        ShaderFormat::SpirV => None,
    }
}
