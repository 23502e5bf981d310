use std::borrow::Cow;

use anyhow::{Context, Result};

use crate::device::{
    GpuBackend, PipelineDesc, PipelineId, Release, ResourceGuard, ShaderSource, ShaderStage,
    StageBindings,
};
use crate::frame::GraphicsDevice;

use super::builtin;

/// A vertex + fragment shader pair compiled into an immutable sprite pipeline.
///
/// Every effect shares the sprite batch's fixed state and binding layout, so
/// any effect can be passed to `SpriteBatch::begin`:
///
/// - vertex: `@group(0) @binding(0)` sprite storage buffer, `@group(0) @binding(1)`
///   view-projection `mat4x4<f32>` uniform
/// - fragment: `@group(1) @binding(0)` texture, `@group(1) @binding(1)` sampler
#[derive(Debug)]
pub struct Effect {
    pipeline: PipelineId,
    _guard: ResourceGuard,
}

impl Effect {
    /// Builds an effect from two shader stages.
    ///
    /// Fails when a stage's format is not accepted by the backend, when the
    /// declared binding counts differ from the sprite layout, or when the
    /// backend rejects the pipeline.
    pub fn create<B: GpuBackend>(
        gfx: &mut GraphicsDevice<B>,
        vertex: ShaderStage<'_>,
        fragment: ShaderStage<'_>,
    ) -> Result<Self> {
        let supported = gfx.backend().shader_formats();
        for (name, stage) in [("vertex", &vertex), ("fragment", &fragment)] {
            let format = stage.source.format();
            anyhow::ensure!(
                supported.contains(&format),
                "{name} shader is {format:?}; backend accepts {supported:?}"
            );
        }

        let desc = PipelineDesc {
            label: "kestrel effect",
            vertex,
            fragment,
        };
        let pipeline = gfx
            .backend_mut()
            .create_pipeline(&desc)
            .context("failed to create effect pipeline")?;

        Ok(Self {
            pipeline,
            _guard: ResourceGuard::new(gfx.release_queue(), Release::Pipeline(pipeline)),
        })
    }

    /// Builds an effect from one WGSL module holding both entry points.
    pub fn from_wgsl<B: GpuBackend>(
        gfx: &mut GraphicsDevice<B>,
        source: &str,
        vertex_entry: &str,
        fragment_entry: &str,
    ) -> Result<Self> {
        Self::create(
            gfx,
            ShaderStage {
                source: ShaderSource::Wgsl(Cow::Borrowed(source)),
                entry_point: vertex_entry,
                bindings: StageBindings::SPRITE_VERTEX,
            },
            ShaderStage {
                source: ShaderSource::Wgsl(Cow::Borrowed(source)),
                entry_point: fragment_entry,
                bindings: StageBindings::SPRITE_FRAGMENT,
            },
        )
    }

    /// The default sprite effect, in the first built-in shader format the
    /// backend accepts.
    pub fn builtin<B: GpuBackend>(gfx: &mut GraphicsDevice<B>) -> Result<Self> {
        let supported = gfx.backend().shader_formats();
        let (vertex, fragment) = builtin::select_format(supported)
            .and_then(builtin::sprite_stages)
            .with_context(|| format!("no built-in sprite shader for formats {supported:?}"))?;
        Self::create(gfx, vertex, fragment).context("failed to create built-in sprite effect")
    }

    pub fn pipeline(&self) -> PipelineId {
        self.pipeline
    }
}
