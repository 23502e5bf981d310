use std::borrow::Cow;

use anyhow::Result;

use crate::paint::Color;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw backend value, for logging and diagnostics.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// GPU image owned by a [`Texture`](crate::texture::Texture) or
    /// [`RenderTarget`](crate::texture::RenderTarget).
    TextureId
);
handle!(
    /// Immutable graphics pipeline owned by an [`Effect`](crate::effect::Effect).
    PipelineId
);
handle!(
    /// GPU-resident buffer.
    BufferId
);
handle!(
    /// Texture sampler.
    SamplerId
);

/// How a texture will be used.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureUsage {
    /// Sampled `Rgba8Unorm` image filled through a staging upload.
    Sampled,
    /// Color attachment in the surface format that can also be sampled.
    RenderTarget,
}

#[derive(Debug, Clone)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub usage: TextureUsage,
}

impl TextureDesc<'_> {
    /// Size of the RGBA8 pixel data.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerDesc {
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

impl SamplerDesc {
    /// Nearest filtering, clamp-to-edge on every axis. Pixel art stays crisp.
    pub const POINT_CLAMP: SamplerDesc = SamplerDesc {
        filter: wgpu::FilterMode::Nearest,
        address_mode: wgpu::AddressMode::ClampToEdge,
    };
}

/// Drawable image for subsequent render passes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DrawTarget {
    /// The presentable surface image acquired for the current frame.
    #[default]
    Surface,
    /// An offscreen render target.
    Texture {
        id: TextureId,
        width: u32,
        height: u32,
    },
}

impl DrawTarget {
    /// Identity of the underlying image, ignoring its size.
    #[inline]
    pub fn image(&self) -> Option<TextureId> {
        match self {
            DrawTarget::Surface => None,
            DrawTarget::Texture { id, .. } => Some(*id),
        }
    }
}

/// Color attachment load operation for a render pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LoadAction {
    Clear(Color),
    Load,
}

/// Shader code formats a backend can consume.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderFormat {
    Wgsl,
    SpirV,
}

#[derive(Debug, Clone)]
pub enum ShaderSource<'a> {
    Wgsl(Cow<'a, str>),
    SpirV(Cow<'a, [u32]>),
}

impl ShaderSource<'_> {
    pub fn format(&self) -> ShaderFormat {
        match self {
            ShaderSource::Wgsl(_) => ShaderFormat::Wgsl,
            ShaderSource::SpirV(_) => ShaderFormat::SpirV,
        }
    }
}

/// Resource binding counts a shader stage declares.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StageBindings {
    pub samplers: u32,
    pub storage_textures: u32,
    pub storage_buffers: u32,
    pub uniform_buffers: u32,
}

impl StageBindings {
    /// Vertex stage of the sprite pipeline: sprite records + view projection.
    pub const SPRITE_VERTEX: StageBindings = StageBindings {
        samplers: 0,
        storage_textures: 0,
        storage_buffers: 1,
        uniform_buffers: 1,
    };

    /// Fragment stage of the sprite pipeline: one texture/sampler pair.
    pub const SPRITE_FRAGMENT: StageBindings = StageBindings {
        samplers: 1,
        storage_textures: 0,
        storage_buffers: 0,
        uniform_buffers: 0,
    };
}

#[derive(Debug, Clone)]
pub struct ShaderStage<'a> {
    pub source: ShaderSource<'a>,
    pub entry_point: &'a str,
    pub bindings: StageBindings,
}

/// Everything needed to build a sprite pipeline.
///
/// Fixed-function state is not configurable: straight alpha blending, no
/// culling, triangle list, one sample, no depth/stencil, a single color target
/// in the surface format and no vertex buffers.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub vertex: ShaderStage<'a>,
    pub fragment: ShaderStage<'a>,
}

impl PipelineDesc<'_> {
    /// Rejects stages whose binding counts differ from what the sprite batch binds.
    pub fn check_sprite_layout(&self) -> Result<()> {
        anyhow::ensure!(
            self.vertex.bindings == StageBindings::SPRITE_VERTEX,
            "pipeline '{}': vertex stage declares {:?}, the sprite layout requires {:?}",
            self.label,
            self.vertex.bindings,
            StageBindings::SPRITE_VERTEX,
        );
        anyhow::ensure!(
            self.fragment.bindings == StageBindings::SPRITE_FRAGMENT,
            "pipeline '{}': fragment stage declares {:?}, the sprite layout requires {:?}",
            self.label,
            self.fragment.bindings,
            StageBindings::SPRITE_FRAGMENT,
        );
        anyhow::ensure!(
            !self.vertex.entry_point.is_empty() && !self.fragment.entry_point.is_empty(),
            "pipeline '{}': empty shader entry point",
            self.label,
        );
        Ok(())
    }
}

/// Size of the surface image acquired for a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceImage {
    pub width: u32,
    pub height: u32,
}

/// Explicit command-buffer style GPU API the renderer is written against.
///
/// Resource calls may happen at any time. Frame calls must follow
/// `begin_frame → (upload_buffer | render pass)* → end_frame`, and pass calls
/// must sit between `begin_render_pass` and `end_render_pass`.
/// [`GraphicsDevice`](crate::frame::GraphicsDevice) enforces that order;
/// backends may assume it.
pub trait GpuBackend {
    /// Color format of the presentable surface (and of render targets).
    fn surface_format(&self) -> wgpu::TextureFormat;

    /// Last known surface size in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Accepted shader formats, most preferred first.
    fn shader_formats(&self) -> &[ShaderFormat];

    // ── resources ─────────────────────────────────────────────────────────

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureId>;

    /// Replaces the full contents of a sampled texture.
    ///
    /// Runs its own staging copy and submission, independent of the frame.
    fn upload_texture(&mut self, id: TextureId, rgba: &[u8]) -> Result<()>;

    fn destroy_texture(&mut self, id: TextureId);

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<PipelineId>;

    fn destroy_pipeline(&mut self, id: PipelineId);

    /// Creates a buffer readable from the vertex stage as storage.
    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<BufferId>;

    fn destroy_buffer(&mut self, id: BufferId);

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId>;

    fn destroy_sampler(&mut self, id: SamplerId);

    // ── frame ─────────────────────────────────────────────────────────────

    /// Starts a command buffer and tries to acquire the surface image.
    ///
    /// `Ok(None)` means the surface is unavailable this frame (minimized,
    /// resized mid-flight, timed out). `Err` is unrecoverable.
    fn begin_frame(&mut self) -> Result<Option<SurfaceImage>>;

    /// Records a staged copy of `data` into buffer `id` at offset 0.
    ///
    /// Ordered with the render passes recorded before and after it.
    fn upload_buffer(&mut self, id: BufferId, data: &[u8]);

    fn begin_render_pass(&mut self, target: &DrawTarget, load: LoadAction);

    fn bind_pipeline(&mut self, id: PipelineId);

    fn bind_vertex_storage_buffer(&mut self, id: BufferId);

    fn bind_fragment_sampler(&mut self, texture: TextureId, sampler: SamplerId);

    /// Vertex uniform data for subsequent draws in the current pass.
    fn push_vertex_uniform(&mut self, data: &[u8]);

    /// Non-indexed, single-instance draw of `vertex_count` vertices.
    fn draw_primitives(&mut self, vertex_count: u32);

    fn end_render_pass(&mut self);

    /// Submits the command buffer and presents the surface image, if any.
    fn end_frame(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(bindings: StageBindings) -> ShaderStage<'static> {
        ShaderStage {
            source: ShaderSource::Wgsl(Cow::Borrowed("")),
            entry_point: "main",
            bindings,
        }
    }

    #[test]
    fn sprite_layout_accepts_matching_counts() {
        let desc = PipelineDesc {
            label: "ok",
            vertex: stage(StageBindings::SPRITE_VERTEX),
            fragment: stage(StageBindings::SPRITE_FRAGMENT),
        };
        assert!(desc.check_sprite_layout().is_ok());
    }

    #[test]
    fn sprite_layout_rejects_extra_uniform() {
        let desc = PipelineDesc {
            label: "bad",
            vertex: stage(StageBindings {
                uniform_buffers: 2,
                ..StageBindings::SPRITE_VERTEX
            }),
            fragment: stage(StageBindings::SPRITE_FRAGMENT),
        };
        let err = desc.check_sprite_layout().unwrap_err();
        assert!(err.to_string().contains("vertex stage"));
    }

    #[test]
    fn draw_target_image_ignores_size() {
        let a = DrawTarget::Texture { id: TextureId(3), width: 8, height: 8 };
        assert_eq!(a.image(), Some(TextureId(3)));
        assert_eq!(DrawTarget::Surface.image(), None);
    }

    #[test]
    fn texture_byte_len_does_not_wrap_at_u32() {
        let desc = TextureDesc {
            label: "huge",
            width: 40_000,
            height: 30_000,
            usage: TextureUsage::Sampled,
        };
        assert_eq!(desc.byte_len(), 4_800_000_000);
    }
}
