use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};

use super::backend::{
    BufferId, DrawTarget, GpuBackend, LoadAction, PipelineDesc, PipelineId, SamplerDesc,
    SamplerId, ShaderFormat, SurfaceImage, TextureDesc, TextureId, TextureUsage,
};

/// One recorded frame-level call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    BeginFrame { surface: Option<SurfaceImage> },
    UploadBuffer { buffer: BufferId, bytes: Vec<u8> },
    BeginRenderPass { target: DrawTarget, load: LoadAction },
    BindPipeline(PipelineId),
    BindVertexStorageBuffer(BufferId),
    BindFragmentSampler { texture: TextureId, sampler: SamplerId },
    PushVertexUniform(Vec<u8>),
    DrawPrimitives { vertex_count: u32 },
    EndRenderPass,
    EndFrame,
}

#[derive(Debug)]
struct HeadlessTexture {
    width: u32,
    height: u32,
    usage: TextureUsage,
    pixels: Vec<u8>,
}

#[derive(Debug, Default)]
struct PassBindings {
    pipeline: bool,
    storage: bool,
    sampler: bool,
    uniform: bool,
}

/// GPU-less backend that records the command stream.
///
/// Texture contents and storage buffer contents are kept in memory so callers
/// can inspect exactly what a frame would have sent to the device. The
/// surface can be made unavailable to exercise the no-surface path.
#[derive(Debug)]
pub struct HeadlessBackend {
    format: wgpu::TextureFormat,
    size: (u32, u32),
    shader_formats: Vec<ShaderFormat>,
    surface_available: bool,

    next_id: u32,
    textures: HashMap<TextureId, HeadlessTexture>,
    pipelines: HashSet<PipelineId>,
    buffers: HashMap<BufferId, Vec<u8>>,
    samplers: HashSet<SamplerId>,

    commands: Vec<GpuCommand>,
    in_frame: bool,
    pass: Option<PassBindings>,
    frames_submitted: u64,
}

impl HeadlessBackend {
    /// Backend with a `width × height` surface in `Bgra8Unorm` accepting WGSL.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            format: wgpu::TextureFormat::Bgra8Unorm,
            size: (width, height),
            shader_formats: vec![ShaderFormat::Wgsl],
            surface_available: true,

            next_id: 1,
            textures: HashMap::new(),
            pipelines: HashSet::new(),
            buffers: HashMap::new(),
            samplers: HashSet::new(),

            commands: Vec::new(),
            in_frame: false,
            pass: None,
            frames_submitted: 0,
        }
    }

    /// Restricts the accepted shader formats (most preferred first).
    pub fn with_shader_formats(mut self, formats: &[ShaderFormat]) -> Self {
        self.shader_formats = formats.to_vec();
        self
    }

    /// Simulates a minimized or lost surface for the following frames.
    pub fn set_surface_available(&mut self, available: bool) {
        self.surface_available = available;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Commands recorded since creation or the last [`Self::take_commands`].
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn texture_pixels(&self, id: TextureId) -> Option<&[u8]> {
        self.textures.get(&id).map(|t| t.pixels.as_slice())
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    pub fn buffer_contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    pub fn is_live_texture(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Number of resources not yet destroyed, of any kind.
    pub fn live_resources(&self) -> usize {
        self.textures.len() + self.pipelines.len() + self.buffers.len() + self.samplers.len()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn pass_mut(&mut self, call: &str) -> &mut PassBindings {
        match self.pass.as_mut() {
            Some(p) => p,
            None => panic!("{call} recorded outside a render pass"),
        }
    }
}

impl GpuBackend for HeadlessBackend {
    fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn shader_formats(&self) -> &[ShaderFormat] {
        &self.shader_formats
    }

    // ── resources ─────────────────────────────────────────────────────────

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureId> {
        anyhow::ensure!(
            desc.width > 0 && desc.height > 0,
            "texture '{}' has zero size",
            desc.label
        );
        let id = TextureId(self.alloc());
        self.textures.insert(
            id,
            HeadlessTexture {
                width: desc.width,
                height: desc.height,
                usage: desc.usage,
                pixels: vec![0; desc.byte_len()],
            },
        );
        Ok(id)
    }

    fn upload_texture(&mut self, id: TextureId, rgba: &[u8]) -> Result<()> {
        let tex = self
            .textures
            .get_mut(&id)
            .with_context(|| format!("upload to unknown texture {id:?}"))?;
        anyhow::ensure!(
            tex.usage == TextureUsage::Sampled,
            "texture {id:?} is not an upload destination"
        );
        anyhow::ensure!(
            rgba.len() == tex.pixels.len(),
            "texture {id:?} expects {} bytes, got {}",
            tex.pixels.len(),
            rgba.len()
        );
        tex.pixels.copy_from_slice(rgba);
        Ok(())
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<PipelineId> {
        desc.check_sprite_layout()?;
        for stage in [&desc.vertex, &desc.fragment] {
            anyhow::ensure!(
                self.shader_formats.contains(&stage.source.format()),
                "pipeline '{}': shader format {:?} not supported",
                desc.label,
                stage.source.format()
            );
        }
        let id = PipelineId(self.alloc());
        self.pipelines.insert(id);
        Ok(id)
    }

    fn destroy_pipeline(&mut self, id: PipelineId) {
        self.pipelines.remove(&id);
    }

    fn create_storage_buffer(&mut self, _label: &str, size: u64) -> Result<BufferId> {
        let id = BufferId(self.alloc());
        self.buffers.insert(id, vec![0; size as usize]);
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        self.buffers.remove(&id);
    }

    fn create_sampler(&mut self, _desc: &SamplerDesc) -> Result<SamplerId> {
        let id = SamplerId(self.alloc());
        self.samplers.insert(id);
        Ok(id)
    }

    fn destroy_sampler(&mut self, id: SamplerId) {
        self.samplers.remove(&id);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    fn begin_frame(&mut self) -> Result<Option<SurfaceImage>> {
        assert!(!self.in_frame, "begin_frame while a frame is recording");
        self.in_frame = true;

        let (width, height) = self.size;
        let surface = (self.surface_available && width > 0 && height > 0)
            .then_some(SurfaceImage { width, height });
        self.commands.push(GpuCommand::BeginFrame { surface });
        Ok(surface)
    }

    fn upload_buffer(&mut self, id: BufferId, data: &[u8]) {
        assert!(self.in_frame, "upload_buffer outside a frame");
        assert!(self.pass.is_none(), "upload_buffer inside a render pass");
        let Some(buf) = self.buffers.get_mut(&id) else {
            panic!("upload_buffer to unknown buffer {id:?}");
        };
        assert!(
            data.len() <= buf.len(),
            "upload of {} bytes overflows buffer {id:?} ({} bytes)",
            data.len(),
            buf.len()
        );
        buf[..data.len()].copy_from_slice(data);
        self.commands.push(GpuCommand::UploadBuffer {
            buffer: id,
            bytes: data.to_vec(),
        });
    }

    fn begin_render_pass(&mut self, target: &DrawTarget, load: LoadAction) {
        assert!(self.in_frame, "begin_render_pass outside a frame");
        assert!(self.pass.is_none(), "nested render pass");
        self.pass = Some(PassBindings::default());
        self.commands.push(GpuCommand::BeginRenderPass {
            target: *target,
            load,
        });
    }

    fn bind_pipeline(&mut self, id: PipelineId) {
        assert!(self.pipelines.contains(&id), "bind of destroyed pipeline {id:?}");
        self.pass_mut("bind_pipeline").pipeline = true;
        self.commands.push(GpuCommand::BindPipeline(id));
    }

    fn bind_vertex_storage_buffer(&mut self, id: BufferId) {
        assert!(self.buffers.contains_key(&id), "bind of destroyed buffer {id:?}");
        self.pass_mut("bind_vertex_storage_buffer").storage = true;
        self.commands.push(GpuCommand::BindVertexStorageBuffer(id));
    }

    fn bind_fragment_sampler(&mut self, texture: TextureId, sampler: SamplerId) {
        assert!(self.textures.contains_key(&texture), "bind of destroyed texture {texture:?}");
        assert!(self.samplers.contains(&sampler), "bind of destroyed sampler {sampler:?}");
        self.pass_mut("bind_fragment_sampler").sampler = true;
        self.commands
            .push(GpuCommand::BindFragmentSampler { texture, sampler });
    }

    fn push_vertex_uniform(&mut self, data: &[u8]) {
        self.pass_mut("push_vertex_uniform").uniform = true;
        self.commands.push(GpuCommand::PushVertexUniform(data.to_vec()));
    }

    fn draw_primitives(&mut self, vertex_count: u32) {
        let pass = self.pass_mut("draw_primitives");
        assert!(
            pass.pipeline && pass.storage && pass.sampler && pass.uniform,
            "draw with incomplete bindings: {pass:?}"
        );
        self.commands.push(GpuCommand::DrawPrimitives { vertex_count });
    }

    fn end_render_pass(&mut self) {
        assert!(self.pass.take().is_some(), "end_render_pass without a pass");
        self.commands.push(GpuCommand::EndRenderPass);
    }

    fn end_frame(&mut self) {
        assert!(self.in_frame, "end_frame without begin_frame");
        assert!(self.pass.is_none(), "end_frame with an open render pass");
        self.in_frame = false;
        self.frames_submitted += 1;
        self.commands.push(GpuCommand::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampled(w: u32, h: u32) -> TextureDesc<'static> {
        TextureDesc {
            label: "t",
            width: w,
            height: h,
            usage: TextureUsage::Sampled,
        }
    }

    #[test]
    fn upload_replaces_pixels() {
        let mut b = HeadlessBackend::new(64, 64);
        let id = b.create_texture(&sampled(2, 1)).unwrap();
        b.upload_texture(id, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(b.texture_pixels(id), Some(&[1, 2, 3, 4, 5, 6, 7, 8][..]));
    }

    #[test]
    fn upload_with_wrong_length_fails() {
        let mut b = HeadlessBackend::new(64, 64);
        let id = b.create_texture(&sampled(2, 2)).unwrap();
        assert!(b.upload_texture(id, &[0; 4]).is_err());
    }

    #[test]
    fn missing_surface_reported_by_begin_frame() {
        let mut b = HeadlessBackend::new(64, 64);
        b.set_surface_available(false);
        assert_eq!(b.begin_frame().unwrap(), None);
        b.end_frame();
        assert_eq!(b.frames_submitted(), 1);
    }

    #[test]
    #[should_panic(expected = "nested render pass")]
    fn nested_pass_panics() {
        let mut b = HeadlessBackend::new(8, 8);
        b.begin_frame().unwrap();
        b.begin_render_pass(&DrawTarget::Surface, LoadAction::Load);
        b.begin_render_pass(&DrawTarget::Surface, LoadAction::Load);
    }
}
