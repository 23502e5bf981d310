use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::backend::{
    BufferId, DrawTarget, GpuBackend, LoadAction, PipelineDesc, PipelineId, SamplerDesc,
    SamplerId, ShaderFormat, ShaderSource, ShaderStage, SurfaceImage, TextureDesc, TextureId,
    TextureUsage,
};
use super::staging::pad_rows;
use super::surface;
use super::{GpuInit, SurfaceErrorAction};

const UNIFORM_SIZE: u64 = 64;

/// Bind group layouts shared by every sprite pipeline.
///
/// Group 0 is vertex-visible: binding 0 is the sprite storage buffer, binding 1
/// the view-projection uniform. Group 1 is fragment-visible: binding 0 is the
/// texture, binding 1 its sampler.
struct SpriteLayouts {
    vertex: wgpu::BindGroupLayout,
    fragment: wgpu::BindGroupLayout,
    pipeline: wgpu::PipelineLayout,
}

impl SpriteLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let vertex = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kestrel sprite vertex bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                    },
                    count: None,
                },
            ],
        });

        let fragment = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kestrel sprite fragment bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kestrel sprite pipeline layout"),
            bind_group_layouts: &[&vertex, &fragment],
            immediate_size: 0,
        });

        Self {
            vertex,
            fragment,
            pipeline,
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    usage: TextureUsage,
}

/// Draw call captured while a pass is open; encoded at `end_render_pass`.
struct PendingDraw {
    pipeline: PipelineId,
    storage: BufferId,
    texture: TextureId,
    sampler: SamplerId,
    uniform: Vec<u8>,
    vertex_count: u32,
}

#[derive(Default)]
struct PassState {
    pipeline: Option<PipelineId>,
    storage: Option<BufferId>,
    sampler: Option<(TextureId, SamplerId)>,
    uniform: Option<Vec<u8>>,
}

struct PendingPass {
    target: DrawTarget,
    load: LoadAction,
    state: PassState,
    draws: Vec<PendingDraw>,
}

struct FrameState {
    encoder: wgpu::CommandEncoder,
    surface: Option<(wgpu::SurfaceTexture, wgpu::TextureView)>,
    pass: Option<PendingPass>,
    /// Staging buffers referenced by copies in `encoder`; kept until submit.
    staging: Vec<wgpu::Buffer>,
}

/// wgpu backend bound to a window surface.
///
/// Render passes are recorded lazily: binds and draws issued between
/// `begin_render_pass` and `end_render_pass` are captured and encoded in one
/// `wgpu::RenderPass` when the pass ends, so every per-draw resource (uniform
/// buffer, bind groups) exists before the pass borrows the encoder.
pub struct Gpu<'w> {
    /// wgpu instance used to create the adapter and surface.
    instance: wgpu::Instance,

    /// Surface bound to the window.
    surface: wgpu::Surface<'w>,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    layouts: SpriteLayouts,

    next_id: u32,
    textures: HashMap<TextureId, GpuTexture>,
    pipelines: HashMap<PipelineId, wgpu::RenderPipeline>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    samplers: HashMap<SamplerId, wgpu::Sampler>,

    frame: Option<FrameState>,
}

impl<'w> Gpu<'w> {
    /// Creates the device and configures a surface for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        log::info!("using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kestrel device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        device.on_uncaptured_error(uncaptured_error_logger());

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        let layouts = SpriteLayouts::new(&device);

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            layouts,
            next_id: 1,
            textures: HashMap::new(),
            pipelines: HashMap::new(),
            buffers: HashMap::new(),
            samplers: HashMap::new(),
            frame: None,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface after a resize.
    ///
    /// A 0x0 size only updates internal state; frames report no surface until
    /// the window has an area again.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if surface::apply_resize(&mut self.config, &mut self.size, new_size) {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn shader_module(&self, label: &str, stage: &ShaderStage<'_>) -> wgpu::ShaderModule {
        let source = match &stage.source {
            ShaderSource::Wgsl(code) => wgpu::ShaderSource::Wgsl(code.clone()),
            ShaderSource::SpirV(words) => wgpu::ShaderSource::SpirV(words.clone()),
        };
        self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source,
        })
    }

    fn acquire_surface(&mut self) -> Result<Option<(wgpu::SurfaceTexture, wgpu::TextureView)>> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(None);
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some((surface_texture, view)))
            }
            Err(err) => match SurfaceErrorAction::classify(&err) {
                SurfaceErrorAction::Reconfigure => {
                    log::debug!("surface {err}; reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                    Ok(None)
                }
                SurfaceErrorAction::SkipFrame => {
                    log::debug!("surface {err}; skipping frame");
                    Ok(None)
                }
                SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface acquisition failed: {err}")),
            },
        }
    }

    /// Encodes a captured pass into the frame's command encoder.
    fn encode_pass(&mut self, pass: PendingPass) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        // Per-draw resources must outlive the render pass that references them.
        let mut bound: Vec<(&wgpu::RenderPipeline, wgpu::BindGroup, wgpu::BindGroup, u32)> =
            Vec::with_capacity(pass.draws.len());
        for draw in &pass.draws {
            let (Some(pipeline), Some(storage), Some(texture), Some(sampler)) = (
                self.pipelines.get(&draw.pipeline),
                self.buffers.get(&draw.storage),
                self.textures.get(&draw.texture),
                self.samplers.get(&draw.sampler),
            ) else {
                log::warn!("draw references a destroyed resource; skipped");
                continue;
            };

            let uniform = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("kestrel sprite uniform"),
                    contents: &draw.uniform,
                    usage: wgpu::BufferUsages::UNIFORM,
                });

            let vertex_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("kestrel sprite vertex bind group"),
                layout: &self.layouts.vertex,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: storage.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: uniform.as_entire_binding(),
                    },
                ],
            });

            let fragment_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("kestrel sprite fragment bind group"),
                layout: &self.layouts.fragment,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });

            bound.push((pipeline, vertex_group, fragment_group, draw.vertex_count));
        }

        let view = match pass.target {
            DrawTarget::Surface => match frame.surface.as_ref() {
                Some((_, view)) => view,
                None => {
                    log::warn!("surface pass without an acquired surface image; dropped");
                    return;
                }
            },
            DrawTarget::Texture { id, .. } => match self.textures.get(&id) {
                Some(tex) if tex.usage == TextureUsage::RenderTarget => &tex.view,
                _ => {
                    log::warn!("pass targets {id:?}, which is not a live render target; dropped");
                    return;
                }
            },
        };

        let load = match pass.load {
            LoadAction::Clear(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
            LoadAction::Load => wgpu::LoadOp::Load,
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kestrel sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (pipeline, vertex_group, fragment_group, vertex_count) in &bound {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, vertex_group, &[]);
            rpass.set_bind_group(1, fragment_group, &[]);
            rpass.draw(0..*vertex_count, 0..1);
        }
    }

    fn pass_state(&mut self, call: &str) -> &mut PassState {
        match self.frame.as_mut().and_then(|f| f.pass.as_mut()) {
            Some(pass) => &mut pass.state,
            None => panic!("{call} recorded outside a render pass"),
        }
    }
}

impl GpuBackend for Gpu<'_> {
    fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn shader_formats(&self) -> &[ShaderFormat] {
        &[ShaderFormat::Wgsl, ShaderFormat::SpirV]
    }

    // ── resources ─────────────────────────────────────────────────────────

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureId> {
        anyhow::ensure!(
            desc.width > 0 && desc.height > 0,
            "texture '{}' has zero size",
            desc.label
        );
        let max = self.device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            desc.width <= max && desc.height <= max,
            "texture '{}' is {}x{}, device limit is {max}",
            desc.label,
            desc.width,
            desc.height
        );

        let (format, usage) = match desc.usage {
            TextureUsage::Sampled => (
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            ),
            TextureUsage::RenderTarget => (
                self.config.format,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            ),
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let id = TextureId(self.alloc());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                width: desc.width,
                height: desc.height,
                usage: desc.usage,
            },
        );
        Ok(id)
    }

    fn upload_texture(&mut self, id: TextureId, rgba: &[u8]) -> Result<()> {
        let tex = self
            .textures
            .get(&id)
            .with_context(|| format!("upload to unknown texture {id:?}"))?;
        anyhow::ensure!(
            tex.usage == TextureUsage::Sampled,
            "texture {id:?} is not an upload destination"
        );
        let expected = tex.width as usize * tex.height as usize * 4;
        anyhow::ensure!(
            rgba.len() == expected,
            "texture {id:?} expects {expected} bytes, got {}",
            rgba.len()
        );

        let (padded, bytes_per_row) = pad_rows(rgba, tex.width, tex.height, 4);
        let staging = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kestrel texture staging"),
                contents: &padded,
                usage: wgpu::BufferUsages::COPY_SRC,
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kestrel texture upload"),
            });
        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(tex.height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: tex.width,
                height: tex.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if let Some(tex) = self.textures.remove(&id) {
            tex.texture.destroy();
        }
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<PipelineId> {
        desc.check_sprite_layout()?;

        let vs = self.shader_module(desc.label, &desc.vertex);
        let fs = self.shader_module(desc.label, &desc.fragment);

        let blend = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&self.layouts.pipeline),

                vertex: wgpu::VertexState {
                    module: &vs,
                    entry_point: Some(desc.vertex.entry_point),
                    compilation_options: Default::default(),
                    buffers: &[],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs,
                    entry_point: Some(desc.fragment.entry_point),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState {
                            color: blend,
                            alpha: blend,
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let id = PipelineId(self.alloc());
        self.pipelines.insert(id, pipeline);
        Ok(id)
    }

    fn destroy_pipeline(&mut self, id: PipelineId) {
        self.pipelines.remove(&id);
    }

    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<BufferId> {
        anyhow::ensure!(size > 0, "storage buffer '{label}' has zero size");
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let id = BufferId(self.alloc());
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if let Some(buffer) = self.buffers.remove(&id) {
            buffer.destroy();
        }
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId> {
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kestrel sampler"),
            address_mode_u: desc.address_mode,
            address_mode_v: desc.address_mode,
            address_mode_w: desc.address_mode,
            mag_filter: desc.filter,
            min_filter: desc.filter,
            ..Default::default()
        });
        let id = SamplerId(self.alloc());
        self.samplers.insert(id, sampler);
        Ok(id)
    }

    fn destroy_sampler(&mut self, id: SamplerId) {
        self.samplers.remove(&id);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    fn begin_frame(&mut self) -> Result<Option<SurfaceImage>> {
        assert!(self.frame.is_none(), "begin_frame while a frame is recording");

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kestrel frame encoder"),
            });

        let surface = self.acquire_surface()?;
        let image = surface.as_ref().map(|(st, _)| SurfaceImage {
            width: st.texture.width(),
            height: st.texture.height(),
        });

        self.frame = Some(FrameState {
            encoder,
            surface,
            pass: None,
            staging: Vec::new(),
        });
        Ok(image)
    }

    fn upload_buffer(&mut self, id: BufferId, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let Some(dst) = self.buffers.get(&id) else {
            log::warn!("upload to destroyed buffer {id:?}; skipped");
            return;
        };
        let Some(frame) = self.frame.as_mut() else {
            panic!("upload_buffer outside a frame");
        };

        let staging = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kestrel sprite staging"),
                contents: data,
                usage: wgpu::BufferUsages::COPY_SRC,
            });
        frame
            .encoder
            .copy_buffer_to_buffer(&staging, 0, dst, 0, data.len() as u64);
        frame.staging.push(staging);
    }

    fn begin_render_pass(&mut self, target: &DrawTarget, load: LoadAction) {
        let Some(frame) = self.frame.as_mut() else {
            panic!("begin_render_pass outside a frame");
        };
        assert!(frame.pass.is_none(), "nested render pass");
        frame.pass = Some(PendingPass {
            target: *target,
            load,
            state: PassState::default(),
            draws: Vec::new(),
        });
    }

    fn bind_pipeline(&mut self, id: PipelineId) {
        self.pass_state("bind_pipeline").pipeline = Some(id);
    }

    fn bind_vertex_storage_buffer(&mut self, id: BufferId) {
        self.pass_state("bind_vertex_storage_buffer").storage = Some(id);
    }

    fn bind_fragment_sampler(&mut self, texture: TextureId, sampler: SamplerId) {
        self.pass_state("bind_fragment_sampler").sampler = Some((texture, sampler));
    }

    fn push_vertex_uniform(&mut self, data: &[u8]) {
        let mut bytes = data.to_vec();
        if (bytes.len() as u64) < UNIFORM_SIZE {
            bytes.resize(UNIFORM_SIZE as usize, 0);
        }
        self.pass_state("push_vertex_uniform").uniform = Some(bytes);
    }

    fn draw_primitives(&mut self, vertex_count: u32) {
        let Some(pass) = self.frame.as_mut().and_then(|f| f.pass.as_mut()) else {
            panic!("draw_primitives recorded outside a render pass");
        };
        let state = &pass.state;
        let (Some(pipeline), Some(storage), Some((texture, sampler)), Some(uniform)) = (
            state.pipeline,
            state.storage,
            state.sampler,
            state.uniform.clone(),
        ) else {
            panic!("draw with incomplete bindings");
        };
        pass.draws.push(PendingDraw {
            pipeline,
            storage,
            texture,
            sampler,
            uniform,
            vertex_count,
        });
    }

    fn end_render_pass(&mut self) {
        let Some(pass) = self.frame.as_mut().and_then(|f| f.pass.take()) else {
            panic!("end_render_pass without a pass");
        };
        self.encode_pass(pass);
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            panic!("end_frame without begin_frame");
        };
        assert!(frame.pass.is_none(), "end_frame with an open render pass");

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.staging);
        if let Some((surface_texture, view)) = frame.surface {
            drop(view);
            surface_texture.present();
        }
    }
}

/// Logs validation and device errors that no error scope captured.
fn uncaptured_error_logger() -> Arc<dyn wgpu::UncapturedErrorHandler> {
    Arc::new(|e: wgpu::Error| {
        log::error!("wgpu uncaptured error: {e}");
    })
}
