use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use anyhow::Result;

use crate::device::{
    BufferId, DrawTarget, GpuBackend, LoadAction, PipelineId, ReleaseQueue, SamplerId,
    SurfaceImage, TextureId,
};
use crate::paint::Color;

/// Proof that a render pass is open on the device.
///
/// Returned by [`GraphicsDevice::begin_render_pass`] and consumed by
/// [`GraphicsDevice::end_render_pass`]. Pass-scoped calls take it by reference.
#[must_use = "a render pass must be ended with GraphicsDevice::end_render_pass"]
#[derive(Debug)]
pub struct PassToken {
    target: DrawTarget,
}

impl PassToken {
    /// The image this pass draws into.
    pub fn target(&self) -> DrawTarget {
        self.target
    }
}

/// Number of sprite batches holding unflushed sprites.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingBatches(Rc<Cell<usize>>);

impl PendingBatches {
    pub(crate) fn count(&self) -> usize {
        self.0.get()
    }

    /// Marks one batch as pending until the guard is dropped.
    pub(crate) fn hold(&self) -> PendingGuard {
        self.0.set(self.0.get() + 1);
        PendingGuard(self.0.clone())
    }
}

#[derive(Debug)]
pub(crate) struct PendingGuard(Rc<Cell<usize>>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

#[derive(Debug)]
struct ActiveFrame {
    surface: Option<SurfaceImage>,
    /// Images that already had their first pass this frame (`None` is the surface).
    cleared: HashSet<Option<TextureId>>,
}

/// Frame and render-pass lifecycle over a [`GpuBackend`].
///
/// Call order per frame:
///
/// ```text
/// begin_frame → (set_render_target | begin_render_pass … end_render_pass)* → end_frame
/// ```
///
/// The first pass on each image in a frame clears it to the clear color; later
/// passes on the same image load what is already there. A frame whose surface
/// was acquired but never drawn to still gets a clear-only pass at
/// `end_frame`.
pub struct GraphicsDevice<B: GpuBackend> {
    backend: B,
    releases: ReleaseQueue,
    pending: PendingBatches,

    clear_color: Color,
    target: DrawTarget,
    backbuffer: (u32, u32),

    frame: Option<ActiveFrame>,
    pass_open: bool,
    frames_submitted: u64,
}

impl<B: GpuBackend> GraphicsDevice<B> {
    pub fn new(backend: B) -> Self {
        let backbuffer = backend.surface_size();
        Self {
            backend,
            releases: ReleaseQueue::new(),
            pending: PendingBatches::default(),

            clear_color: Color::BLACK,
            target: DrawTarget::Surface,
            backbuffer,

            frame: None,
            pass_open: false,
            frames_submitted: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access, for platform calls such as resizing the surface.
    ///
    /// Recording frame commands through it bypasses the lifecycle checks.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub(crate) fn release_queue(&self) -> ReleaseQueue {
        self.releases.clone()
    }

    pub(crate) fn pending_batches(&self) -> PendingBatches {
        self.pending.clone()
    }

    /// Sets the color the first pass on each image clears to.
    pub fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.backend.surface_format()
    }

    pub fn backbuffer_width(&self) -> u32 {
        self.backbuffer.0
    }

    pub fn backbuffer_height(&self) -> u32 {
        self.backbuffer.1
    }

    /// Width of the bound render target, or of the backbuffer.
    pub fn render_width(&self) -> u32 {
        match self.target {
            DrawTarget::Texture { width, .. } => width,
            DrawTarget::Surface => self.backbuffer.0,
        }
    }

    /// Height of the bound render target, or of the backbuffer.
    pub fn render_height(&self) -> u32 {
        match self.target {
            DrawTarget::Texture { height, .. } => height,
            DrawTarget::Surface => self.backbuffer.1,
        }
    }

    pub fn render_target(&self) -> DrawTarget {
        self.target
    }

    pub fn is_frame_active(&self) -> bool {
        self.frame.is_some()
    }

    /// Whether the current frame acquired a surface image.
    pub fn has_surface(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.surface.is_some())
    }

    /// Whether a pass begun now would have an image to draw into.
    pub fn has_drawable_target(&self) -> bool {
        match (&self.frame, self.target) {
            (None, _) => false,
            (Some(_), DrawTarget::Texture { .. }) => true,
            (Some(frame), DrawTarget::Surface) => frame.surface.is_some(),
        }
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Starts a frame: acquires a command buffer and tries to acquire the
    /// surface image.
    ///
    /// A missing surface is not an error; surface passes are skipped for this
    /// frame and [`Self::end_frame`] must still be called. `Err` means the
    /// device cannot continue.
    pub fn begin_frame(&mut self) -> Result<()> {
        assert!(self.frame.is_none(), "begin_frame called twice without end_frame");

        let surface = self.backend.begin_frame()?;
        match surface {
            Some(image) => self.backbuffer = (image.width, image.height),
            None => log::debug!("frame has no surface image; surface drawing skipped"),
        }

        self.frame = Some(ActiveFrame {
            surface,
            cleared: HashSet::new(),
        });
        Ok(())
    }

    /// Redirects subsequent passes to `target`. Does not open a pass.
    ///
    /// # Panics
    ///
    /// If a render pass is open, or a sprite batch still holds unflushed
    /// sprites (use `SpriteBatch::set_render_target`, which flushes first).
    pub fn set_render_target(&mut self, target: DrawTarget) {
        assert!(!self.pass_open, "set_render_target while a render pass is open");
        assert!(
            self.pending.count() == 0,
            "set_render_target with unflushed sprites; flush the sprite batch first"
        );
        self.target = target;
    }

    /// Opens a pass on the current target.
    ///
    /// Returns `None` when the surface is the target and was not acquired this
    /// frame.
    pub fn begin_render_pass(&mut self) -> Option<PassToken> {
        assert!(!self.pass_open, "begin_render_pass while a render pass is open");
        let Some(frame) = self.frame.as_mut() else {
            panic!("begin_render_pass outside a frame");
        };

        if self.target == DrawTarget::Surface && frame.surface.is_none() {
            return None;
        }

        let load = if frame.cleared.insert(self.target.image()) {
            LoadAction::Clear(self.clear_color)
        } else {
            LoadAction::Load
        };

        self.backend.begin_render_pass(&self.target, load);
        self.pass_open = true;
        Some(PassToken {
            target: self.target,
        })
    }

    pub fn bind_pipeline(&mut self, _pass: &PassToken, pipeline: PipelineId) {
        self.backend.bind_pipeline(pipeline);
    }

    pub fn bind_vertex_storage_buffer(&mut self, _pass: &PassToken, buffer: BufferId) {
        self.backend.bind_vertex_storage_buffer(buffer);
    }

    pub fn bind_fragment_sampler(&mut self, _pass: &PassToken, texture: TextureId, sampler: SamplerId) {
        self.backend.bind_fragment_sampler(texture, sampler);
    }

    pub fn push_vertex_uniform(&mut self, _pass: &PassToken, data: &[u8]) {
        self.backend.push_vertex_uniform(data);
    }

    pub fn draw_primitives(&mut self, _pass: &PassToken, vertex_count: u32) {
        self.backend.draw_primitives(vertex_count);
    }

    pub fn end_render_pass(&mut self, pass: PassToken) {
        debug_assert_eq!(pass.target, self.target);
        self.backend.end_render_pass();
        self.pass_open = false;
    }

    /// Records a staged copy into `buffer`, ordered before the next pass.
    pub fn upload_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        assert!(self.frame.is_some(), "upload_buffer outside a frame");
        assert!(!self.pass_open, "upload_buffer while a render pass is open");
        self.backend.upload_buffer(buffer, data);
    }

    /// Finishes the frame: clears an untouched surface, submits, presents and
    /// then destroys resources dropped during the frame.
    pub fn end_frame(&mut self) {
        assert!(!self.pass_open, "end_frame while a render pass is open");
        let Some(frame) = self.frame.take() else {
            panic!("end_frame called without begin_frame");
        };

        if frame.surface.is_some() && !frame.cleared.contains(&None) {
            self.backend
                .begin_render_pass(&DrawTarget::Surface, LoadAction::Clear(self.clear_color));
            self.backend.end_render_pass();
        }

        self.backend.end_frame();
        self.frames_submitted += 1;
        self.drain_releases();
    }

    /// Destroys resources dropped since the last submission.
    ///
    /// Outside a frame this runs immediately; during a frame it is deferred to
    /// [`Self::end_frame`]. Returns the number of handles destroyed.
    pub fn release_dropped(&mut self) -> usize {
        if self.frame.is_some() {
            return 0;
        }
        self.drain_releases()
    }

    fn drain_releases(&mut self) -> usize {
        let released = self.releases.take();
        let n = released.len();
        for r in released {
            r.apply(&mut self.backend);
        }
        if n > 0 {
            log::trace!("released {n} GPU handles");
        }
        n
    }
}

impl<B: GpuBackend> Drop for GraphicsDevice<B> {
    fn drop(&mut self) {
        if self.frame.is_none() {
            self.drain_releases();
        }
    }
}
