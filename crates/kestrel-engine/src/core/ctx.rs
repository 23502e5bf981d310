use winit::window::{Window, WindowId};

use crate::device::Gpu;
use crate::frame::GraphicsDevice;
use crate::paint::Color;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// The window being drawn.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Physical size in pixels; the surface and the sprite projection use this.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Per-frame context passed to [`super::App::on_frame`].
///
/// `'a` is the callback borrow; `'w` is the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gfx: &'a mut GraphicsDevice<Gpu<'w>>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Runs one frame: sets the clear color, begins the frame, calls `draw`,
    /// then submits and presents.
    ///
    /// Returns [`AppControl::Exit`] when the device reports an unrecoverable
    /// surface error.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut GraphicsDevice<Gpu<'_>>),
    {
        self.gfx.clear(clear);
        if let Err(err) = self.gfx.begin_frame() {
            log::error!("cannot begin frame: {err:#}");
            return AppControl::Exit;
        }

        draw(&mut *self.gfx);

        self.window.window.pre_present_notify();
        self.gfx.end_frame();
        AppControl::Continue
    }
}
