//! Frame and render-pass lifecycle.

mod graphics_device;

pub use graphics_device::{GraphicsDevice, PassToken};
pub(crate) use graphics_device::{PendingBatches, PendingGuard};
