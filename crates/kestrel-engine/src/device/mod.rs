//! GPU boundary.
//!
//! The renderer talks to the GPU through [`GpuBackend`], an explicit
//! command-buffer style API over opaque handles:
//! - [`Gpu`] implements it with wgpu on a winit window surface
//! - [`HeadlessBackend`] records commands in memory, for tests and diagnostics
//!
//! Dropped resources are returned through a [`ReleaseQueue`] and destroyed only
//! when no command buffer that may reference them is in flight.

mod backend;
mod error;
mod gpu;
mod headless;
mod init;
mod release;
mod staging;
mod surface;

pub use backend::{
    BufferId, DrawTarget, GpuBackend, LoadAction, PipelineDesc, PipelineId, SamplerDesc,
    SamplerId, ShaderFormat, ShaderSource, ShaderStage, StageBindings, SurfaceImage,
    TextureDesc, TextureId, TextureUsage,
};
pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use headless::{GpuCommand, HeadlessBackend};
pub use init::GpuInit;
pub use release::{Release, ReleaseQueue};
pub(crate) use release::ResourceGuard;
