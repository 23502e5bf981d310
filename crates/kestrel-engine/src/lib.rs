//! Kestrel: a batched 2D sprite renderer.
//!
//! Layers, bottom to top:
//! - [`device`]: the GPU command boundary ([`device::GpuBackend`]) with a wgpu
//!   implementation and an in-memory headless one
//! - [`frame`]: per-frame lifecycle, render targets and deferred resource release
//! - [`texture`], [`effect`]: GPU images and sprite shader pipelines
//! - [`batch`]: the sprite batcher
//! - [`text`], [`camera`], [`anim`], [`tilemap`], [`diagnostics`]: helpers built on
//!   the batcher
//! - [`window`], [`core`], [`time`]: the winit runtime and application contract

pub mod device;
pub mod frame;
pub mod texture;
pub mod effect;
pub mod batch;

pub mod text;
pub mod camera;
pub mod anim;
pub mod tilemap;
pub mod diagnostics;

pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
