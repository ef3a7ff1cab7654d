//! vecadd GPU compute
//!
//! Adds three `f32` arrays element-wise with one kernel dispatch on a GPU
//! compute device: Metal on macOS (`metal-backend`), any wgpu adapter
//! (`webgpu-backend`), or the host reference backend which is always built.
//!
//! The entry point is [`VectorAdditionRunner`]; everything below it is a
//! thin layer over the platform API:
//!
//! - [`backend`] — enum dispatch over the compiled-in backends
//! - [`geometry`] — one-dimensional grid/threadgroup sizing
//! - [`codegen`] — MSL and WGSL source for the `add` kernel
//! - [`error`] — failure kinds and their process exit codes

pub mod backend;
pub mod benchmark;
pub mod codegen;
pub mod config;
pub mod data;
pub mod error;
pub mod geometry;
pub mod host;
pub mod vector_add;

#[cfg(all(feature = "metal-backend", target_os = "macos"))]
pub mod metal;

#[cfg(feature = "webgpu-backend")]
pub mod wgpu_backend;

pub use config::{BackendKind, KernelSource, RunConfig};
pub use error::GpuError;
pub use geometry::DispatchGeometry;
pub use vector_add::{Operands, RunReport, VectorAdditionRunner};
