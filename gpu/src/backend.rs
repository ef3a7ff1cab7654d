//! Backend abstraction — thin enum dispatch layer over Metal, wgpu and host.
//!
//! `NativeContext`, `NativeBuffer`, and `NativeCompiledKernel` wrap the
//! backend-specific types. Arms for backends that are not compiled in
//! disappear under `cfg`; the host arm is always present.

use log::debug;

use crate::config::{BackendKind, KernelSource};
use crate::error::GpuError;
use crate::host::{self, HostBuffer, HostKernel};

#[cfg(all(feature = "metal-backend", target_os = "macos"))]
use crate::metal::{buffer_ops::MetalBuffer, compile::CompiledKernel, device_init::MetalContext};

#[cfg(feature = "webgpu-backend")]
use crate::wgpu_backend::{
    buffer_ops::WgpuBuffer, compile::WgpuCompiledKernel, device_init::WgpuContext,
};

// ---------------------------------------------------------------------------
// NativeContext
// ---------------------------------------------------------------------------

pub enum NativeContext {
    #[cfg(all(feature = "metal-backend", target_os = "macos"))]
    Metal(MetalContext),
    #[cfg(feature = "webgpu-backend")]
    Wgpu(WgpuContext),
    Host,
}

#[allow(unused_variables)]
impl NativeContext {
    /// Open the requested backend. `Auto` tries Metal, then WebGPU.
    pub fn new(kind: BackendKind) -> Result<Self, GpuError> {
        match kind {
            BackendKind::Auto => {
                let mut reasons = Vec::new();
                for candidate in [BackendKind::Metal, BackendKind::Wgpu] {
                    match Self::new(candidate) {
                        Ok(ctx) => return Ok(ctx),
                        Err(e) => {
                            debug!("{} backend unavailable: {}", candidate.name(), e);
                            reasons.push(format!("{}: {}", candidate.name(), e));
                        }
                    }
                }
                Err(GpuError::DeviceUnavailable(reasons.join("; ")))
            }
            BackendKind::Metal => {
                #[cfg(all(feature = "metal-backend", target_os = "macos"))]
                {
                    MetalContext::new().map(NativeContext::Metal)
                }
                #[cfg(not(all(feature = "metal-backend", target_os = "macos")))]
                {
                    Err(GpuError::DeviceUnavailable(
                        "Metal backend not compiled in".to_string(),
                    ))
                }
            }
            BackendKind::Wgpu => {
                #[cfg(feature = "webgpu-backend")]
                {
                    WgpuContext::new().map(NativeContext::Wgpu)
                }
                #[cfg(not(feature = "webgpu-backend"))]
                {
                    Err(GpuError::DeviceUnavailable(
                        "WebGPU backend not compiled in".to_string(),
                    ))
                }
            }
            BackendKind::Host => Ok(NativeContext::Host),
        }
    }

    /// Backend that was actually opened.
    pub fn kind(&self) -> BackendKind {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeContext::Metal(_) => BackendKind::Metal,
            #[cfg(feature = "webgpu-backend")]
            NativeContext::Wgpu(_) => BackendKind::Wgpu,
            NativeContext::Host => BackendKind::Host,
        }
    }

    pub fn device_name(&self) -> String {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeContext::Metal(ctx) => ctx.device_name(),
            #[cfg(feature = "webgpu-backend")]
            NativeContext::Wgpu(ctx) => ctx.adapter_name.clone(),
            NativeContext::Host => "host cpu".to_string(),
        }
    }

    /// Load the kernel module, resolve `fn_name` and build its pipeline.
    pub fn load_kernel(
        &self,
        source: &KernelSource,
        fn_name: &str,
    ) -> Result<NativeCompiledKernel, GpuError> {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeContext::Metal(ctx) => {
                use crate::metal::compile;
                let library = match source {
                    KernelSource::Library(path) => {
                        log::info!("loading kernel library {}", path.display());
                        compile::load_library(ctx, path)?
                    }
                    KernelSource::Embedded => {
                        log::info!("compiling embedded MSL kernel");
                        compile::compile_library(ctx, &crate::codegen::msl::emit_add3())?
                    }
                };
                compile::build_pipeline(ctx, &library, fn_name).map(NativeCompiledKernel::Metal)
            }
            #[cfg(feature = "webgpu-backend")]
            NativeContext::Wgpu(ctx) => {
                use crate::wgpu_backend::compile;
                match source {
                    KernelSource::Library(path) => Err(GpuError::ModuleLoad(format!(
                        "{}: precompiled libraries need the Metal backend",
                        path.display()
                    ))),
                    KernelSource::Embedded => {
                        log::info!("compiling embedded WGSL kernel");
                        compile::compile_wgsl(
                            ctx,
                            &crate::codegen::wgsl::emit_add3(),
                            fn_name,
                            crate::codegen::wgsl::WORKGROUP_SIZE,
                        )
                        .map(NativeCompiledKernel::Wgpu)
                    }
                }
            }
            NativeContext::Host => {
                debug!("host backend uses its built-in kernel");
                host::load_kernel(fn_name).map(NativeCompiledKernel::Host)
            }
        }
    }

    /// Create a device-visible buffer holding a copy of `data`.
    pub fn buffer_from_slice(&self, data: &[f32]) -> Result<NativeBuffer, GpuError> {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeContext::Metal(ctx) => MetalBuffer::from_slice(ctx, data).map(NativeBuffer::Metal),
            #[cfg(feature = "webgpu-backend")]
            NativeContext::Wgpu(ctx) => WgpuBuffer::from_slice(ctx, data).map(NativeBuffer::Wgpu),
            NativeContext::Host => Ok(NativeBuffer::Host(HostBuffer::from_slice(data))),
        }
    }

    /// Allocate a zero-filled device-visible buffer of `numel` floats.
    pub fn zeroed_buffer(&self, numel: usize) -> Result<NativeBuffer, GpuError> {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeContext::Metal(ctx) => MetalBuffer::zeroed(ctx, numel).map(NativeBuffer::Metal),
            #[cfg(feature = "webgpu-backend")]
            NativeContext::Wgpu(ctx) => WgpuBuffer::zeroed(ctx, numel).map(NativeBuffer::Wgpu),
            NativeContext::Host => Ok(NativeBuffer::Host(HostBuffer::zeroed(numel))),
        }
    }

    /// Encode one dispatch over `numel` work-items, submit it and wait.
    pub fn dispatch(
        &self,
        kernel: &NativeCompiledKernel,
        buffers: &[&NativeBuffer],
        numel: usize,
    ) -> Result<(), GpuError> {
        match (self, kernel) {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            (NativeContext::Metal(ctx), NativeCompiledKernel::Metal(kernel)) => {
                let bufs = buffers
                    .iter()
                    .map(|b| match b {
                        NativeBuffer::Metal(buf) => Ok(buf),
                        #[allow(unreachable_patterns)]
                        _ => Err(backend_mismatch()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                crate::metal::dispatch::dispatch(ctx, kernel, &bufs, numel)
            }
            #[cfg(feature = "webgpu-backend")]
            (NativeContext::Wgpu(ctx), NativeCompiledKernel::Wgpu(kernel)) => {
                let bufs = buffers
                    .iter()
                    .map(|b| match b {
                        NativeBuffer::Wgpu(buf) => Ok(buf),
                        #[allow(unreachable_patterns)]
                        _ => Err(backend_mismatch()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                crate::wgpu_backend::dispatch::dispatch(ctx, kernel, &bufs, numel)
            }
            (NativeContext::Host, NativeCompiledKernel::Host(kernel)) => {
                let bufs = buffers
                    .iter()
                    .map(|b| match b {
                        NativeBuffer::Host(buf) => Ok(buf),
                        #[allow(unreachable_patterns)]
                        _ => Err(backend_mismatch()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                host::dispatch(kernel, &bufs, numel)
            }
            #[allow(unreachable_patterns)]
            _ => Err(backend_mismatch()),
        }
    }

    /// Map `buffer` into host memory and run `f` over its floats.
    pub fn with_mapped<R>(
        &self,
        buffer: &NativeBuffer,
        f: impl FnOnce(&[f32]) -> R,
    ) -> Result<R, GpuError> {
        match (self, buffer) {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            (NativeContext::Metal(_), NativeBuffer::Metal(buf)) => Ok(f(buf.as_slice())),
            #[cfg(feature = "webgpu-backend")]
            (NativeContext::Wgpu(ctx), NativeBuffer::Wgpu(buf)) => {
                let data = buf.read_to_vec(ctx)?;
                Ok(f(&data))
            }
            (NativeContext::Host, NativeBuffer::Host(buf)) => Ok(buf.with_slice(f)),
            #[allow(unreachable_patterns)]
            _ => Err(GpuError::Readback(
                "buffer belongs to a different backend".to_string(),
            )),
        }
    }
}

fn backend_mismatch() -> GpuError {
    GpuError::Submission("kernel and buffers belong to different backends".to_string())
}

// ---------------------------------------------------------------------------
// NativeBuffer
// ---------------------------------------------------------------------------

pub enum NativeBuffer {
    #[cfg(all(feature = "metal-backend", target_os = "macos"))]
    Metal(MetalBuffer),
    #[cfg(feature = "webgpu-backend")]
    Wgpu(WgpuBuffer),
    Host(HostBuffer),
}

impl NativeBuffer {
    /// Number of floats the buffer holds.
    pub fn numel(&self) -> usize {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeBuffer::Metal(buf) => buf.numel(),
            #[cfg(feature = "webgpu-backend")]
            NativeBuffer::Wgpu(buf) => buf.numel(),
            NativeBuffer::Host(buf) => buf.numel(),
        }
    }
}

// ---------------------------------------------------------------------------
// NativeCompiledKernel
// ---------------------------------------------------------------------------

pub enum NativeCompiledKernel {
    #[cfg(all(feature = "metal-backend", target_os = "macos"))]
    Metal(CompiledKernel),
    #[cfg(feature = "webgpu-backend")]
    Wgpu(WgpuCompiledKernel),
    Host(HostKernel),
}

impl NativeCompiledKernel {
    /// Upper bound on work-items per group reported for this pipeline.
    pub fn max_threads_per_group(&self) -> usize {
        match self {
            #[cfg(all(feature = "metal-backend", target_os = "macos"))]
            NativeCompiledKernel::Metal(k) => k.max_threads_per_group,
            #[cfg(feature = "webgpu-backend")]
            NativeCompiledKernel::Wgpu(k) => k.workgroup_size as usize,
            NativeCompiledKernel::Host(k) => k.max_threads_per_group,
        }
    }
}
