//! Host reference backend.
//!
//! Runs the `add` kernel semantics on the CPU, one rayon task per
//! threadgroup, so the dispatch geometry is exercised exactly as on a GPU.
//! Used for `--backend host`, for `--verify`, and by tests on machines
//! without a compute device.

use std::cell::RefCell;

use rayon::prelude::*;

use crate::codegen::{BINDING_COUNT, INPUT_COUNT, KERNEL_FN_NAME, RESULT_SLOT};
use crate::error::GpuError;
use crate::geometry::DispatchGeometry;

/// Work-items per group on the host; mirrors a common GPU pipeline limit.
pub const HOST_MAX_THREADS_PER_GROUP: usize = 1024;

/// Host "device" memory: a plain float vector behind a `RefCell` so the
/// dispatch can write the result through a shared binding list.
pub struct HostBuffer {
    data: RefCell<Vec<f32>>,
}

impl HostBuffer {
    pub fn from_slice(data: &[f32]) -> Self {
        HostBuffer {
            data: RefCell::new(data.to_vec()),
        }
    }

    pub fn zeroed(numel: usize) -> Self {
        HostBuffer {
            data: RefCell::new(vec![0.0; numel]),
        }
    }

    pub fn numel(&self) -> usize {
        self.data.borrow().len()
    }

    /// Run `f` over the buffer contents.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        f(&self.data.borrow())
    }
}

/// The host has a single built-in kernel.
pub struct HostKernel {
    pub max_threads_per_group: usize,
}

/// Resolve `fn_name` against the built-in kernel.
pub fn load_kernel(fn_name: &str) -> Result<HostKernel, GpuError> {
    if fn_name != KERNEL_FN_NAME {
        return Err(GpuError::SymbolLookup(fn_name.to_string()));
    }
    Ok(HostKernel {
        max_threads_per_group: HOST_MAX_THREADS_PER_GROUP,
    })
}

/// Reference sum `a[i] + b[i] + c[i]` over plain slices.
pub fn add3(a: &[f32], b: &[f32], c: &[f32]) -> Vec<f32> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((x, y), z)| x + y + z)
        .collect()
}

/// Execute the kernel over `buffers` = [a, b, c, result].
pub fn dispatch(kernel: &HostKernel, buffers: &[&HostBuffer], numel: usize) -> Result<(), GpuError> {
    if buffers.len() != BINDING_COUNT {
        return Err(GpuError::Submission(format!(
            "expected {} buffer bindings, got {}",
            BINDING_COUNT,
            buffers.len()
        )));
    }
    let Some(geometry) = DispatchGeometry::for_elements(numel, kernel.max_threads_per_group)
    else {
        return Ok(());
    };

    let result = buffers[RESULT_SLOT];
    if buffers[..INPUT_COUNT]
        .iter()
        .any(|input| std::ptr::eq(*input, result))
    {
        return Err(GpuError::Submission(
            "result buffer aliases an input".to_string(),
        ));
    }
    if buffers.iter().any(|buf| buf.numel() < numel) {
        return Err(GpuError::Submission(format!(
            "a bound buffer holds fewer than {} elements",
            numel
        )));
    }

    let a_ref = buffers[0].data.borrow();
    let b_ref = buffers[1].data.borrow();
    let c_ref = buffers[2].data.borrow();
    let a: &[f32] = &a_ref;
    let b: &[f32] = &b_ref;
    let c: &[f32] = &c_ref;
    let mut out = result.data.borrow_mut();

    out[..numel]
        .par_chunks_mut(geometry.threads_per_group)
        .enumerate()
        .for_each(|(group, chunk)| {
            for (slot, i) in chunk.iter_mut().zip(geometry.group_range(group)) {
                *slot = a[i] + b[i] + c[i];
            }
        });

    Ok(())
}
