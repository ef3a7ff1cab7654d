//! Metal buffer operations — shared-storage allocation and host mapping

use std::ptr::NonNull;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{MTLBuffer, MTLDevice, MTLResourceOptions};

use super::device_init::MetalContext;
use crate::error::GpuError;

/// Metal-specific GPU buffer wrapping an MTLBuffer in shared storage.
pub struct MetalBuffer {
    pub(crate) mtl_buffer: Retained<ProtocolObject<dyn MTLBuffer>>,
    pub(crate) numel: usize,
}

impl MetalBuffer {
    /// Create a Metal buffer by copying `data` into shared memory.
    pub fn from_slice(ctx: &MetalContext, data: &[f32]) -> Result<Self, GpuError> {
        let byte_size = std::mem::size_of_val(data);
        if byte_size == 0 {
            return Err(GpuError::BufferAllocation("empty input".to_string()));
        }

        let ptr = NonNull::new(data.as_ptr() as *mut std::ffi::c_void)
            .ok_or_else(|| GpuError::BufferAllocation("null input".to_string()))?;
        let mtl_buffer = unsafe {
            ctx.device.newBufferWithBytes_length_options(
                ptr,
                byte_size,
                MTLResourceOptions::StorageModeShared,
            )
        }
        .ok_or_else(|| {
            GpuError::BufferAllocation(format!("device refused {} bytes", byte_size))
        })?;

        Ok(MetalBuffer {
            mtl_buffer,
            numel: data.len(),
        })
    }

    /// Allocate a zero-filled Metal buffer of `numel` floats.
    pub fn zeroed(ctx: &MetalContext, numel: usize) -> Result<Self, GpuError> {
        let byte_size = numel * std::mem::size_of::<f32>();
        if byte_size == 0 {
            return Err(GpuError::BufferAllocation("empty result".to_string()));
        }

        let mtl_buffer = ctx
            .device
            .newBufferWithLength_options(byte_size, MTLResourceOptions::StorageModeShared)
            .ok_or_else(|| {
                GpuError::BufferAllocation(format!("device refused {} bytes", byte_size))
            })?;

        // Shared-storage allocations are not guaranteed to be cleared.
        unsafe {
            std::ptr::write_bytes(mtl_buffer.contents().as_ptr() as *mut u8, 0, byte_size);
        }

        Ok(MetalBuffer { mtl_buffer, numel })
    }

    /// View the buffer contents as host floats.
    ///
    /// Only valid while no command writing this buffer is in flight; the
    /// synchronous dispatch path guarantees that once it returns.
    pub fn as_slice(&self) -> &[f32] {
        let ptr = self.mtl_buffer.contents().as_ptr() as *const f32;
        unsafe { std::slice::from_raw_parts(ptr, self.numel) }
    }

    pub fn numel(&self) -> usize {
        self.numel
    }
}
