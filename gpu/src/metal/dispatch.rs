//! Metal compute kernel dispatch — encodes and submits GPU work.

use log::debug;
use objc2_metal::MTLCommandBuffer;
use objc2_metal::MTLCommandBufferStatus;
use objc2_metal::MTLCommandEncoder;
use objc2_metal::MTLCommandQueue;
use objc2_metal::MTLComputeCommandEncoder;
use objc2_metal::MTLSize;

use super::buffer_ops::MetalBuffer;
use super::compile::CompiledKernel;
use super::device_init::MetalContext;
use crate::error::GpuError;
use crate::geometry::DispatchGeometry;

/// Dispatch a compiled kernel over `buffers`, bound at slots `0..buffers.len()`.
///
/// Blocks until the command buffer completes. The borrowed buffers outlive
/// the submission, so nothing the GPU touches is released early.
pub fn dispatch(
    ctx: &MetalContext,
    kernel: &CompiledKernel,
    buffers: &[&MetalBuffer],
    numel: usize,
) -> Result<(), GpuError> {
    let Some(geometry) = DispatchGeometry::for_elements(numel, kernel.max_threads_per_group)
    else {
        return Ok(());
    };

    // Create command buffer
    let command_buffer = ctx
        .command_queue
        .commandBuffer()
        .ok_or_else(|| GpuError::Submission("failed to create command buffer".to_string()))?;

    // Create compute command encoder
    let encoder = command_buffer
        .computeCommandEncoder()
        .ok_or_else(|| GpuError::Submission("failed to create compute encoder".to_string()))?;

    encoder.setComputePipelineState(&kernel.pipeline);

    for (i, buf) in buffers.iter().enumerate() {
        unsafe {
            encoder.setBuffer_offset_atIndex(Some(&buf.mtl_buffer), 0, i);
        }
    }

    let grid_size = MTLSize {
        width: geometry.grid_width,
        height: 1,
        depth: 1,
    };
    let threadgroup_size = MTLSize {
        width: geometry.threads_per_group,
        height: 1,
        depth: 1,
    };
    debug!(
        "dispatching {} threads in {} groups of {}",
        geometry.grid_width, geometry.group_count, geometry.threads_per_group
    );

    encoder.dispatchThreads_threadsPerThreadgroup(grid_size, threadgroup_size);

    // End encoding and commit
    encoder.endEncoding();
    command_buffer.commit();
    command_buffer.waitUntilCompleted();

    completion_result(
        command_buffer.status(),
        command_buffer.error().map(|e| e.to_string()),
    )
}

/// Map the final command-buffer state to a submission outcome.
fn completion_result(
    status: MTLCommandBufferStatus,
    error: Option<String>,
) -> Result<(), GpuError> {
    if status == MTLCommandBufferStatus::Error {
        return Err(GpuError::Submission(error.unwrap_or_else(|| {
            "command buffer finished with an error".to_string()
        })));
    }
    Ok(())
}
