//! WebGPU buffer operations — storage allocation and staged readback

use wgpu;
use wgpu::util::DeviceExt;

use super::device_init::WgpuContext;
use crate::error::GpuError;

const STORAGE_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::STORAGE
    .union(wgpu::BufferUsages::COPY_SRC)
    .union(wgpu::BufferUsages::COPY_DST);

/// Byte size of a storage buffer holding `numel` floats, checked against the
/// device's buffer and storage-binding limits.
pub(crate) fn storage_byte_size(limits: &wgpu::Limits, numel: usize) -> Result<u64, GpuError> {
    let byte_size = numel
        .checked_mul(std::mem::size_of::<f32>())
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| GpuError::BufferAllocation(format!("{} elements overflow a buffer size", numel)))?;
    let max = limits
        .max_buffer_size
        .min(u64::from(limits.max_storage_buffer_binding_size));
    if byte_size > max {
        return Err(GpuError::BufferAllocation(format!(
            "{} elements need {} bytes, device allows {}",
            numel, byte_size, max
        )));
    }
    Ok(byte_size)
}

/// Run `create` inside validation and out-of-memory error scopes.
fn create_scoped(
    ctx: &WgpuContext,
    create: impl FnOnce() -> wgpu::Buffer,
) -> Result<wgpu::Buffer, GpuError> {
    ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let buffer = create();
    let validation = pollster::block_on(ctx.device.pop_error_scope());
    let out_of_memory = pollster::block_on(ctx.device.pop_error_scope());
    match validation.or(out_of_memory) {
        Some(e) => Err(GpuError::BufferAllocation(e.to_string())),
        None => Ok(buffer),
    }
}

/// WebGPU-specific GPU buffer wrapping a wgpu::Buffer of f32 values.
pub struct WgpuBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) numel: usize,
}

impl WgpuBuffer {
    /// Create a storage buffer initialised from `data`.
    pub fn from_slice(ctx: &WgpuContext, data: &[f32]) -> Result<Self, GpuError> {
        if data.is_empty() {
            return Err(GpuError::BufferAllocation("empty input".to_string()));
        }

        storage_byte_size(&ctx.device.limits(), data.len())?;

        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let buffer = create_scoped(ctx, || {
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vecadd_input"),
                    contents: &bytes,
                    usage: STORAGE_USAGE,
                })
        })?;

        Ok(WgpuBuffer {
            buffer,
            numel: data.len(),
        })
    }

    /// Allocate a zero-filled storage buffer of `numel` floats.
    pub fn zeroed(ctx: &WgpuContext, numel: usize) -> Result<Self, GpuError> {
        if numel == 0 {
            return Err(GpuError::BufferAllocation("empty result".to_string()));
        }

        let size = storage_byte_size(&ctx.device.limits(), numel)?;

        // wgpu zero-initialises buffers created without mapped contents.
        let buffer = create_scoped(ctx, || {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vecadd_result"),
                size,
                usage: STORAGE_USAGE,
                mapped_at_creation: false,
            })
        })?;

        Ok(WgpuBuffer { buffer, numel })
    }

    /// Copy the buffer back to host memory via a staging buffer.
    pub fn read_to_vec(&self, ctx: &WgpuContext) -> Result<Vec<f32>, GpuError> {
        let byte_size = (self.numel * std::mem::size_of::<f32>()) as u64;

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vecadd_staging"),
            size: byte_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vecadd_readback"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, byte_size);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {
                let data = slice
                    .get_mapped_range()
                    .chunks_exact(std::mem::size_of::<f32>())
                    .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                staging.unmap();
                Ok(data)
            }
            Ok(Err(e)) => Err(GpuError::Readback(e.to_string())),
            Err(e) => Err(GpuError::Readback(e.to_string())),
        }
    }

    pub fn numel(&self) -> usize {
        self.numel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_size_within_limits() {
        let limits = wgpu::Limits::default();
        assert_eq!(storage_byte_size(&limits, 10_000), Ok(40_000));
    }

    #[test]
    fn test_oversized_count_is_allocation_error() {
        let limits = wgpu::Limits::default();
        let numel = limits.max_storage_buffer_binding_size as usize / 4 + 1;
        let err = storage_byte_size(&limits, numel).err();
        assert!(matches!(err, Some(GpuError::BufferAllocation(_))));
        assert_eq!(err.map(|e| e.exit_code()), Some(6));

        let err = storage_byte_size(&limits, usize::MAX).err();
        assert!(matches!(err, Some(GpuError::BufferAllocation(_))));
    }

    #[test]
    fn test_oversized_result_buffer_rejected() {
        if !WgpuContext::is_available() {
            println!("wgpu not available, skipping");
            return;
        }
        let ctx = WgpuContext::new().unwrap();
        let numel = ctx.device.limits().max_storage_buffer_binding_size as usize / 4 + 1;
        let err = WgpuBuffer::zeroed(&ctx, numel).err();
        assert!(matches!(err, Some(GpuError::BufferAllocation(_))));
    }
}
