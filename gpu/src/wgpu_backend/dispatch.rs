//! WebGPU compute kernel dispatch — encodes and submits GPU work.

use log::debug;
use wgpu;

use super::buffer_ops::WgpuBuffer;
use super::compile::WgpuCompiledKernel;
use super::device_init::WgpuContext;
use crate::error::GpuError;
use crate::geometry::DispatchGeometry;

/// Dispatch a compiled compute kernel over `numel` elements.
///
/// Workgroup count is `ceil(numel / workgroup_size)`; the shader discards
/// invocations past the end of the arrays. Blocks until the queue drains.
pub fn dispatch(
    ctx: &WgpuContext,
    kernel: &WgpuCompiledKernel,
    buffers: &[&WgpuBuffer],
    numel: usize,
) -> Result<(), GpuError> {
    let Some(geometry) = DispatchGeometry::for_elements(numel, kernel.workgroup_size as usize)
    else {
        return Ok(());
    };

    let max_groups = ctx.device.limits().max_compute_workgroups_per_dimension as usize;
    if geometry.group_count > max_groups {
        return Err(GpuError::Submission(format!(
            "{} workgroups exceed the device limit of {}",
            geometry.group_count, max_groups
        )));
    }

    let entries: Vec<wgpu::BindGroupEntry> = buffers
        .iter()
        .enumerate()
        .map(|(i, buf)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: buf.buffer.as_entire_binding(),
        })
        .collect();

    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("vecadd_dispatch_bg"),
        layout: &kernel.bind_group_layout,
        entries: &entries,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vecadd_dispatch"),
        });

    debug!(
        "dispatching {} workgroups of {}",
        geometry.group_count, kernel.workgroup_size
    );

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("vecadd_compute_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&kernel.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(geometry.group_count as u32, 1, 1);
    }

    ctx.queue.submit(std::iter::once(encoder.finish()));
    ctx.device.poll(wgpu::Maintain::Wait);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::wgsl;
    use crate::wgpu_backend::compile;

    #[test]
    fn test_dispatch_add3_wgpu() {
        if !WgpuContext::is_available() {
            println!("wgpu not available, skipping");
            return;
        }

        let ctx = WgpuContext::new().unwrap();
        let kernel =
            compile::compile_wgsl(&ctx, &wgsl::emit_add3(), "add", wgsl::WORKGROUP_SIZE).unwrap();

        let n = 1000;
        let a: Vec<f32> = (0..n).map(|i| (i % 10) as f32).collect();
        let b: Vec<f32> = vec![1.0; n];
        let c: Vec<f32> = vec![2.0; n];

        let a_buf = WgpuBuffer::from_slice(&ctx, &a).unwrap();
        let b_buf = WgpuBuffer::from_slice(&ctx, &b).unwrap();
        let c_buf = WgpuBuffer::from_slice(&ctx, &c).unwrap();
        let result_buf = WgpuBuffer::zeroed(&ctx, n).unwrap();

        dispatch(&ctx, &kernel, &[&a_buf, &b_buf, &c_buf, &result_buf], n).unwrap();

        let result = result_buf.read_to_vec(&ctx).unwrap();
        for i in 0..n {
            assert_eq!(result[i], a[i] + 3.0, "mismatch at {}", i);
        }
    }

    #[test]
    fn test_unknown_entry_point() {
        if !WgpuContext::is_available() {
            println!("wgpu not available, skipping");
            return;
        }

        let ctx = WgpuContext::new().unwrap();
        let err = compile::compile_wgsl(&ctx, &wgsl::emit_add3(), "sub", wgsl::WORKGROUP_SIZE)
            .err();
        assert_eq!(err, Some(GpuError::SymbolLookup("sub".to_string())));
    }
}
