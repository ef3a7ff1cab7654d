//! WGSL shader compilation — WGSL source → wgpu::ComputePipeline

use wgpu;

use super::device_init::WgpuContext;
use crate::error::GpuError;

/// A compiled wgpu compute kernel ready for dispatch.
pub struct WgpuCompiledKernel {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub workgroup_size: u32,
}

/// Compile WGSL source code into a compute pipeline for `entry_point`.
///
/// The bind group layout is derived from shader reflection. Validation
/// errors are captured through an error scope instead of the device's
/// uncaptured-error handler.
pub fn compile_wgsl(
    ctx: &WgpuContext,
    source: &str,
    entry_point: &str,
    workgroup_size: u32,
) -> Result<WgpuCompiledKernel, GpuError> {
    if !source.contains(&format!("fn {}(", entry_point)) {
        return Err(GpuError::SymbolLookup(entry_point.to_string()));
    }

    ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader_module = ctx
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vecadd_compute_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
    if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
        return Err(GpuError::ModuleLoad(e.to_string()));
    }

    ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = ctx
        .device
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("vecadd_compute_pipeline"),
            layout: None,
            module: &shader_module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        });
    if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
        return Err(GpuError::PipelineBuild(e.to_string()));
    }

    let bind_group_layout = pipeline.get_bind_group_layout(0);

    Ok(WgpuCompiledKernel {
        pipeline,
        bind_group_layout,
        workgroup_size,
    })
}
