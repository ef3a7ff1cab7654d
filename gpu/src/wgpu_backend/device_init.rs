//! WebGPU device initialization via wgpu

use log::debug;
use wgpu;

use crate::error::GpuError;

/// WebGPU-specific GPU context wrapping device + queue.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

fn request_adapter(instance: &wgpu::Instance) -> Option<wgpu::Adapter> {
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
}

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

impl WgpuContext {
    /// Create a new wgpu context using the best available adapter.
    pub fn new() -> Result<Self, GpuError> {
        let instance = new_instance();
        let adapter = request_adapter(&instance)
            .ok_or_else(|| GpuError::DeviceUnavailable("no wgpu adapter".to_string()))?;
        let adapter_name = adapter.get_info().name;
        debug!("wgpu adapter: {}", adapter_name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("vecadd_gpu"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| GpuError::DeviceUnavailable(e.to_string()))?;

        Ok(WgpuContext {
            device,
            queue,
            adapter_name,
        })
    }

    /// Check if wgpu is available on this system.
    pub fn is_available() -> bool {
        request_adapter(&new_instance()).is_some()
    }
}
