//! Metal device initialization

use log::debug;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{MTLCommandQueue, MTLCreateSystemDefaultDevice, MTLDevice};

use crate::error::GpuError;

// MTLCreateSystemDefaultDevice requires CoreGraphics to be linked
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {}

/// Metal-specific GPU context wrapping device + command queue.
pub struct MetalContext {
    pub device: Retained<ProtocolObject<dyn MTLDevice>>,
    pub command_queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
}

impl MetalContext {
    /// Create a new Metal context using the system default device.
    pub fn new() -> Result<Self, GpuError> {
        let device = MTLCreateSystemDefaultDevice().ok_or_else(|| {
            GpuError::DeviceUnavailable("no default Metal device".to_string())
        })?;
        debug!("Metal device: {}", device.name());

        let command_queue = device
            .newCommandQueue()
            .ok_or_else(|| GpuError::Submission("failed to create command queue".to_string()))?;

        Ok(MetalContext {
            device,
            command_queue,
        })
    }

    /// Check if Metal is available on this system.
    pub fn is_available() -> bool {
        MTLCreateSystemDefaultDevice().is_some()
    }

    /// Human-readable device name.
    pub fn device_name(&self) -> String {
        self.device.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metal_device_creation() {
        let available = MetalContext::is_available();
        println!("Metal available: {}", available);
        if available {
            let ctx = MetalContext::new().expect("Failed to create Metal context");
            println!("Metal device: {}", ctx.device_name());
            assert!(!ctx.device_name().is_empty());
        }
    }
}
