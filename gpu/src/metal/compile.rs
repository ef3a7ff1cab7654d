//! Metal kernel loading — metallib file or MSL source → MTLComputePipelineState

use std::path::Path;

use log::debug;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::{NSString, NSURL};
use objc2_metal::{MTLComputePipelineState, MTLDevice, MTLLibrary};

use super::device_init::MetalContext;
use crate::error::GpuError;

/// A compiled Metal compute kernel ready for dispatch.
pub struct CompiledKernel {
    pub pipeline: Retained<ProtocolObject<dyn MTLComputePipelineState>>,
    /// Maximum threads per threadgroup for this pipeline.
    pub max_threads_per_group: usize,
}

/// Load a precompiled `.metallib` from disk.
pub fn load_library(
    ctx: &MetalContext,
    path: &Path,
) -> Result<Retained<ProtocolObject<dyn MTLLibrary>>, GpuError> {
    if !path.is_file() {
        return Err(GpuError::ModuleLoad(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let path_ns = NSString::from_str(&path.to_string_lossy());
    let url = NSURL::fileURLWithPath(&path_ns);
    ctx.device
        .newLibraryWithURL_error(&url)
        .map_err(|e| GpuError::ModuleLoad(format!("{}: {}", path.display(), e)))
}

/// Compile MSL source into a library at runtime.
pub fn compile_library(
    ctx: &MetalContext,
    source: &str,
) -> Result<Retained<ProtocolObject<dyn MTLLibrary>>, GpuError> {
    let source_ns = NSString::from_str(source);
    ctx.device
        .newLibraryWithSource_options_error(&source_ns, None)
        .map_err(|e| GpuError::ModuleLoad(format!("MSL compilation failed: {}", e)))
}

/// Look up `fn_name` in `library` and build its compute pipeline state.
pub fn build_pipeline(
    ctx: &MetalContext,
    library: &ProtocolObject<dyn MTLLibrary>,
    fn_name: &str,
) -> Result<CompiledKernel, GpuError> {
    let fn_name_ns = NSString::from_str(fn_name);
    let function = library
        .newFunctionWithName(&fn_name_ns)
        .ok_or_else(|| GpuError::SymbolLookup(fn_name.to_string()))?;

    let pipeline: Retained<ProtocolObject<dyn MTLComputePipelineState>> = ctx
        .device
        .newComputePipelineStateWithFunction_error(&function)
        .map_err(|e| GpuError::PipelineBuild(e.to_string()))?;

    let max_threads_per_group = pipeline.maxTotalThreadsPerThreadgroup();
    debug!(
        "pipeline '{}': max {} threads per threadgroup",
        fn_name, max_threads_per_group
    );

    Ok(CompiledKernel {
        pipeline,
        max_threads_per_group,
    })
}

/// Compile MSL source and build the pipeline for `fn_name` in one step.
pub fn compile_msl(
    ctx: &MetalContext,
    source: &str,
    fn_name: &str,
) -> Result<CompiledKernel, GpuError> {
    let library = compile_library(ctx, source)?;
    build_pipeline(ctx, &library, fn_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::msl;

    #[test]
    fn test_compile_add3_kernel() {
        if !MetalContext::is_available() {
            println!("Metal not available, skipping");
            return;
        }

        let ctx = MetalContext::new().unwrap();
        let kernel = compile_msl(&ctx, &msl::emit_add3(), "add");
        assert!(kernel.is_ok(), "compilation failed: {:?}", kernel.err());
        let kernel = kernel.unwrap();
        assert!(kernel.max_threads_per_group > 0);
        println!("max_threads_per_group: {}", kernel.max_threads_per_group);
    }

    #[test]
    fn test_missing_symbol() {
        if !MetalContext::is_available() {
            println!("Metal not available, skipping");
            return;
        }

        let ctx = MetalContext::new().unwrap();
        let err = compile_msl(&ctx, &msl::emit_add3(), "sub").err();
        assert_eq!(err, Some(GpuError::SymbolLookup("sub".to_string())));
    }

    #[test]
    fn test_missing_library_file() {
        if !MetalContext::is_available() {
            println!("Metal not available, skipping");
            return;
        }

        let ctx = MetalContext::new().unwrap();
        let err = load_library(&ctx, Path::new("no/such/compute.metallib")).err();
        assert!(matches!(err, Some(GpuError::ModuleLoad(_))));
    }
}
