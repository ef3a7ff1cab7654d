//! Run configuration.
//!
//! `RunConfig::default()` reproduces the classic demo: 10000 elements, the
//! precompiled `add` kernel from `../metal/compute.metallib`, three preview
//! lines, whichever GPU backend comes up first.

use std::path::PathBuf;

/// Default element count per array.
pub const DEFAULT_COUNT: usize = 10_000;

/// Default location of the precompiled kernel library.
pub const DEFAULT_LIBRARY_PATH: &str = "../metal/compute.metallib";

/// Default number of result lines printed.
pub const DEFAULT_PREVIEW: usize = 3;

/// Where the kernel comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelSource {
    /// Precompiled library on disk (Metal only).
    Library(PathBuf),
    /// Source generated by `codegen` and compiled at runtime.
    Embedded,
}

/// Which compute backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Metal, then WebGPU.
    #[default]
    Auto,
    Metal,
    Wgpu,
    /// CPU reference; never picked by `Auto`.
    Host,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Metal => "metal",
            BackendKind::Wgpu => "wgpu",
            BackendKind::Host => "host",
        }
    }
}

/// Settings for one vector-addition run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Elements per array.
    pub count: usize,
    pub kernel_source: KernelSource,
    pub kernel_name: String,
    /// Number of result lines to print.
    pub preview: usize,
    pub backend: BackendKind,
    /// Compare every result against the host reference.
    pub verify: bool,
    /// Fixed RNG seed; `None` seeds a `StdRng` from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            kernel_source: KernelSource::Library(PathBuf::from(DEFAULT_LIBRARY_PATH)),
            kernel_name: crate::codegen::KERNEL_FN_NAME.to_string(),
            preview: DEFAULT_PREVIEW,
            backend: BackendKind::Auto,
            verify: false,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let config = RunConfig::default();
        assert_eq!(config.count, 10_000);
        assert_eq!(
            config.kernel_source,
            KernelSource::Library(PathBuf::from("../metal/compute.metallib"))
        );
        assert_eq!(config.kernel_name, "add");
        assert_eq!(config.preview, 3);
        assert_eq!(config.backend, BackendKind::Auto);
        assert!(!config.verify);
        assert!(config.seed.is_none());
    }
}
