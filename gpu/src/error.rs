//! Error taxonomy for a compute run.
//!
//! Every setup step returns `Result<_, GpuError>`; the binary is the single
//! handler that logs the error and exits with [`GpuError::exit_code`].

/// Errors that can end a vector-addition run
#[derive(Debug, Clone, PartialEq)]
pub enum GpuError {
    /// No compute-capable device for the requested backend
    DeviceUnavailable(String),

    /// Kernel module missing, unreadable, malformed, or failed to compile
    ModuleLoad(String),

    /// Named kernel function absent from the module
    SymbolLookup(String),

    /// Pipeline state could not be built from the kernel function
    PipelineBuild(String),

    /// Device refused to allocate a shared buffer
    BufferAllocation(String),

    /// Command buffer or encoder could not be created or submitted
    Submission(String),

    /// Result memory could not be mapped back to the host
    Readback(String),

    /// Device result disagrees with the host reference
    VerificationMismatch {
        index: usize,
        expected: f32,
        actual: f32,
    },

    /// Report could not be written to the output stream
    Output(String),
}

impl GpuError {
    /// Process exit code for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            GpuError::DeviceUnavailable(_) => 2,
            GpuError::ModuleLoad(_) => 3,
            GpuError::SymbolLookup(_) => 4,
            GpuError::PipelineBuild(_) => 5,
            GpuError::BufferAllocation(_) => 6,
            GpuError::Submission(_) => 7,
            GpuError::Readback(_) => 8,
            GpuError::VerificationMismatch { .. } => 9,
            GpuError::Output(_) => 10,
        }
    }
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::DeviceUnavailable(e) => write!(f, "compute device unavailable: {}", e),
            GpuError::ModuleLoad(e) => write!(f, "kernel module load failed: {}", e),
            GpuError::SymbolLookup(name) => {
                write!(f, "kernel function '{}' not found in module", name)
            }
            GpuError::PipelineBuild(e) => write!(f, "pipeline creation failed: {}", e),
            GpuError::BufferAllocation(e) => write!(f, "buffer allocation failed: {}", e),
            GpuError::Submission(e) => write!(f, "command submission failed: {}", e),
            GpuError::Readback(e) => write!(f, "result readback failed: {}", e),
            GpuError::VerificationMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "verification mismatch at {}: expected {:?}, got {:?}",
                index, expected, actual
            ),
            GpuError::Output(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl std::error::Error for GpuError {}

impl From<std::io::Error> for GpuError {
    fn from(e: std::io::Error) -> Self {
        GpuError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            GpuError::DeviceUnavailable(String::new()),
            GpuError::ModuleLoad(String::new()),
            GpuError::SymbolLookup(String::new()),
            GpuError::PipelineBuild(String::new()),
            GpuError::BufferAllocation(String::new()),
            GpuError::Submission(String::new()),
            GpuError::Readback(String::new()),
            GpuError::VerificationMismatch {
                index: 0,
                expected: 0.0,
                actual: 1.0,
            },
            GpuError::Output(String::new()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(GpuError::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_names_symbol() {
        let err = GpuError::SymbolLookup("add".to_string());
        assert_eq!(err.to_string(), "kernel function 'add' not found in module");
    }

    #[test]
    fn test_display_mismatch() {
        let err = GpuError::VerificationMismatch {
            index: 7,
            expected: 6.0,
            actual: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "verification mismatch at 7: expected 6.0, got 5.0"
        );
    }
}
