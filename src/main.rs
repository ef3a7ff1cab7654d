//! vecadd - add three random arrays on a GPU compute device
//!
//! # Usage
//!
//! ```bash
//! # Classic run: 10000 elements, precompiled ../metal/compute.metallib
//! vecadd
//!
//! # Compile the kernel at runtime instead of loading a metallib
//! vecadd --embedded-source
//!
//! # Any wgpu adapter, checking every result against the CPU
//! vecadd --backend wgpu --embedded-source --verify
//! ```

mod logging;

use clap::{Parser, ValueEnum};
use log::{debug, error, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::process;

use vecadd_gpu::config::{DEFAULT_COUNT, DEFAULT_LIBRARY_PATH, DEFAULT_PREVIEW};
use vecadd_gpu::{BackendKind, GpuError, KernelSource, RunConfig, VectorAdditionRunner};

#[derive(Parser, Debug)]
#[command(name = "vecadd")]
#[command(version = "0.1.0")]
#[command(about = "Add three random arrays with one GPU kernel dispatch", long_about = None)]
struct Cli {
    /// Elements per array
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT)]
    count: usize,

    /// Precompiled kernel library
    #[arg(long, default_value = DEFAULT_LIBRARY_PATH)]
    library: PathBuf,

    /// Compile the built-in kernel source at runtime instead of loading --library
    #[arg(long)]
    embedded_source: bool,

    /// Kernel entry point
    #[arg(long, default_value = "add")]
    kernel_name: String,

    /// Number of result lines to print
    #[arg(long, default_value_t = DEFAULT_PREVIEW)]
    preview: usize,

    /// Compute backend
    #[arg(long, value_enum, default_value = "auto")]
    backend: BackendArg,

    /// Check every result against the host reference
    #[arg(long)]
    verify: bool,

    /// Seed for reproducible operands
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    /// Metal, then WebGPU
    Auto,
    Metal,
    Wgpu,
    /// CPU reference implementation
    Host,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendKind::Auto,
            BackendArg::Metal => BackendKind::Metal,
            BackendArg::Wgpu => BackendKind::Wgpu,
            BackendArg::Host => BackendKind::Host,
        }
    }
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let kernel_source = if self.embedded_source {
            KernelSource::Embedded
        } else {
            KernelSource::Library(self.library)
        };

        RunConfig {
            count: self.count,
            kernel_source,
            kernel_name: self.kernel_name,
            preview: self.preview,
            backend: self.backend.into(),
            verify: self.verify,
            seed: self.seed,
        }
    }
}

fn run(config: RunConfig) -> Result<(), GpuError> {
    let runner = VectorAdditionRunner::new(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = runner.run(&mut out)?;
    out.flush()?;
    debug!(
        "{} elements on {} ({})",
        report.count,
        report.device,
        report.backend.name()
    );
    Ok(())
}

/// Log the fatal failure, print it for the user and pick the exit code.
fn report_failure(e: &GpuError, err_out: &mut dyn Write) -> i32 {
    error!("{}", e);
    let _ = writeln!(err_out, "Error: {}", e);
    e.exit_code()
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_with_level(LevelFilter::Debug);
    } else {
        logging::init_from_env();
    }

    if let Err(e) = run(cli.into_config()) {
        let code = report_failure(&e, &mut std::io::stderr());
        process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_classic_demo() {
        let config = Cli::parse_from(["vecadd"]).into_config();
        let default = RunConfig::default();

        assert_eq!(config.count, default.count);
        assert_eq!(config.kernel_source, default.kernel_source);
        assert_eq!(config.kernel_name, default.kernel_name);
        assert_eq!(config.preview, default.preview);
        assert_eq!(config.backend, default.backend);
        assert_eq!(config.verify, default.verify);
        assert_eq!(config.seed, default.seed);
    }

    #[test]
    fn test_flags_map_to_config() {
        let config = Cli::parse_from([
            "vecadd",
            "-n",
            "64",
            "--embedded-source",
            "--backend",
            "host",
            "--verify",
            "--seed",
            "9",
            "--preview",
            "5",
        ])
        .into_config();

        assert_eq!(config.count, 64);
        assert_eq!(config.kernel_source, KernelSource::Embedded);
        assert_eq!(config.backend, BackendKind::Host);
        assert!(config.verify);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.preview, 5);
    }

    #[test]
    fn test_host_run_succeeds() {
        logging::init_test();
        let config = Cli::parse_from(["vecadd", "--backend", "host", "--embedded-source", "-n", "16"])
            .into_config();
        assert!(run(config).is_ok());
    }

    #[test]
    fn test_unknown_embedded_kernel_exits_with_symbol_code() {
        logging::init_test();
        let config = Cli::parse_from([
            "vecadd",
            "--backend",
            "host",
            "--embedded-source",
            "--kernel-name",
            "mul",
        ])
        .into_config();
        let err = run(config).unwrap_err();

        let mut stderr = Vec::new();
        assert_eq!(report_failure(&err, &mut stderr), 4);
        assert_eq!(
            String::from_utf8(stderr).unwrap(),
            format!("Error: {}\n", GpuError::SymbolLookup("mul".to_string()))
        );
    }
}
