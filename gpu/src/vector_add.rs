//! Vector addition runner — the whole demo as one linear pass.
//!
//! Generate three operand arrays, open a compute backend, load the `add`
//! kernel, bind `a`, `b`, `c` and a zeroed result at slots 0–3, dispatch one
//! work-item per element, wait, then walk the mapped result and print the
//! first few `a + b + c = r` lines.

use std::io::Write;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::NativeContext;
use crate::benchmark::Benchmark;
use crate::config::{BackendKind, RunConfig};
use crate::data;
use crate::error::GpuError;
use crate::host;

/// The three input arrays of one run, always of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Operands {
    a: Vec<f32>,
    b: Vec<f32>,
    c: Vec<f32>,
}

impl Operands {
    /// Returns `None` unless all three arrays have the same length.
    pub fn new(a: Vec<f32>, b: Vec<f32>, c: Vec<f32>) -> Option<Self> {
        if a.len() != b.len() || a.len() != c.len() {
            return None;
        }
        Some(Operands { a, b, c })
    }

    /// Three independent random arrays of `count` elements.
    pub fn random(count: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Operands {
            a: data::random_array(&mut rng, count),
            b: data::random_array(&mut rng, count),
            c: data::random_array(&mut rng, count),
        }
    }

    pub fn a(&self) -> &[f32] {
        &self.a
    }

    pub fn b(&self) -> &[f32] {
        &self.b
    }

    pub fn c(&self) -> &[f32] {
        &self.c
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub backend: BackendKind,
    pub device: String,
    pub count: usize,
    /// Preview rows as `(a, b, c, result)`.
    pub preview: Vec<(f32, f32, f32, f32)>,
    pub verified: bool,
}

/// Format one preview row, e.g. `1.0 + 0.0 + 5.0 = 6.0`.
pub fn format_row(a: f32, b: f32, c: f32, result: f32) -> String {
    format!("{:?} + {:?} + {:?} = {:?}", a, b, c, result)
}

/// Compare device output against the host reference sum.
pub fn verify(operands: &Operands, result: &[f32]) -> Result<(), GpuError> {
    let expected = host::add3(&operands.a, &operands.b, &operands.c);
    if result.len() != expected.len() {
        return Err(GpuError::Readback(format!(
            "expected {} results, mapped {}",
            expected.len(),
            result.len()
        )));
    }
    match expected
        .iter()
        .zip(result)
        .position(|(e, r)| e.to_bits() != r.to_bits())
    {
        Some(index) => Err(GpuError::VerificationMismatch {
            index,
            expected: expected[index],
            actual: result[index],
        }),
        None => Ok(()),
    }
}

pub struct VectorAdditionRunner {
    config: RunConfig,
}

impl VectorAdditionRunner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Full demo: generate random operands, then compute and print.
    pub fn run(&self, out: &mut dyn Write) -> Result<RunReport, GpuError> {
        writeln!(out, "Start loading data...")?;
        let mut load = Benchmark::new("load data");
        let operands = Operands::random(self.config.count, self.config.seed);
        load.stop();
        writeln!(out, "Finished loading data.")?;

        self.run_with_operands(&operands, out)
    }

    /// Compute `a + b + c` for the given operands and print the preview rows.
    pub fn run_with_operands(
        &self,
        operands: &Operands,
        out: &mut dyn Write,
    ) -> Result<RunReport, GpuError> {
        let mut total = Benchmark::new("compute");

        let ctx = NativeContext::new(self.config.backend)?;
        info!(
            "using {} backend on {}",
            ctx.kind().name(),
            ctx.device_name()
        );

        let kernel = ctx.load_kernel(&self.config.kernel_source, &self.config.kernel_name)?;
        info!(
            "kernel '{}' ready, max {} threads per group",
            self.config.kernel_name,
            kernel.max_threads_per_group()
        );
        total.lap();

        let n = operands.len();
        let mut report = RunReport {
            backend: ctx.kind(),
            device: ctx.device_name(),
            count: n,
            preview: Vec::new(),
            verified: false,
        };
        if n == 0 {
            info!("no elements, skipping dispatch");
            report.verified = self.config.verify;
            return Ok(report);
        }

        let a = ctx.buffer_from_slice(&operands.a)?;
        let b = ctx.buffer_from_slice(&operands.b)?;
        let c = ctx.buffer_from_slice(&operands.c)?;
        let result = ctx.zeroed_buffer(n)?;

        ctx.dispatch(&kernel, &[&a, &b, &c, &result], n)?;
        total.lap();

        let verify_all = self.config.verify;
        let preview = self.config.preview.min(n);
        let rows = ctx.with_mapped(&result, |values| -> Result<_, GpuError> {
            if verify_all {
                verify(operands, values)?;
            }
            let mut cursor = values.iter();
            let mut rows = Vec::with_capacity(preview);
            for i in 0..preview {
                let Some(&r) = cursor.next() else { break };
                rows.push((operands.a[i], operands.b[i], operands.c[i], r));
            }
            Ok(rows)
        })??;
        if verify_all {
            info!("all {} results match the host reference", n);
        }

        for &(a, b, c, r) in &rows {
            writeln!(out, "{}", format_row(a, b, c, r))?;
        }

        total.stop();
        report.preview = rows;
        report.verified = verify_all;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelSource;

    fn host_config() -> RunConfig {
        RunConfig {
            backend: BackendKind::Host,
            kernel_source: KernelSource::Embedded,
            ..RunConfig::default()
        }
    }

    fn output_lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_known_scenario_output() {
        let operands = Operands::new(
            vec![1.0, 2.0, 3.0],
            vec![0.0, 0.0, 0.0],
            vec![5.0, 5.0, 5.0],
        )
        .unwrap();
        let runner = VectorAdditionRunner::new(host_config());

        let mut out = Vec::new();
        let report = runner.run_with_operands(&operands, &mut out).unwrap();

        assert_eq!(
            output_lines(out),
            vec![
                "1.0 + 0.0 + 5.0 = 6.0",
                "2.0 + 0.0 + 5.0 = 7.0",
                "3.0 + 0.0 + 5.0 = 8.0",
            ]
        );
        assert_eq!(report.count, 3);
        assert_eq!(report.backend, BackendKind::Host);
        assert_eq!(
            report.preview.iter().map(|r| r.3).collect::<Vec<_>>(),
            vec![6.0, 7.0, 8.0]
        );
    }

    #[test]
    fn test_full_run_prints_progress_and_preview() {
        let config = RunConfig {
            seed: Some(7),
            verify: true,
            ..host_config()
        };
        let runner = VectorAdditionRunner::new(config);

        let mut out = Vec::new();
        let report = runner.run(&mut out).unwrap();
        let lines = output_lines(out);

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Start loading data...");
        assert_eq!(lines[1], "Finished loading data.");
        assert_eq!(report.count, 10_000);
        assert!(report.verified);
        for (line, &(a, b, c, r)) in lines[2..].iter().zip(&report.preview) {
            assert_eq!(r, a + b + c);
            assert_eq!(line, &format_row(a, b, c, r));
        }
    }

    #[test]
    fn test_empty_run() {
        let runner = VectorAdditionRunner::new(RunConfig {
            count: 0,
            ..host_config()
        });

        let mut out = Vec::new();
        let report = runner.run(&mut out).unwrap();

        assert_eq!(report.count, 0);
        assert!(report.preview.is_empty());
        assert_eq!(output_lines(out).len(), 2);
    }

    #[test]
    fn test_preview_longer_than_data() {
        let operands = Operands::new(vec![1.0], vec![2.0], vec![3.0]).unwrap();
        let runner = VectorAdditionRunner::new(RunConfig {
            preview: 10,
            ..host_config()
        });

        let mut out = Vec::new();
        runner.run_with_operands(&operands, &mut out).unwrap();
        assert_eq!(output_lines(out), vec!["1.0 + 2.0 + 3.0 = 6.0"]);
    }

    #[test]
    fn test_unknown_kernel_fails_before_output() {
        let runner = VectorAdditionRunner::new(RunConfig {
            kernel_name: "mul".to_string(),
            ..host_config()
        });
        let operands = Operands::random(8, Some(1));

        let mut out = Vec::new();
        let err = runner.run_with_operands(&operands, &mut out).err();
        assert_eq!(err, Some(GpuError::SymbolLookup("mul".to_string())));
        assert!(out.is_empty());
    }

    #[test]
    fn test_seeded_operands_repeat() {
        assert_eq!(Operands::random(32, Some(3)), Operands::random(32, Some(3)));
    }

    #[test]
    fn test_unseeded_operands_differ() {
        assert_ne!(Operands::random(64, None), Operands::random(64, None));
    }

    #[test]
    fn test_mismatched_operands_rejected() {
        assert!(Operands::new(vec![1.0], vec![], vec![1.0]).is_none());
    }

    #[test]
    fn test_operand_views() {
        let operands = Operands::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]).unwrap();
        assert_eq!(operands.a(), &[1.0, 2.0]);
        assert_eq!(operands.b(), &[3.0, 4.0]);
        assert_eq!(operands.c(), &[5.0, 6.0]);
        assert_eq!(operands.len(), 2);

        let random = Operands::random(17, Some(5));
        assert_eq!(random.a().len(), 17);
        assert_eq!(random.b().len(), 17);
        assert_eq!(random.c().len(), 17);
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let operands = Operands::new(vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]).unwrap();
        assert!(verify(&operands, &[3.0, 3.0]).is_ok());
        assert_eq!(
            verify(&operands, &[3.0, 2.0]),
            Err(GpuError::VerificationMismatch {
                index: 1,
                expected: 3.0,
                actual: 2.0,
            })
        );
    }

    #[test]
    fn test_format_row_keeps_fraction() {
        assert_eq!(format_row(9.0, 0.0, 1.0, 10.0), "9.0 + 0.0 + 1.0 = 10.0");
    }
}
