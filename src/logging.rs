//! Logging configuration for vecadd
//!
//! Thin setup over the `log` facade and `env_logger`.
//!
//! - `error!` - the fatal failure that ends a run
//! - `info!` - backend choice, kernel loading, phase timings
//! - `debug!` - device names, dispatch geometry
//!
//! `RUST_LOG` controls verbosity at runtime (default `warn`):
//!
//! ```bash
//! RUST_LOG=info vecadd                    # show phases and timings
//! RUST_LOG=vecadd_gpu=debug vecadd        # dispatch geometry too
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging with a specific level.
///
/// This only initializes once; subsequent calls are no-ops.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from the RUST_LOG environment variable.
///
/// If RUST_LOG is not set, defaults to Warn level.
pub fn init_from_env() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test() {
    // try_init() doesn't panic if already initialized
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        init_test();
        log::warn!("Test warning message");
    }
}
