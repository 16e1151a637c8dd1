//! Logging setup.
//!
//! The adapter logs through the `log` facade under the [`LOG_TARGET`] target and never installs a
//! logger itself. Hosts without their own logger can use [`init_logger`].

pub use log::{debug, error, info, warn};

/// Target used by every log record emitted by the adapter.
pub const LOG_TARGET: &str = "undercover::inference";

/// An `env_logger` builder showing adapter records at `info` and above unless `RUST_LOG` says
/// otherwise.
///
/// ```no_run
/// undercover_inference::logging::init_logger().init();
/// ```
pub fn init_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_module("undercover", log::LevelFilter::Info)
        .parse_default_env();
    builder
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = init_logger()
        .filter_module("undercover", log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
