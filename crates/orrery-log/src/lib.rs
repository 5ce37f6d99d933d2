//! Tracing setup for the orrery binary.
//!
//! Console output is stamped with time since start. Debug builds can also
//! write JSON lines to a file. Records from crates using the `log` macros are
//! forwarded through the same subscriber.

use std::path::Path;

use orrery_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

pub const LOG_FILE_NAME: &str = "orrery.log";

/// Directive from the config's `debug.log_level`, with GPU noise kept at `warn`
/// unless the directive already mentions those crates.
pub fn filter_directive(config: Option<&Config>) -> String {
    let level = config.map(|c| c.debug.log_level.trim()).unwrap_or("");
    if level.is_empty() {
        return DEFAULT_FILTER.to_string();
    }
    let mut directive = level.to_string();
    for noisy in ["wgpu", "naga"] {
        if !level.contains(noisy) {
            directive.push_str(&format!(",{noisy}=warn"));
        }
    }
    directive
}

pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Install the global subscriber. `RUST_LOG` wins over the config.
///
/// Call once, before the event loop starts.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!("Writing JSON log to {}", log_dir.join(LOG_FILE_NAME).display());
        return;
    }

    subscriber.init();
}
