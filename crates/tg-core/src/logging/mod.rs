//! Diagnostics for the trendguard CLI.
//!
//! Command payloads own stdout, so every event goes to stderr, either as
//! console lines or as JSONL. Each invocation runs inside a `run` span that
//! carries its run id.

pub mod config;

pub use config::{verbosity_level, LogConfig, LogFormat};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Crates whose events pass the level filter.
const LOG_TARGETS: [&str; 3] = ["tg_core", "trendguard", "tg_config"];

/// `RUST_LOG` directives are used verbatim unless `TG_LOG` is set.
fn build_filter(config: &LogConfig) -> EnvFilter {
    let from_rust_log = std::env::var_os("TG_LOG")
        .is_none()
        .then(|| EnvFilter::try_from_default_env().ok())
        .flatten();
    from_rust_log.unwrap_or_else(|| {
        let directives = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={}", config.level))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    })
}

fn output_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        (LogFormat::Human, stamped) => {
            let console = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if stamped {
                console.boxed()
            } else {
                console.without_time().boxed()
            }
        }
    }
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init_logging(config: &LogConfig) {
    let installed = tracing_subscriber::registry()
        .with(output_layer(config))
        .with(build_filter(config))
        .try_init();
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

/// Short random id tying a run's log events to its output documents.
pub fn generate_run_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &id[..12])
}
