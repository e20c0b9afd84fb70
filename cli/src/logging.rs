//! Tracing subscriber setup for the `umbra` binary
//!
//! Diagnostics go to stderr; stdout carries command output only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Crates whose events the configured level applies to
const UMBRA_TARGETS: [&str; 5] = ["umbra", "umbra_cli", "umbra_fhe", "umbra_committee", "umbra_ledger"];

/// Filter directives scoping `level` to the umbra crates. Everything else,
/// including the FHE library when enabled, stays at `warn`.
pub fn filter_directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(UMBRA_TARGETS.iter().map(|target| format!("{}={}", target, level)));
    directives.join(",")
}

/// Install the global subscriber. A `RUST_LOG` in the environment replaces
/// the configured level entirely.
pub fn init(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(level))?,
    };

    let layer = fmt::layer().with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json().with_current_span(true))
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("logging already initialized: {}", e))
}
