//! Tracing initialization.
//!
//! Filtering follows `RUST_LOG` (default `info`). Output is JSON unless
//! `LOG_FORMAT=text` asks for compact human-readable lines.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// Unknown values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "compact" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Install the global subscriber. Safe to call multiple times.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    // Each event carries the fields of its current span (request id, product id).
    let _ = match format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(false)
            .try_init(),
        LogFormat::Text => builder.compact().with_target(true).try_init(),
    };
}
