//! Structured logging via `tracing`.
//!
//! - Level filtering with per-module overrides (`RUST_LOG` wins when set)
//! - Spans for timing generation passes
//! - Idempotent initialization

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Log level for the simulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("realm_core::generation".to_string(), LogLevel::Info),
                ("realm_core::combat".to_string(), LogLevel::Info),
                ("realm_core::engine".to_string(), LogLevel::Info),
            ],
            show_targets: true,
            show_file_line: false,
        }
    }
}

impl TracingConfig {
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing with custom config (idempotent, first call wins)
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    let show_targets = config.show_targets;
    let show_file_line = config.show_file_line;
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(show_targets)
            .with_file(show_file_line)
            .with_line_number(show_file_line)
            .compact();

        // a global subscriber may already be installed by the host
        let _ = subscriber.try_init();
    });
}

/// Named span guard for timing an operation
pub struct TimingSpan {
    _span: tracing::span::EnteredSpan,
}

impl TimingSpan {
    pub fn new(name: &str) -> Self {
        let span = tracing::info_span!("operation", name = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_string() {
        let config = TracingConfig {
            default_level: LogLevel::Warn,
            module_filters: vec![("realm_core::engine".into(), LogLevel::Debug)],
            ..Default::default()
        };
        assert_eq!(config.to_env_filter_string(), "warn,realm_core::engine=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(&TracingConfig::default());
        init_tracing(&TracingConfig::default());
        let _span = TimingSpan::new("test");
        tracing::info!("still alive");
    }
}
