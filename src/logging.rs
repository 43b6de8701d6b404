// ABOUTME: Tracing subscriber setup for applications embedding the fetch pipeline
// ABOUTME: Environment-driven level and output format with HTTP client noise reduction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Structured logging setup

use std::env;
use std::io;

use anyhow::{anyhow, Result};
use tracing::{info, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default service name reported at startup
const SERVICE_NAME: &str = "googalytics";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Service name for structured logging
    pub service_name: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `JSON` lines for log collectors
    Json,
    /// Multi-field human readable output
    #[default]
    Pretty,
    /// One short line per event
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            service_name: SERVICE_NAME.into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format,
            include_location: env::var("LOG_INCLUDE_LOCATION")
                .is_ok_and(|v| v != "false" && v != "0"),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.into()),
        }
    }

    /// Filter applying `level` plus noise reduction for the HTTP stack
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(&self.level),
            |directive| EnvFilter::new(&directive),
        );
        [
            ("hyper=warn", Level::WARN),
            ("hyper_util=warn", Level::WARN),
            ("reqwest=warn", Level::WARN),
            ("rustls=warn", Level::WARN),
        ]
        .into_iter()
        .fold(base, |filter, (directive, fallback)| {
            filter.add_directive(directive_or(directive, fallback))
        })
        .add_directive(directive_or(
            &format!("googalytics={}", self.level),
            Level::INFO,
        ))
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_target(true)
                        .with_writer(io::stdout),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_target(true)
                        .with_writer(io::stdout),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stdout),
                )
                .try_init(),
        }
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

        info!(
            service.name = %self.service_name,
            service.version = env!("CARGO_PKG_VERSION"),
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

fn directive_or(directive: &str, fallback: Level) -> Directive {
    directive.parse().unwrap_or_else(|_| fallback.into())
}

/// Initialize logging from the environment
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_pretty_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.service_name, "googalytics");
    }

    #[test]
    fn test_unparseable_directive_falls_back() {
        let directive = directive_or("googalytics=loudest", Level::WARN);
        assert_eq!(directive.to_string(), "warn");
    }
}
