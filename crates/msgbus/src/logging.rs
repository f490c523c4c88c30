// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Logging initialization.
//!
//! The library itself only emits records through the `log` facade. These
//! helpers install an `env_logger` backend for applications and bindings
//! that do not bring their own.
//!
//! ```rust,no_run
//! use msgbus::logging::{self, LogLevel};
//!
//! logging::init(LogLevel::Info).ok();
//! ```

use crate::error::{Error, Result};

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No output.
    Off,
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Lifecycle events (open, release).
    Info,
    /// Rejections and receive faults.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install a console logger at `level`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if a logger is already installed.
pub fn init(level: LogLevel) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(already_installed)
}

/// Install a console logger honouring `RUST_LOG`, falling back to `default`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if a logger is already installed.
pub fn init_from_env(default: LogLevel) -> Result<()> {
    let filter: log::LevelFilter = default.into();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter.to_string()))
        .format_timestamp_millis()
        .try_init()
        .map_err(already_installed)
}

/// Install a console logger with an explicit filter string
/// (e.g. `"msgbus=debug,warn"`).
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `filter` is empty or a logger is
/// already installed.
pub fn init_with_filter(filter: &str) -> Result<()> {
    if filter.trim().is_empty() {
        return Err(Error::InvalidConfig("log filter must not be empty".to_string()));
    }
    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .try_init()
        .map_err(already_installed)
}

fn already_installed(e: log::SetLoggerError) -> Error {
    Error::InvalidConfig(format!("logger already installed: {}", e))
}
