// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Logging initialization for the C API

use std::ffi::CStr;
use std::os::raw::c_char;

use msgbus::logging::{self, LogLevel};

/// Log level for msgbus logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgbusLogLevel {
    MsgbusLogOff = 0,
    MsgbusLogError = 1,
    MsgbusLogWarn = 2,
    MsgbusLogInfo = 3,
    MsgbusLogDebug = 4,
    MsgbusLogTrace = 5,
}

impl From<MsgbusLogLevel> for LogLevel {
    fn from(level: MsgbusLogLevel) -> Self {
        match level {
            MsgbusLogLevel::MsgbusLogOff => LogLevel::Off,
            MsgbusLogLevel::MsgbusLogError => LogLevel::Error,
            MsgbusLogLevel::MsgbusLogWarn => LogLevel::Warn,
            MsgbusLogLevel::MsgbusLogInfo => LogLevel::Info,
            MsgbusLogLevel::MsgbusLogDebug => LogLevel::Debug,
            MsgbusLogLevel::MsgbusLogTrace => LogLevel::Trace,
        }
    }
}

/// Initialize console logging at `level`.
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `true` on success, `false` if a logger is already installed.
///
/// # Example (C)
/// ```c
/// msgbus_logging_init(MSGBUS_LOG_INFO);
/// ```
#[no_mangle]
pub unsafe extern "C" fn msgbus_logging_init(level: MsgbusLogLevel) -> bool {
    logging::init(level.into()).is_ok()
}

/// Initialize console logging, letting `RUST_LOG` override `default_level`.
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `true` on success, `false` if a logger is already installed.
#[no_mangle]
pub unsafe extern "C" fn msgbus_logging_init_env(default_level: MsgbusLogLevel) -> bool {
    logging::init_from_env(default_level.into()).is_ok()
}

/// Initialize console logging with a filter string (e.g. `"msgbus=debug,warn"`).
///
/// # Safety
/// - `filter` must be a valid NUL-terminated C string or NULL.
///
/// # Returns
/// `true` on success. `false` if `filter` is NULL, not UTF-8, empty, or a
/// logger is already installed.
///
/// # Example (C)
/// ```c
/// msgbus_logging_init_with_filter("msgbus=debug");
/// ```
#[no_mangle]
pub unsafe extern "C" fn msgbus_logging_init_with_filter(filter: *const c_char) -> bool {
    if filter.is_null() {
        return false;
    }
    let Ok(filter) = CStr::from_ptr(filter).to_str() else {
        return false;
    };
    logging::init_with_filter(filter).is_ok()
}
