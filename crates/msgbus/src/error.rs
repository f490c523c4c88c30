// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Error taxonomy for the client session.
//!
//! Only contract violations are errors here. A refused send is a `false`
//! return value and the outcome of a poll is a [`Received`](crate::Received)
//! value, so neither ever shows up as an [`Error`].

use std::fmt;

/// Boxed, thread-safe cause carried by [`Error::InitializationFailure`].
pub type BoxedReason = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by msgbus operations.
///
/// # Example
///
/// ```rust
/// use msgbus::{Client, Config, Error, NullTransport};
///
/// let bad = Config::default().with_max_queue_size(0);
/// match Client::open(NullTransport::new(), bad) {
///     Err(Error::InitializationFailure { reason }) => println!("open failed: {}", reason),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The transport refused to open a session. The client never became
    /// usable; a new construction attempt may be made.
    InitializationFailure {
        /// Opaque underlying cause reported by the transport.
        reason: BoxedReason,
    },
    /// Operation invoked on a client whose session is no longer valid.
    UseAfterRelease,

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Message failed local validation (absent topic, length mismatch).
    InvalidMessage(String),
    /// Configuration value is out of range or inconsistent.
    InvalidConfig(String),

    // ========================================================================
    // Configuration Loading Errors
    // ========================================================================
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
    /// Configuration document could not be parsed.
    ConfigParse(String),
    /// I/O error with underlying cause.
    IoError(std::io::Error),
}

impl Error {
    /// Wraps a transport open failure.
    pub fn initialization<E>(reason: E) -> Self
    where
        E: Into<BoxedReason>,
    {
        Error::InitializationFailure {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InitializationFailure { reason } => {
                write!(f, "Initialization failed: {}", reason)
            }
            Error::UseAfterRelease => write!(f, "Client used after release"),
            Error::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            Error::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InitializationFailure { reason } => Some(reason.as_ref()),
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
