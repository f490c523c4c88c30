// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Transport capability consumed by [`Client`](crate::Client).
//!
//! A transport exposes four operations on an opaque session:
//!
//! | Operation | Input | Output |
//! |-----------|-------|--------|
//! | `open`  | [`Config`] | session, or [`OpenError`] |
//! | `send`  | session, topic, payload | accepted (`true`) / rejected (`false`) |
//! | `poll`  | session, topic capacity, payload capacity | [`Poll`] |
//! | `close` | session (consumed) | nothing, best effort |
//!
//! ## Design Principles
//!
//! - **Capacities, not buffers** - `poll` is told how much the caller will
//!   accept and hands back exactly the delivered bytes
//! - **Non-blocking** - `poll` never waits for a message
//! - **Move-only sessions** - `close` consumes the session so it cannot be
//!   named again
//! - **No locking** - implementations may assume calls on one session are
//!   serialized by the caller

use crate::config::Config;
use std::fmt;

pub mod frame;
pub mod loopback;

pub use loopback::{LoopbackSession, LoopbackTransport};

/// Reserved poll error codes. All codes are negative.
pub mod code {
    /// Reserved for the old "nothing received" return value.
    /// Never produced by the built-in transports.
    pub const LEGACY_NOTHING: i32 = -1;
    /// Pending topic is longer than the topic buffer.
    pub const TOPIC_OVERFLOW: i32 = -2;
    /// Pending payload is longer than the payload buffer.
    pub const PAYLOAD_OVERFLOW: i32 = -3;
    /// Stored frame could not be decoded.
    pub const CORRUPT_FRAME: i32 = -4;
    /// Backing segment is gone.
    pub const SESSION_CLOSED: i32 = -5;
    /// Transport fault without a more specific code.
    pub const UNSPECIFIED: i32 = -6;

    /// Human-readable description of a code.
    pub fn describe(code: i32) -> &'static str {
        match code {
            LEGACY_NOTHING => "no message (legacy)",
            TOPIC_OVERFLOW => "topic exceeds capacity",
            PAYLOAD_OVERFLOW => "payload exceeds capacity",
            CORRUPT_FRAME => "corrupt frame",
            SESSION_CLOSED => "session closed",
            _ => "transport error",
        }
    }
}

/// Result of a single non-blocking poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// A message was taken off the queue.
    Delivered {
        /// Topic bytes, exactly as delivered.
        topic: Vec<u8>,
        /// Payload bytes, exactly as delivered.
        payload: Vec<u8>,
    },
    /// Nothing is queued.
    Empty,
    /// Transport fault; the code is negative.
    Failed(i32),
}

/// Classification of an open failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenErrorKind {
    /// The config was rejected before any resource was touched.
    InvalidConfig,
    /// The backing resource could not be reached or created.
    Unavailable,
    /// The transport refused the session for its own reasons.
    Rejected,
}

/// Why a transport could not open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenError {
    kind: OpenErrorKind,
    message: String,
}

impl OpenError {
    /// Create an open error.
    pub fn new(kind: OpenErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure classification.
    pub fn kind(&self) -> OpenErrorKind {
        self.kind
    }

    /// Detail message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpenErrorKind::InvalidConfig => write!(f, "invalid config: {}", self.message),
            OpenErrorKind::Unavailable => write!(f, "transport unavailable: {}", self.message),
            OpenErrorKind::Rejected => write!(f, "session rejected: {}", self.message),
        }
    }
}

impl std::error::Error for OpenError {}

/// Four-operation transport capability.
///
/// Implementations need not be safe under concurrent calls on the same
/// session; [`Client`](crate::Client) serializes every call on the session it
/// owns. Distinct sessions may be driven from different threads.
pub trait Transport: Send + Sync {
    /// Opaque live session state.
    type Session: Send;

    /// Open a session.
    fn open(&self, config: &Config) -> Result<Self::Session, OpenError>;

    /// Enqueue a message for outbound delivery.
    ///
    /// Returns `false` if the transport refused it (full, too large, closed).
    /// `true` means local acceptance only, not end-to-end delivery.
    fn send(&self, session: &mut Self::Session, topic: &str, payload: &[u8]) -> bool;

    /// Check for a message without blocking.
    ///
    /// On [`Poll::Delivered`] the topic holds at most `topic_capacity` bytes
    /// and the payload at most `payload_capacity`. A message that does not
    /// fit must be left queued and reported as [`Poll::Failed`] with
    /// [`code::TOPIC_OVERFLOW`] or [`code::PAYLOAD_OVERFLOW`]. Capacities are
    /// limits, not allocation hints: `usize::MAX` means "anything".
    fn poll(
        &self,
        session: &mut Self::Session,
        topic_capacity: usize,
        payload_capacity: usize,
    ) -> Poll;

    /// Release the session. Best effort; failures are the transport's to log.
    fn close(&self, session: Self::Session);
}

/// Null transport (for testing)
///
/// Accepts and discards every message, never delivers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl NullTransport {
    /// Create a new null transport.
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for NullTransport {
    type Session = ();

    fn open(&self, config: &Config) -> Result<(), OpenError> {
        config
            .validate()
            .map_err(|e| OpenError::new(OpenErrorKind::InvalidConfig, e.to_string()))
    }

    fn send(&self, _session: &mut (), _topic: &str, _payload: &[u8]) -> bool {
        true
    }

    fn poll(&self, _session: &mut (), _topic_capacity: usize, _payload_capacity: usize) -> Poll {
        Poll::Empty
    }

    fn close(&self, _session: ()) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_transport() {
        let transport = NullTransport::new();
        let mut session = transport.open(&Config::default()).unwrap();

        assert!(transport.send(&mut session, "alerts", b"hello"));

        assert_eq!(transport.poll(&mut session, 16, 16), Poll::Empty);
        assert_eq!(
            transport.poll(&mut session, usize::MAX, usize::MAX),
            Poll::Empty
        );
        transport.close(session);
    }

    #[test]
    fn test_null_transport_validates_config() {
        let err = NullTransport::new()
            .open(&Config::default().with_segment_name(""))
            .unwrap_err();
        assert_eq!(err.kind(), OpenErrorKind::InvalidConfig);
    }

    #[test]
    fn test_codes_are_negative_and_distinct() {
        let codes = [
            code::LEGACY_NOTHING,
            code::TOPIC_OVERFLOW,
            code::PAYLOAD_OVERFLOW,
            code::CORRUPT_FRAME,
            code::SESSION_CLOSED,
            code::UNSPECIFIED,
        ];
        for (i, a) in codes.iter().enumerate() {
            assert!(*a < 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_open_error_display() {
        let err = OpenError::new(OpenErrorKind::Unavailable, "segment torn down");
        assert_eq!(err.to_string(), "transport unavailable: segment torn down");
        assert_eq!(err.message(), "segment torn down");
    }
}
