// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Topic-addressed messages and receive outcomes.

use crate::error::{Error, Result};
use crate::transport::code;
use std::fmt;

/// A topic identifier paired with a payload.
///
/// The payload container always holds exactly the meaningful bytes:
/// `len() == payload().len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    topic: String,
    payload: Vec<u8>,
}

impl Message {
    /// Build a message from a topic and payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if `topic` is empty or contains a
    /// NUL byte.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Result<Self> {
        let topic = topic.into();
        validate_topic(&topic)?;
        Ok(Self {
            topic,
            payload: payload.into(),
        })
    }

    /// Build a message from a possibly-absent topic and an explicit length.
    ///
    /// This is the entry point for callers that track the payload length
    /// separately from the buffer (foreign bindings, fixed buffers).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if `topic` is `None` or empty, or if
    /// `declared_len` differs from `payload.len()`.
    pub fn with_length(topic: Option<&str>, payload: &[u8], declared_len: usize) -> Result<Self> {
        let Some(topic) = topic else {
            return Err(Error::InvalidMessage("topic is absent".to_string()));
        };
        if declared_len != payload.len() {
            return Err(Error::InvalidMessage(format!(
                "declared length {} does not match payload size {}",
                declared_len,
                payload.len()
            )));
        }
        Self::new(topic, payload)
    }

    /// Topic identifier.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Split into `(topic, payload)`.
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.topic, self.payload)
    }

    /// Assemble from buffers already trimmed by the client.
    pub(crate) fn from_received(topic: String, payload: Vec<u8>) -> Self {
        debug_assert!(validate_topic(&topic).is_ok());
        Self { topic, payload }
    }
}

/// Topics are non-empty and NUL-free so they survive a C string round trip.
pub(crate) fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(Error::InvalidMessage("topic must not be empty".to_string()));
    }
    if topic.contains('\0') {
        return Err(Error::InvalidMessage(
            "topic must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

/// Transport fault reported by a poll.
///
/// Codes are always negative; see [`code`] for the reserved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiveError {
    code: i32,
}

impl ReceiveError {
    /// Wrap a transport error code. Non-negative codes are clamped to
    /// [`code::UNSPECIFIED`] so the value is always an error.
    pub fn new(code: i32) -> Self {
        if code < 0 {
            Self { code }
        } else {
            Self {
                code: code::UNSPECIFIED,
            }
        }
    }

    /// The transport's negative error code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// True if the pending message did not fit the supplied capacities.
    pub fn is_overflow(&self) -> bool {
        self.code == code::TOPIC_OVERFLOW || self.code == code::PAYLOAD_OVERFLOW
    }
}

impl fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receive failed ({}): {}", self.code, code::describe(self.code))
    }
}

impl std::error::Error for ReceiveError {}

/// Outcome of a non-blocking receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A message that fit both capacities.
    Message(Message),
    /// Nothing is queued right now. Not an error.
    NoMessage,
    /// The transport reported a fault, including a message too large for the
    /// supplied capacities.
    Error(ReceiveError),
}

impl Received {
    /// True for [`Received::Message`].
    pub fn is_message(&self) -> bool {
        matches!(self, Received::Message(_))
    }

    /// The delivered message, if any.
    pub fn into_message(self) -> Option<Message> {
        match self {
            Received::Message(msg) => Some(msg),
            _ => None,
        }
    }
}
