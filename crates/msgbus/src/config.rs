// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Session configuration.
//!
//! [`Config`] is handed whole to [`Transport::open`](crate::Transport::open).
//! The client keeps its own copy and never mutates it.
//!
//! With the `config-loaders` feature (default) a config can also be read from
//! YAML:
//!
//! ```yaml
//! # msgbus.yaml
//! segment_name: telemetry
//! max_message_size: 4096
//! max_queue_size: 256
//! max_buffer_size: 1048576
//! ```
//!
//! Missing keys fall back to [`Config::default`].

use crate::error::{Error, Result};
use crate::transport::frame::FRAME_OVERHEAD;

#[cfg(feature = "config-loaders")]
use std::path::Path;

/// Default segment name used by [`Config::default`].
pub const DEFAULT_SEGMENT_NAME: &str = "msgbus";

/// Default upper bound on an encoded frame, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024;

/// Default number of frames a segment buffers.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1024;

/// Default byte budget for all frames queued on a segment (1 MiB).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = DEFAULT_MAX_MESSAGE_SIZE * DEFAULT_MAX_QUEUE_SIZE;

/// Settings passed to the transport when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct Config {
    /// Name of the segment the session attaches to. Sessions on the same
    /// segment share one message queue.
    pub segment_name: String,
    /// Maximum size of an encoded frame (topic + payload + length prefixes).
    pub max_message_size: usize,
    /// Number of frames buffered before sends are rejected.
    pub max_queue_size: usize,
    /// Total encoded bytes buffered before sends are rejected.
    pub max_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_name: DEFAULT_SEGMENT_NAME.to_string(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Set the segment name.
    pub fn with_segment_name(mut self, name: impl Into<String>) -> Self {
        self.segment_name = name.into();
        self
    }

    /// Set the maximum encoded frame size.
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    /// Set the queue depth.
    pub fn with_max_queue_size(mut self, frames: usize) -> Self {
        self.max_queue_size = frames;
        self
    }

    /// Set the queued-bytes budget.
    pub fn with_max_buffer_size(mut self, bytes: usize) -> Self {
        self.max_buffer_size = bytes;
        self
    }

    /// Check that every field is usable by a transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty segment name, a zero
    /// queue depth, a frame limit too small to hold a one-byte topic, or a
    /// byte budget that cannot hold one maximum-size frame.
    pub fn validate(&self) -> Result<()> {
        if self.segment_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "segment_name must not be empty".to_string(),
            ));
        }
        if self.max_queue_size == 0 {
            return Err(Error::InvalidConfig(
                "max_queue_size must be at least 1".to_string(),
            ));
        }
        // Smallest useful frame: both length prefixes plus a one-byte topic.
        let minimum = FRAME_OVERHEAD + 1;
        if self.max_message_size < minimum {
            return Err(Error::InvalidConfig(format!(
                "max_message_size {} is below the minimum frame size {}",
                self.max_message_size, minimum
            )));
        }
        if self.max_buffer_size < self.max_message_size {
            return Err(Error::InvalidConfig(format!(
                "max_buffer_size {} is below max_message_size {}",
                self.max_buffer_size, self.max_message_size
            )));
        }
        Ok(())
    }

    /// Parse a config from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] on malformed YAML or unknown keys, and
    /// [`Error::InvalidConfig`] if the parsed values fail [`Config::validate`].
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFileNotFound`] if `path` does not exist, plus
    /// everything [`Config::from_yaml_str`] can return.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigFileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
