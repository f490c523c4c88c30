// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! # msgbus - Client-side publish/subscribe session
//!
//! A [`Client`] opens one session on a [`Transport`], exchanges topic-addressed
//! messages through it, and closes it exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use msgbus::{Client, Config, Received};
//!
//! fn main() -> msgbus::Result<()> {
//!     let client = Client::connect(Config::default().with_segment_name("quickstart"))?;
//!
//!     client.send("sensors/temperature", b"21.5")?;
//!
//!     if let Received::Message(msg) = client.receive(256, 1024)? {
//!         println!("{}: {:?}", msg.topic(), msg.payload());
//!     }
//!
//!     client.release();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  Application                                                  |
//! |    Client::open / send / receive / release                    |
//! +---------------------------------------------------------------+
//! |  Client  (state machine + per-instance lock, owns one session)|
//! +---------------------------------------------------------------+
//! |  Transport capability: open | send | poll | close             |
//! |    LoopbackTransport (named bounded segments) | NullTransport |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Owning session; serializes all calls on its handle |
//! | [`Config`] | Settings handed whole to the transport on open |
//! | [`Message`] | Topic plus payload, trimmed to the delivered length |
//! | [`Received`] | Message, no message, or transport fault |
//! | [`Transport`] | Four-operation capability a backend implements |
//!
//! ## Errors
//!
//! Only contract violations are [`Error`]s: a failed open
//! ([`Error::InitializationFailure`]) and any use of a released client
//! ([`Error::UseAfterRelease`]). A refused send is `Ok(false)` and an empty
//! queue is `Ok(Received::NoMessage)`.

/// Owning client session (state machine, locking, buffer trimming).
pub mod client;
/// Session configuration and optional YAML loading.
pub mod config;
/// Error taxonomy and `Result` alias.
pub mod error;
/// `env_logger` installation helpers.
pub mod logging;
/// Messages and receive outcomes.
pub mod message;
/// Transport capability trait and built-in transports.
pub mod transport;

pub use client::{Client, ClientState};
pub use config::Config;
pub use error::{Error, Result};
pub use message::{Message, ReceiveError, Received};
pub use transport::{
    code, LoopbackSession, LoopbackTransport, NullTransport, OpenError, OpenErrorKind, Poll,
    Transport,
};

/// msgbus version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
