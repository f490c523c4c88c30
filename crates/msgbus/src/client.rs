// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! # Client Session
//!
//! A [`Client`] owns exactly one transport session for its whole lifetime.
//!
//! ## Lifecycle
//!
//! ```text
//!  Client::open()
//!       |
//!       v
//!  +---------+  transport.open() ok   +--------+  release() / drop  +----------+
//!  | Created | ---------------------> | Active | -----------------> | Released |
//!  +---------+                        +--------+                    +----------+
//!       |  transport.open() failed                                       ^
//!       +--> Err(InitializationFailure), no session retained             |
//!                                                                  (terminal)
//! ```
//!
//! ## Thread Safety
//!
//! Every operation takes the client's internal lock, so `send`, `receive`
//! and `release` on one instance never overlap and the transport never sees
//! concurrent calls on the session. `release` waits for an in-flight
//! operation to finish, closes the session, and marks the client
//! `Released`; operations that start afterwards fail fast with
//! [`Error::UseAfterRelease`] without touching the transport.
//!
//! ## Example
//!
//! ```rust
//! use msgbus::{Client, Config, LoopbackTransport, Received};
//!
//! let client = Client::open(LoopbackTransport::new(), Config::default())?;
//! assert!(client.send("alerts", &[0x01, 0x02, 0x03])?);
//!
//! match client.receive(256, 1024)? {
//!     Received::Message(msg) => assert_eq!(msg.payload(), &[0x01, 0x02, 0x03]),
//!     Received::NoMessage => unreachable!(),
//!     Received::Error(e) => panic!("transport fault: {}", e),
//! }
//!
//! client.release();
//! assert!(client.send("alerts", &[0x04]).is_err());
//! # Ok::<(), msgbus::Error>(())
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{validate_topic, Message, ReceiveError, Received};
use crate::transport::{code, LoopbackTransport, Poll, Transport};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Lifecycle state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Construction in progress; no session yet.
    Created,
    /// Session open and usable.
    Active,
    /// Session closed. Terminal.
    Released,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Created => write!(f, "created"),
            ClientState::Active => write!(f, "active"),
            ClientState::Released => write!(f, "released"),
        }
    }
}

struct Inner<S> {
    state: ClientState,
    session: Option<S>,
}

impl<S> Inner<S> {
    /// Session of an `Active` client; anything else is use-after-release.
    fn active_session(&mut self) -> Result<&mut S> {
        match (self.state, self.session.as_mut()) {
            (ClientState::Active, Some(session)) => Ok(session),
            _ => Err(Error::UseAfterRelease),
        }
    }
}

/// Owning client session over a [`Transport`].
pub struct Client<T: Transport = LoopbackTransport> {
    transport: T,
    config: Config,
    inner: Mutex<Inner<T::Session>>,
}

impl Client<LoopbackTransport> {
    /// Open a session on the process-wide loopback transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailure`] if the session cannot be opened.
    pub fn connect(config: Config) -> Result<Self> {
        Self::open(LoopbackTransport::global(), config)
    }
}

impl<T: Transport> Client<T> {
    /// Open a session on `transport`.
    ///
    /// The client keeps its own copy of `config` for its whole lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailure`] carrying the transport's
    /// reason if `open` fails. No session is retained in that case.
    pub fn open(transport: T, config: Config) -> Result<Self> {
        let client = Self {
            transport,
            config,
            inner: Mutex::new(Inner {
                state: ClientState::Created,
                session: None,
            }),
        };

        let session = match client.transport.open(&client.config) {
            Ok(session) => session,
            Err(e) => {
                log::warn!(
                    "[client] open failed on segment '{}': {}",
                    client.config.segment_name,
                    e
                );
                return Err(Error::initialization(e));
            }
        };

        {
            let mut inner = client.inner.lock();
            inner.session = Some(session);
            inner.state = ClientState::Active;
        }
        log::info!(
            "[client] session opened on segment '{}'",
            client.config.segment_name
        );
        Ok(client)
    }

    /// Send `payload` on `topic`.
    ///
    /// Returns `Ok(true)` if the transport accepted the message for outbound
    /// delivery and `Ok(false)` if it refused it (full, too large, closed).
    /// Acceptance is local only, not an end-to-end acknowledgment.
    ///
    /// # Errors
    ///
    /// - [`Error::UseAfterRelease`] if the client is not active
    /// - [`Error::InvalidMessage`] if `topic` is empty or contains a NUL byte
    pub fn send(&self, topic: &str, payload: &[u8]) -> Result<bool> {
        let mut inner = self.inner.lock();
        let session = inner.active_session()?;
        validate_topic(topic)?;

        let accepted = self.transport.send(session, topic, payload);
        if !accepted {
            log::debug!(
                "[client] send rejected: topic='{}' len={}",
                topic,
                payload.len()
            );
        }
        Ok(accepted)
    }

    /// Send a pre-built [`Message`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the client is not active.
    pub fn send_message(&self, message: &Message) -> Result<bool> {
        self.send(message.topic(), message.payload())
    }

    /// Poll for one message without blocking.
    ///
    /// `topic_capacity` and `payload_capacity` bound how many bytes the
    /// caller is willing to receive. They are limits only: nothing is
    /// allocated up front, so `usize::MAX` is a valid "no limit". A delivered
    /// message holds exactly the delivered bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the client is not active.
    /// Transport faults are not errors; they come back as
    /// [`Received::Error`].
    pub fn receive(&self, topic_capacity: usize, payload_capacity: usize) -> Result<Received> {
        let mut inner = self.inner.lock();
        let session = inner.active_session()?;

        let received = match self
            .transport
            .poll(session, topic_capacity, payload_capacity)
        {
            Poll::Empty => Received::NoMessage,
            Poll::Failed(c) => Received::Error(ReceiveError::new(c)),
            Poll::Delivered { topic, payload } => {
                check_delivery(topic, payload, topic_capacity, payload_capacity)
            }
        };

        if let Received::Error(e) = &received {
            log::debug!("[client] {}", e);
        }
        Ok(received)
    }

    /// Close the session.
    ///
    /// The first call on an active client waits for any in-flight operation,
    /// closes the session, and moves the client to `Released`. Every other
    /// call is a no-op. Never fails; a panicking transport close is caught
    /// and logged.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        inner.state = ClientState::Released;

        let Some(session) = inner.session.take() else {
            return;
        };
        debug_assert_eq!(previous, ClientState::Active);

        let transport = &self.transport;
        if catch_unwind(AssertUnwindSafe(|| transport.close(session))).is_err() {
            log::error!(
                "[client] transport close panicked on segment '{}'",
                self.config.segment_name
            );
        }
        log::info!(
            "[client] session released on segment '{}'",
            self.config.segment_name
        );
    }

    /// Release and consume the client.
    pub fn close(self) {
        self.release();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        self.inner.lock().state
    }

    /// True while the session is open.
    pub fn is_active(&self) -> bool {
        self.state() == ClientState::Active
    }

    /// Config the session was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The transport this client drives.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Transport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("segment", &self.config.segment_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Hold a transport to its capacities and to the topic rules.
fn check_delivery(
    topic: Vec<u8>,
    payload: Vec<u8>,
    topic_capacity: usize,
    payload_capacity: usize,
) -> Received {
    if topic.len() > topic_capacity {
        return Received::Error(ReceiveError::new(code::TOPIC_OVERFLOW));
    }
    if payload.len() > payload_capacity {
        return Received::Error(ReceiveError::new(code::PAYLOAD_OVERFLOW));
    }

    let Ok(topic) = String::from_utf8(topic) else {
        return Received::Error(ReceiveError::new(code::CORRUPT_FRAME));
    };
    if validate_topic(&topic).is_err() {
        return Received::Error(ReceiveError::new(code::CORRUPT_FRAME));
    }
    Received::Message(Message::from_received(topic, payload))
}
