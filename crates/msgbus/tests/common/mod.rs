// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Shared test doubles.

#![allow(dead_code)]

use msgbus::{Config, LoopbackSession, LoopbackTransport, OpenError, OpenErrorKind, Poll, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub open: AtomicUsize,
    pub send: AtomicUsize,
    pub poll: AtomicUsize,
    pub close: AtomicUsize,
}

impl Calls {
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
    pub fn send(&self) -> usize {
        self.send.load(Ordering::SeqCst)
    }
    pub fn poll(&self) -> usize {
        self.poll.load(Ordering::SeqCst)
    }
    pub fn close(&self) -> usize {
        self.close.load(Ordering::SeqCst)
    }
}

/// Loopback transport that records every call and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: LoopbackTransport,
    pub calls: Arc<Calls>,
    reject_open: bool,
    panic_on_close: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `open` fails with `OpenErrorKind::Unavailable`.
    pub fn rejecting() -> Self {
        Self {
            reject_open: true,
            ..Self::default()
        }
    }

    /// `close` panics after releasing the inner session.
    pub fn panicking_on_close() -> Self {
        Self {
            panic_on_close: true,
            ..Self::default()
        }
    }

    pub fn loopback(&self) -> &LoopbackTransport {
        &self.inner
    }
}

impl Transport for RecordingTransport {
    type Session = LoopbackSession;

    fn open(&self, config: &Config) -> Result<LoopbackSession, OpenError> {
        self.calls.open.fetch_add(1, Ordering::SeqCst);
        if self.reject_open {
            return Err(OpenError::new(OpenErrorKind::Unavailable, "broker offline"));
        }
        self.inner.open(config)
    }

    fn send(&self, session: &mut LoopbackSession, topic: &str, payload: &[u8]) -> bool {
        self.calls.send.fetch_add(1, Ordering::SeqCst);
        self.inner.send(session, topic, payload)
    }

    fn poll(
        &self,
        session: &mut LoopbackSession,
        topic_capacity: usize,
        payload_capacity: usize,
    ) -> Poll {
        self.calls.poll.fetch_add(1, Ordering::SeqCst);
        self.inner.poll(session, topic_capacity, payload_capacity)
    }

    fn close(&self, session: LoopbackSession) {
        self.calls.close.fetch_add(1, Ordering::SeqCst);
        self.inner.close(session);
        if self.panic_on_close {
            panic!("close failed");
        }
    }
}

/// Random topic of 1..=max_len ASCII characters.
pub fn random_topic(rng: &mut fastrand::Rng, max_len: usize) -> String {
    let len = rng.usize(1..=max_len);
    (0..len).map(|_| rng.alphanumeric()).collect()
}

/// Random payload of 0..=max_len bytes.
pub fn random_payload(rng: &mut fastrand::Rng, max_len: usize) -> Vec<u8> {
    let len = rng.usize(0..=max_len);
    (0..len).map(|_| rng.u8(..)).collect()
}
