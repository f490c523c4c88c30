// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Same-process loopback transport.
//!
//! # Architecture
//!
//! ```text
//! LoopbackTransport (cheap to clone, clones share the registry)
//! +-- segments: Mutex<HashMap<String, Weak<Segment>>>
//!
//! Segment (one per segment_name, kept alive by its sessions)
//! +-- limits: max_message_size, max_queue_size, max_buffer_size
//! +-- queue: Mutex<FrameQueue> (encoded frames + queued byte total)
//! +-- open: AtomicBool (cleared by teardown)
//! ```
//!
//! Every session opened on the same segment name shares one FIFO, so a send
//! on any session is visible to a poll on any other. The segment disappears
//! when its last session closes.

use super::frame;
use super::{code, OpenError, OpenErrorKind, Poll, Transport};
use crate::config::Config;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Encoded frames plus the byte total they occupy.
#[derive(Default)]
struct FrameQueue {
    frames: VecDeque<Vec<u8>>,
    bytes: usize,
}

impl FrameQueue {
    fn push(&mut self, frame: Vec<u8>) {
        self.bytes += frame.len();
        self.frames.push_back(frame);
    }

    fn pop(&mut self) -> Option<Vec<u8>> {
        let frame = self.frames.pop_front()?;
        self.bytes -= frame.len();
        Some(frame)
    }

    fn clear(&mut self) {
        self.frames.clear();
        self.bytes = 0;
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}

struct Segment {
    name: String,
    max_message_size: usize,
    max_queue_size: usize,
    max_buffer_size: usize,
    queue: Mutex<FrameQueue>,
    open: AtomicBool,
}

impl Segment {
    fn new(config: &Config) -> Self {
        Self {
            name: config.segment_name.clone(),
            max_message_size: config.max_message_size,
            max_queue_size: config.max_queue_size,
            max_buffer_size: config.max_buffer_size,
            queue: Mutex::new(FrameQueue::default()),
            open: AtomicBool::new(true),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn matches(&self, config: &Config) -> bool {
        self.max_message_size == config.max_message_size
            && self.max_queue_size == config.max_queue_size
            && self.max_buffer_size == config.max_buffer_size
    }
}

#[derive(Default)]
struct Registry {
    segments: Mutex<HashMap<String, Weak<Segment>>>,
    next_session_id: AtomicU64,
}

/// Live session on a loopback segment.
pub struct LoopbackSession {
    id: u64,
    segment: Arc<Segment>,
}

impl LoopbackSession {
    /// Session identifier, unique per transport registry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the segment this session is attached to.
    pub fn segment_name(&self) -> &str {
        &self.segment.name
    }
}

impl std::fmt::Debug for LoopbackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackSession")
            .field("id", &self.id)
            .field("segment", &self.segment.name)
            .finish()
    }
}

/// In-process transport backed by named bounded queues.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    registry: Arc<Registry>,
}

impl LoopbackTransport {
    /// Create a transport with its own private registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide transport used by [`Client::connect`](crate::Client::connect).
    pub fn global() -> Self {
        static GLOBAL: OnceLock<LoopbackTransport> = OnceLock::new();
        GLOBAL.get_or_init(LoopbackTransport::new).clone()
    }

    /// Number of live segments.
    pub fn segment_count(&self) -> usize {
        self.registry
            .segments
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Number of frames queued on `segment_name`, if the segment is live.
    pub fn pending(&self, segment_name: &str) -> Option<usize> {
        self.lookup(segment_name).map(|seg| seg.queue.lock().len())
    }

    /// Tear down a live segment: queued frames are dropped, sends are rejected
    /// and polls report [`code::SESSION_CLOSED`] until every session closes.
    ///
    /// Returns `false` if no such segment is live.
    pub fn teardown(&self, segment_name: &str) -> bool {
        let Some(segment) = self.lookup(segment_name) else {
            return false;
        };
        segment.open.store(false, Ordering::Release);
        segment.queue.lock().clear();
        self.registry.segments.lock().remove(segment_name);
        log::info!("[loopback] segment '{}' torn down", segment_name);
        true
    }

    fn lookup(&self, segment_name: &str) -> Option<Arc<Segment>> {
        self.registry
            .segments
            .lock()
            .get(segment_name)
            .and_then(Weak::upgrade)
    }
}

impl Transport for LoopbackTransport {
    type Session = LoopbackSession;

    fn open(&self, config: &Config) -> Result<LoopbackSession, OpenError> {
        config
            .validate()
            .map_err(|e| OpenError::new(OpenErrorKind::InvalidConfig, e.to_string()))?;

        let mut segments = self.registry.segments.lock();
        let existing = segments.get(&config.segment_name).and_then(Weak::upgrade);
        let segment = match existing {
            Some(existing) if !existing.matches(config) => {
                return Err(OpenError::new(
                    OpenErrorKind::Rejected,
                    format!(
                        "segment '{}' exists with limits {}B x {} ({}B budget)",
                        existing.name,
                        existing.max_message_size,
                        existing.max_queue_size,
                        existing.max_buffer_size
                    ),
                ));
            }
            Some(existing) => existing,
            None => {
                let created = Arc::new(Segment::new(config));
                segments.insert(config.segment_name.clone(), Arc::downgrade(&created));
                log::debug!(
                    "[loopback] created segment '{}' ({}B x {})",
                    created.name,
                    created.max_message_size,
                    created.max_queue_size
                );
                created
            }
        };
        drop(segments);

        let id = self.registry.next_session_id.fetch_add(1, Ordering::Relaxed);
        log::debug!("[loopback] session {} attached to '{}'", id, segment.name);
        Ok(LoopbackSession { id, segment })
    }

    fn send(&self, session: &mut LoopbackSession, topic: &str, payload: &[u8]) -> bool {
        let segment = &session.segment;
        if !segment.is_open() {
            log::trace!("[loopback] send on closed segment '{}'", segment.name);
            return false;
        }

        let size = frame::encoded_len(topic, payload);
        if size > segment.max_message_size {
            log::debug!(
                "[loopback] frame of {}B exceeds limit {}B on '{}'",
                size,
                segment.max_message_size,
                segment.name
            );
            return false;
        }
        let encoded = match frame::encode(topic, payload) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::debug!("[loopback] encode failed: {}", e);
                return false;
            }
        };

        let mut queue = segment.queue.lock();
        if queue.len() >= segment.max_queue_size {
            log::trace!("[loopback] segment '{}' full", segment.name);
            return false;
        }
        if queue.bytes + encoded.len() > segment.max_buffer_size {
            log::trace!(
                "[loopback] segment '{}' byte budget exhausted ({}B queued)",
                segment.name,
                queue.bytes
            );
            return false;
        }
        queue.push(encoded);
        true
    }

    fn poll(
        &self,
        session: &mut LoopbackSession,
        topic_capacity: usize,
        payload_capacity: usize,
    ) -> Poll {
        let segment = &session.segment;
        if !segment.is_open() {
            return Poll::Failed(code::SESSION_CLOSED);
        }

        let mut queue = segment.queue.lock();
        let Some(head) = queue.frames.front() else {
            return Poll::Empty;
        };

        // Oversized messages stay queued so the caller can retry with room.
        let delivered = match frame::decode(head) {
            Ok(view) if view.topic.len() > topic_capacity => {
                return Poll::Failed(code::TOPIC_OVERFLOW);
            }
            Ok(view) if view.payload.len() > payload_capacity => {
                return Poll::Failed(code::PAYLOAD_OVERFLOW);
            }
            Ok(view) => Ok((view.topic.to_vec(), view.payload.to_vec())),
            Err(e) => Err(e),
        };
        queue.pop();
        drop(queue);

        match delivered {
            Ok((topic, payload)) => Poll::Delivered { topic, payload },
            // Only `send` writes frames, so this means the queue was damaged.
            Err(e) => {
                log::warn!("[loopback] dropped corrupt frame on '{}': {}", segment.name, e);
                Poll::Failed(code::CORRUPT_FRAME)
            }
        }
    }

    fn close(&self, session: LoopbackSession) {
        let LoopbackSession { id, segment } = session;
        let name = segment.name.clone();
        drop(segment);

        let mut segments = self.registry.segments.lock();
        if segments
            .get(&name)
            .is_some_and(|weak| weak.strong_count() == 0)
        {
            segments.remove(&name);
            log::debug!("[loopback] segment '{}' released", name);
        }
        log::debug!("[loopback] session {} closed", id);
    }
}
