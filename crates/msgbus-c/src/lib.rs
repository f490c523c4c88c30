// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! # msgbus C FFI Bindings
//!
//! C-compatible surface over [`msgbus::Client`]. A handle wraps one client
//! on the process-wide loopback transport and may be shared between threads;
//! every call is serialized by the client's own lock.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod logging;

pub use logging::*;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};

use msgbus::{code, Client, Config, Error, Received};

/// Opaque handle to a client.
#[repr(C)]
pub struct MsgbusClient {
    _private: [u8; 0],
}

/// Client settings. Zero or NULL fields take the library default.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsgbusConfig {
    /// NUL-terminated segment name, or NULL for `"msgbus"`.
    pub segment_name: *const c_char,
    /// Maximum encoded frame size in bytes, or 0 for the default.
    pub max_message_size: usize,
    /// Queue depth in frames, or 0 for the default.
    pub max_queue_size: usize,
    /// Byte budget for all queued frames, or 0 for the default.
    pub max_buffer_size: usize,
}

/// Outcome of [`msgbus_client_receive`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgbusReceiveStatus {
    /// A message was written to the caller's buffers.
    MsgbusReceiveOk = 0,
    /// Nothing was pending.
    MsgbusReceiveNoMessage = 1,
    /// The transport reported a fault; see [`msgbus_client_last_receive_error`].
    MsgbusReceiveError = 2,
    /// NULL handle, NULL buffer, or zero topic capacity.
    MsgbusReceiveInvalidArgument = 3,
    /// The client was released.
    MsgbusReceiveReleased = 4,
}

/// What a handle points at.
struct FfiClient {
    client: Client,
    last_receive_error: AtomicI32,
}

impl FfiClient {
    fn new(client: Client) -> Self {
        Self {
            client,
            last_receive_error: AtomicI32::new(0),
        }
    }
}

unsafe fn config_from_c(config: *const MsgbusConfig) -> Option<Config> {
    let mut out = Config::default();
    if config.is_null() {
        return Some(out);
    }
    let raw = &*config;

    if !raw.segment_name.is_null() {
        let name = CStr::from_ptr(raw.segment_name).to_str().ok()?;
        out = out.with_segment_name(name);
    }
    if raw.max_message_size != 0 {
        out = out.with_max_message_size(raw.max_message_size);
    }
    if raw.max_queue_size != 0 {
        out = out.with_max_queue_size(raw.max_queue_size);
    }
    if raw.max_buffer_size != 0 {
        out = out.with_max_buffer_size(raw.max_buffer_size);
    }
    Some(out)
}

/// Create a client and open its session.
///
/// # Safety
/// - `config` must be NULL or point to a valid `MsgbusConfig`.
/// - `config->segment_name` must be NULL or a valid NUL-terminated C string.
///
/// # Returns
/// A handle to pass to the other `msgbus_client_*` functions, or NULL if the
/// config is malformed or the session could not be opened.
///
/// # Example (C)
/// ```c
/// MsgbusClient *client = msgbus_client_create(NULL);
/// ```
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_create(config: *const MsgbusConfig) -> *mut MsgbusClient {
    let Some(config) = config_from_c(config) else {
        log::warn!("msgbus_client_create: segment name is not valid UTF-8");
        return ptr::null_mut();
    };

    match Client::connect(config) {
        Ok(client) => Box::into_raw(Box::new(FfiClient::new(client))).cast::<MsgbusClient>(),
        Err(e) => {
            log::warn!("msgbus_client_create failed: {}", e);
            ptr::null_mut()
        }
    }
}

/// Publish `len` bytes from `payload` on `topic`.
///
/// # Safety
/// - `client` must be a valid handle from `msgbus_client_create`.
/// - `topic` must be a valid NUL-terminated C string.
/// - `payload` must point to at least `len` readable bytes; it may be NULL
///   only when `len` is 0.
///
/// # Returns
/// `true` if the transport accepted the message. `false` on rejection, on
/// invalid arguments, or after the client was released.
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_send(
    client: *mut MsgbusClient,
    topic: *const c_char,
    payload: *const u8,
    len: usize,
) -> bool {
    if client.is_null() || topic.is_null() || (payload.is_null() && len != 0) {
        return false;
    }
    let Ok(topic) = CStr::from_ptr(topic).to_str() else {
        return false;
    };
    let payload = if len == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(payload, len)
    };

    let handle = &*client.cast::<FfiClient>();
    match handle.client.send(topic, payload) {
        Ok(accepted) => accepted,
        Err(e) => {
            log::debug!("msgbus_client_send: {}", e);
            false
        }
    }
}

/// Take the next pending message without blocking.
///
/// The topic is written NUL-terminated, so `topic_cap` must leave room for
/// the terminator; topics never contain interior NUL bytes. The payload is
/// written without a terminator and its length stored in `out_len`. A message that does not fit either buffer stays
/// queued and the call returns `MSGBUS_RECEIVE_ERROR` with an overflow code.
///
/// # Safety
/// - `client` must be a valid handle from `msgbus_client_create`.
/// - `topic_buf` must point to at least `topic_cap` writable bytes.
/// - `payload_buf` must point to at least `payload_cap` writable bytes; it
///   may be NULL only when `payload_cap` is 0.
/// - `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_receive(
    client: *mut MsgbusClient,
    topic_buf: *mut c_char,
    topic_cap: usize,
    payload_buf: *mut u8,
    payload_cap: usize,
    out_len: *mut usize,
) -> MsgbusReceiveStatus {
    if client.is_null()
        || topic_buf.is_null()
        || topic_cap == 0
        || (payload_buf.is_null() && payload_cap != 0)
        || out_len.is_null()
    {
        return MsgbusReceiveStatus::MsgbusReceiveInvalidArgument;
    }
    *out_len = 0;

    let handle = &*client.cast::<FfiClient>();
    match handle.client.receive(topic_cap - 1, payload_cap) {
        Ok(Received::Message(msg)) => {
            let (topic, payload) = msg.into_parts();
            ptr::copy_nonoverlapping(topic.as_ptr(), topic_buf.cast::<u8>(), topic.len());
            *topic_buf.add(topic.len()) = 0;
            if !payload.is_empty() {
                ptr::copy_nonoverlapping(payload.as_ptr(), payload_buf, payload.len());
            }
            *out_len = payload.len();
            MsgbusReceiveStatus::MsgbusReceiveOk
        }
        Ok(Received::NoMessage) => MsgbusReceiveStatus::MsgbusReceiveNoMessage,
        Ok(Received::Error(e)) => {
            handle.last_receive_error.store(e.code(), Ordering::Relaxed);
            MsgbusReceiveStatus::MsgbusReceiveError
        }
        Err(Error::UseAfterRelease) => MsgbusReceiveStatus::MsgbusReceiveReleased,
        Err(e) => {
            log::warn!("msgbus_client_receive: {}", e);
            handle
                .last_receive_error
                .store(code::UNSPECIFIED, Ordering::Relaxed);
            MsgbusReceiveStatus::MsgbusReceiveError
        }
    }
}

/// Code of the most recent `MSGBUS_RECEIVE_ERROR` on this handle, or 0 if
/// none occurred. Codes are always negative.
///
/// # Safety
/// - `client` must be a valid handle from `msgbus_client_create`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_last_receive_error(client: *const MsgbusClient) -> i32 {
    if client.is_null() {
        return 0;
    }
    let handle = &*client.cast::<FfiClient>();
    handle.last_receive_error.load(Ordering::Relaxed)
}

/// Close the client's session. Safe to call more than once; the handle stays
/// valid until `msgbus_client_destroy`.
///
/// # Safety
/// - `client` must be a valid handle from `msgbus_client_create`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_release(client: *mut MsgbusClient) {
    if !client.is_null() {
        let handle = &*client.cast::<FfiClient>();
        handle.client.release();
    }
}

/// Free a client handle, releasing it first if needed.
///
/// # Safety
/// - `client` must be a valid handle from `msgbus_client_create`, or NULL.
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn msgbus_client_destroy(client: *mut MsgbusClient) {
    if !client.is_null() {
        let _ = Box::from_raw(client.cast::<FfiClient>());
    }
}

/// Library version string.
///
/// # Safety
/// The returned pointer is valid for the lifetime of the process (static storage).
#[no_mangle]
pub unsafe extern "C" fn msgbus_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}
