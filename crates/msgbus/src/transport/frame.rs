// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Length-prefixed frame codec used by segment queues.
//!
//! ```text
//! +-------------------+-----------+---------------------+-------------+
//! | topic_len (u32LE) | topic ... | payload_len (u32LE) | payload ... |
//! +-------------------+-----------+---------------------+-------------+
//! ```

use std::fmt;

/// Bytes spent on the two length prefixes.
pub const FRAME_OVERHEAD: usize = 8;

/// Decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer ended before the declared length.
    Truncated,
    /// Bytes left over after the payload.
    TrailingBytes(usize),
    /// Field longer than a u32 prefix can express.
    TooLarge,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated => write!(f, "frame truncated"),
            FrameError::TrailingBytes(n) => write!(f, "{} trailing bytes after frame", n),
            FrameError::TooLarge => write!(f, "field exceeds u32 length prefix"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Borrowed view of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    /// Raw topic bytes (not yet UTF-8 checked).
    pub topic: &'a [u8],
    /// Payload bytes.
    pub payload: &'a [u8],
}

/// Size of the encoded frame for `topic` and `payload`.
pub fn encoded_len(topic: &str, payload: &[u8]) -> usize {
    FRAME_OVERHEAD + topic.len() + payload.len()
}

/// Encode a frame.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if either field does not fit a u32 prefix.
pub fn encode(topic: &str, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let topic_len = u32::try_from(topic.len()).map_err(|_| FrameError::TooLarge)?;
    let payload_len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge)?;

    let mut out = Vec::with_capacity(encoded_len(topic, payload));
    out.extend_from_slice(&topic_len.to_le_bytes());
    out.extend_from_slice(topic.as_bytes());
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode a frame without copying.
///
/// # Errors
///
/// Returns [`FrameError::Truncated`] if a prefix or field runs past the end
/// of `data`, and [`FrameError::TrailingBytes`] if bytes remain afterwards.
pub fn decode(data: &[u8]) -> Result<FrameRef<'_>, FrameError> {
    let (topic, rest) = read_field(data)?;
    let (payload, rest) = read_field(rest)?;
    if !rest.is_empty() {
        return Err(FrameError::TrailingBytes(rest.len()));
    }
    Ok(FrameRef { topic, payload })
}

fn read_field(data: &[u8]) -> Result<(&[u8], &[u8]), FrameError> {
    let Some((prefix, rest)) = data.split_first_chunk::<4>() else {
        return Err(FrameError::Truncated);
    };
    let len = u32::from_le_bytes(*prefix) as usize;
    if rest.len() < len {
        return Err(FrameError::Truncated);
    }
    Ok(rest.split_at(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let frame = encode("ab", &[7, 8, 9]).unwrap();
        assert_eq!(
            frame,
            vec![2, 0, 0, 0, b'a', b'b', 3, 0, 0, 0, 7, 8, 9]
        );
        assert_eq!(frame.len(), encoded_len("ab", &[7, 8, 9]));
    }

    #[test]
    fn test_decode_borrowed() {
        let frame = encode("alerts", &[1, 2, 3]).unwrap();
        let view = decode(&frame).unwrap();
        assert_eq!(view.topic, b"alerts");
        assert_eq!(view.payload, &[1, 2, 3]);
    }

    #[test]
    fn test_decode_empty_payload() {
        let frame = encode("t", &[]).unwrap();
        let view = decode(&frame).unwrap();
        assert!(view.payload.is_empty());
    }

    #[test]
    fn test_decode_truncated_prefix() {
        assert_eq!(decode(&[1, 0]), Err(FrameError::Truncated));
    }

    #[test]
    fn test_decode_truncated_field() {
        let mut frame = encode("topic", &[1, 2, 3, 4]).unwrap();
        frame.pop();
        assert_eq!(decode(&frame), Err(FrameError::Truncated));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut frame = encode("topic", &[1]).unwrap();
        frame.extend_from_slice(&[0, 0]);
        assert_eq!(decode(&frame), Err(FrameError::TrailingBytes(2)));
    }
}
