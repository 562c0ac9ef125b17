//! Decoder for `application/vnd.amazon.eventstream` frames.
//!
//! ```text
//! total_len:u32 | headers_len:u32 | prelude_crc:u32 | headers | payload | message_crc:u32
//! ```
//!
//! All integers are big-endian and both checksums are CRC32. Frames arrive
//! split or coalesced across HTTP chunks, so the decoder buffers until a
//! whole frame is available.

use bytes::{Buf, Bytes, BytesMut};
use common::error::{Error, Result};
use faststr::FastStr;

const PRELUDE_LEN: usize = 12;
const CRC_LEN: usize = 4;
const MIN_FRAME_LEN: usize = PRELUDE_LEN + CRC_LEN;
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bytes(Bytes),
    String(FastStr),
    Timestamp(i64),
    Uuid([u8; 16]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub headers: Vec<(FastStr, HeaderValue)>,
    pub payload: Bytes,
}

impl Message {
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|(n, v)| match v {
            HeaderValue::String(s) if n.as_str() == name => Some(s.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
pub struct MessageDecoder {
    buf: BytesMut,
}

impl MessageDecoder {
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Returns the next complete frame, or `None` if more bytes are needed.
    pub fn decode(&mut self) -> Result<Option<Message>> {
        if self.buf.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = be_u32(&self.buf[0..4]) as usize;
        let headers_len = be_u32(&self.buf[4..8]) as usize;
        let prelude_crc = be_u32(&self.buf[8..12]);
        if crc32fast::hash(&self.buf[0..8]) != prelude_crc {
            return Err(invalid("prelude checksum mismatch"));
        }
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&total_len)
            || headers_len > total_len - MIN_FRAME_LEN
        {
            return Err(invalid(format!(
                "invalid frame lengths: total {total_len}, headers {headers_len}"
            )));
        }
        if self.buf.len() < total_len {
            return Ok(None);
        }

        let frame = self.buf.split_to(total_len).freeze();
        let body_end = total_len - CRC_LEN;
        if crc32fast::hash(&frame[..body_end]) != be_u32(&frame[body_end..]) {
            return Err(invalid("message checksum mismatch"));
        }

        let headers_end = PRELUDE_LEN + headers_len;
        let headers = parse_headers(frame.slice(PRELUDE_LEN..headers_end))?;
        let payload = frame.slice(headers_end..body_end);
        Ok(Some(Message { headers, payload }))
    }

    /// Fails if the stream ended in the middle of a frame.
    pub fn finish(&self) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(invalid(format!(
                "stream ended with {} undecoded bytes",
                self.buf.len()
            )))
        }
    }
}

fn parse_headers(mut buf: Bytes) -> Result<Vec<(FastStr, HeaderValue)>> {
    let mut headers = Vec::new();
    while buf.has_remaining() {
        let name_len = take(&mut buf, 1)?.get_u8() as usize;
        let name = utf8(take(&mut buf, name_len)?)?;
        let value = match take(&mut buf, 1)?.get_u8() {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => HeaderValue::Byte(take(&mut buf, 1)?.get_i8()),
            3 => HeaderValue::Int16(take(&mut buf, 2)?.get_i16()),
            4 => HeaderValue::Int32(take(&mut buf, 4)?.get_i32()),
            5 => HeaderValue::Int64(take(&mut buf, 8)?.get_i64()),
            6 => {
                let len = take(&mut buf, 2)?.get_u16() as usize;
                HeaderValue::Bytes(take(&mut buf, len)?)
            }
            7 => {
                let len = take(&mut buf, 2)?.get_u16() as usize;
                HeaderValue::String(utf8(take(&mut buf, len)?)?)
            }
            8 => HeaderValue::Timestamp(take(&mut buf, 8)?.get_i64()),
            9 => {
                let mut uuid = [0u8; 16];
                take(&mut buf, 16)?.copy_to_slice(&mut uuid);
                HeaderValue::Uuid(uuid)
            }
            ty => return Err(invalid(format!("unknown header value type {ty}"))),
        };
        headers.push((name, value));
    }
    Ok(headers)
}

fn take(buf: &mut Bytes, n: usize) -> Result<Bytes> {
    if buf.remaining() < n {
        return Err(invalid("truncated header"));
    }
    Ok(buf.split_to(n))
}

fn utf8(bytes: Bytes) -> Result<FastStr> {
    FastStr::from_bytes(bytes).map_err(|_| invalid("header is not utf-8"))
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn invalid(msg: impl Into<FastStr>) -> Error {
    Error::InvalidEventStream(msg.into())
}

/// Builds one frame with string headers.
#[cfg(test)]
pub(crate) fn encode_frame(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut header_bytes = Vec::new();
    for (name, value) in headers {
        header_bytes.push(name.len() as u8);
        header_bytes.extend_from_slice(name.as_bytes());
        header_bytes.push(7);
        header_bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_bytes.extend_from_slice(value.as_bytes());
    }
    let total_len = MIN_FRAME_LEN + header_bytes.len() + payload.len();

    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&(total_len as u32).to_be_bytes());
    frame.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    let prelude_crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&prelude_crc.to_be_bytes());
    frame.extend_from_slice(&header_bytes);
    frame.extend_from_slice(payload);
    let message_crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&message_crc.to_be_bytes());
    frame
}
