use crate::codec::PacketWriter;
use crate::error::{CodecResult, EnvelopeError, EnvelopeResult as Result};
use crate::message_registry::Record;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the frame header (length prefix + kind byte)
pub const ENVELOPE_HEADER_SIZE: usize = 5;

/// Default upper bound for a single frame
pub const DEFAULT_MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// One framed message
///
/// Wire format (big-endian):
/// ```text
/// ┌─────────┬──────┬─────────────────────────────┐
/// │ length  │ i32  │ payload.len() + 1           │
/// ├─────────┼──────┼─────────────────────────────┤
/// │ kind    │ u8   │ record discriminator        │
/// ├─────────┼──────┼─────────────────────────────┤
/// │ payload │ [u8] │ length - 1 bytes            │
/// └─────────┴──────┴─────────────────────────────┘
/// ```
///
/// The whole frame, length prefix included, goes through the stream cipher.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Record kind
    pub kind: u8,

    /// Encoded record body
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(kind: u8, payload: Bytes) -> Self {
        Self { kind, payload }
    }

    /// Encodes a record into a new envelope
    pub fn from_record<R: Record>(record: &R) -> CodecResult<Self> {
        let mut writer = PacketWriter::new();
        record.encode(&mut writer)?;
        Ok(Self::new(R::KIND, writer.into_bytes()))
    }

    /// Serializes the frame (plaintext)
    pub fn to_bytes(&self) -> Bytes {
        encode_message(self.kind, &self.payload)
    }

    /// Total size on the wire
    #[inline]
    pub fn total_size(&self) -> usize {
        LENGTH_PREFIX_SIZE + 1 + self.payload.len()
    }
}

/// Writes `i32(len(payload) + 1) | kind | payload`
pub fn encode_message(kind: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(ENVELOPE_HEADER_SIZE + payload.len());
    buf.put_i32(payload.len() as i32 + 1);
    buf.put_u8(kind);
    buf.put_slice(payload);
    buf.freeze()
}

/// Tries to cut one message off the front of `buffer`
///
/// Returns `Ok(None)` until the whole frame is buffered, then
/// `(kind, payload, bytes_consumed)`. A length prefix below one or above
/// `max_frame_len` is an error: the stream is no longer aligned.
pub fn try_decode_message(buffer: &[u8], max_frame_len: usize) -> Result<Option<(u8, &[u8], usize)>> {
    if buffer.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let mut header = &buffer[..LENGTH_PREFIX_SIZE];
    let length = header.get_i32();
    if length < 1 {
        return Err(EnvelopeError::InvalidLength(length));
    }

    let length = length as usize;
    if length > max_frame_len {
        return Err(EnvelopeError::FrameTooLarge {
            len: length,
            max: max_frame_len,
        });
    }

    let total = LENGTH_PREFIX_SIZE + length;
    if buffer.len() < total {
        return Ok(None);
    }

    let kind = buffer[LENGTH_PREFIX_SIZE];
    let payload = &buffer[ENVELOPE_HEADER_SIZE..total];
    Ok(Some((kind, payload, total)))
}

/// Accumulates decrypted bytes and yields complete envelopes
///
/// TCP delivers arbitrary chunking; bytes are appended with
/// [`FrameDecoder::extend`] as they arrive and frames are taken out with
/// [`FrameDecoder::next_envelope`] until it returns `None`.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameDecoder {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            max_frame_len,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes waiting for the rest of their frame
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn next_envelope(&mut self) -> Result<Option<Envelope>> {
        let consumed = match try_decode_message(&self.buffer, self.max_frame_len)? {
            Some((_, _, consumed)) => consumed,
            None => return Ok(None),
        };

        let mut frame = self.buffer.split_to(consumed).freeze();
        frame.advance(LENGTH_PREFIX_SIZE);
        let kind = frame.get_u8();
        Ok(Some(Envelope::new(kind, frame)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_message_layout() {
        let bytes = encode_message(8, &[0xAA, 0xBB]);
        assert_eq!(bytes.as_ref(), &[0, 0, 0, 3, 8, 0xAA, 0xBB]);
    }

    #[test]
    fn test_empty_payload() {
        let envelope = Envelope::new(81, Bytes::new());
        let bytes = envelope.to_bytes();
        assert_eq!(bytes.as_ref(), &[0, 0, 0, 1, 81]);
        assert_eq!(envelope.total_size(), ENVELOPE_HEADER_SIZE);

        let (kind, payload, consumed) = try_decode_message(&bytes, DEFAULT_MAX_FRAME_LEN)
            .unwrap()
            .unwrap();
        assert_eq!(kind, 81);
        assert!(payload.is_empty());
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_waits_for_length_prefix() {
        assert_eq!(try_decode_message(&[0, 0, 0], 1024), Ok(None));
    }

    #[test]
    fn test_waits_for_payload() {
        let bytes = encode_message(10, b"abcdef");
        for cut in 0..bytes.len() {
            assert_eq!(try_decode_message(&bytes[..cut], 1024), Ok(None), "cut {cut}");
        }
        assert!(try_decode_message(&bytes, 1024).unwrap().is_some());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert_eq!(
            try_decode_message(&[0, 0, 0, 0, 1], 1024),
            Err(EnvelopeError::InvalidLength(0))
        );
        assert_eq!(
            try_decode_message(&[0xFF, 0xFF, 0xFF, 0xFF], 1024),
            Err(EnvelopeError::InvalidLength(-1))
        );
    }

    #[test]
    fn test_frame_too_large() {
        let bytes = [0x00, 0x10, 0x00, 0x01];
        assert_eq!(
            try_decode_message(&bytes, 1024),
            Err(EnvelopeError::FrameTooLarge { len: 0x0010_0001, max: 1024 })
        );
    }

    #[test]
    fn test_decoder_splits_back_to_back_frames() {
        let mut decoder = FrameDecoder::default();
        let mut stream = encode_message(8, &[0, 0, 0, 1]).to_vec();
        stream.extend_from_slice(&encode_message(44, b"hi"));
        stream.extend_from_slice(&encode_message(42, b"tail")[..3]);
        decoder.extend(&stream);

        let first = decoder.next_envelope().unwrap().unwrap();
        assert_eq!(first.kind, 8);
        assert_eq!(first.payload.as_ref(), &[0, 0, 0, 1]);

        let second = decoder.next_envelope().unwrap().unwrap();
        assert_eq!(second.kind, 44);
        assert_eq!(second.payload.as_ref(), b"hi");

        assert_eq!(decoder.next_envelope().unwrap(), None);
        assert_eq!(decoder.buffered(), 3);
    }
}
