//! Primitive binary codec
//!
//! All multi-byte scalars are big-endian. Strings are UTF-8 behind a length
//! prefix (`i16` by default, `i32` for the long variant). The protocol also
//! uses a variable-length signed integer, the *compressed integer*:
//!
//! ```text
//! first byte:  [cont | sign | m5 m4 m3 m2 m1 m0]
//! next bytes:  [cont | m6 .. m0]                   (least significant chunk first)
//! ```
//!
//! Every read checks the remaining length first and fails with
//! [`CodecError::UnexpectedEndOfData`]; nothing here panics on short input.
//!
//! # Example
//!
//! ```
//! use realmlink_protocol::codec::{PacketReader, PacketWriter};
//!
//! let mut writer = PacketWriter::new();
//! writer.write_i32(-2);
//! writer.write_string("rotmg").unwrap();
//! writer.write_compressed_int(8191);
//!
//! let bytes = writer.into_bytes();
//! let mut reader = PacketReader::new(&bytes);
//! assert_eq!(reader.read_i32().unwrap(), -2);
//! assert_eq!(reader.read_string().unwrap(), "rotmg");
//! assert_eq!(reader.read_compressed_int().unwrap(), 8191);
//! assert_eq!(reader.remaining(), 0);
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CodecError, CodecResult};

/// Length prefix used in front of strings, byte runs and lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    U8,
    U16,
    I16,
    I32,
    /// Compressed integer
    Compressed,
}

impl LengthPrefix {
    fn name(self) -> &'static str {
        match self {
            LengthPrefix::U8 => "u8",
            LengthPrefix::U16 => "u16",
            LengthPrefix::I16 => "i16",
            LengthPrefix::I32 => "i32",
            LengthPrefix::Compressed => "compressed",
        }
    }

    fn max_len(self) -> usize {
        match self {
            LengthPrefix::U8 => u8::MAX as usize,
            LengthPrefix::U16 => u16::MAX as usize,
            LengthPrefix::I16 => i16::MAX as usize,
            LengthPrefix::I32 | LengthPrefix::Compressed => i32::MAX as usize,
        }
    }
}

/// Cursor over one payload
///
/// The reader is bounded to the slice it was built from, so a record can
/// never read into the next frame.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes left in this payload
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    fn ensure(&self, need: usize) -> CodecResult<()> {
        if self.buf.len() < need {
            return Err(CodecError::UnexpectedEndOfData {
                need,
                have: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i8(&mut self) -> CodecResult<i8> {
        self.ensure(1)?;
        Ok(self.buf.get_i8())
    }

    /// Reads a boolean; any non-zero byte is `true`
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> CodecResult<i16> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    /// Reads a compressed integer
    pub fn read_compressed_int(&mut self) -> CodecResult<i32> {
        let first = self.read_u8()?;
        let negative = first & 0x40 != 0;
        let mut magnitude = u64::from(first & 0x3F);
        let mut shift = 6;
        let mut more = first & 0x80 != 0;

        while more {
            // 6 + 4 * 7 bits already covers the full 32-bit range
            if shift > 27 {
                return Err(CodecError::CompressedIntOverflow);
            }
            let byte = self.read_u8()?;
            magnitude |= u64::from(byte & 0x7F) << shift;
            shift += 7;
            more = byte & 0x80 != 0;
        }

        let value = if negative {
            -(magnitude as i64)
        } else {
            magnitude as i64
        };
        i32::try_from(value).map_err(|_| CodecError::CompressedIntOverflow)
    }

    /// Reads a length prefix and validates it against the bytes left
    ///
    /// A list of `n` elements needs at least `n` bytes for any element type
    /// the protocol uses, so a count larger than the remaining payload is
    /// rejected before anything is allocated.
    pub fn read_length(&mut self, prefix: LengthPrefix) -> CodecResult<usize> {
        let raw: i64 = match prefix {
            LengthPrefix::U8 => self.read_u8()?.into(),
            LengthPrefix::U16 => self.read_u16()?.into(),
            LengthPrefix::I16 => self.read_i16()?.into(),
            LengthPrefix::I32 => self.read_i32()?.into(),
            LengthPrefix::Compressed => self.read_compressed_int()?.into(),
        };
        if raw < 0 {
            return Err(CodecError::InvalidLength(raw));
        }
        let len = raw as usize;
        if len > self.buf.len() {
            return Err(CodecError::UnexpectedEndOfData {
                need: len,
                have: self.buf.len(),
            });
        }
        Ok(len)
    }

    /// Reads exactly `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        self.ensure(count)?;
        let (head, tail) = self.buf.split_at(count);
        self.buf = tail;
        Ok(head)
    }

    /// Consumes everything left in the payload
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }

    /// Reads a string behind an `i16` length prefix
    pub fn read_string(&mut self) -> CodecResult<String> {
        self.read_string_prefixed(LengthPrefix::I16)
    }

    /// Reads a string behind an `i32` length prefix
    pub fn read_utf32_string(&mut self) -> CodecResult<String> {
        self.read_string_prefixed(LengthPrefix::I32)
    }

    /// Reads a string behind the given length prefix
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected; text fields
    /// are informational and a stray byte must not cost the whole record.
    pub fn read_string_prefixed(&mut self, prefix: LengthPrefix) -> CodecResult<String> {
        let len = self.read_length(prefix)?;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Growable output buffer for one payload
#[derive(Debug, Default, Clone)]
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    pub fn write_compressed_int(&mut self, value: i32) {
        let mut magnitude = i64::from(value).unsigned_abs();
        let mut byte = (magnitude & 0x3F) as u8;
        if value < 0 {
            byte |= 0x40;
        }
        magnitude >>= 6;
        if magnitude > 0 {
            byte |= 0x80;
        }
        self.buf.put_u8(byte);

        while magnitude > 0 {
            let mut byte = (magnitude & 0x7F) as u8;
            magnitude >>= 7;
            if magnitude > 0 {
                byte |= 0x80;
            }
            self.buf.put_u8(byte);
        }
    }

    pub fn write_length(&mut self, prefix: LengthPrefix, len: usize) -> CodecResult<()> {
        if len > prefix.max_len() {
            return Err(CodecError::LengthOverflow {
                len,
                prefix: prefix.name(),
            });
        }
        match prefix {
            LengthPrefix::U8 => self.write_u8(len as u8),
            LengthPrefix::U16 => self.write_u16(len as u16),
            LengthPrefix::I16 => self.write_i16(len as i16),
            LengthPrefix::I32 => self.write_i32(len as i32),
            LengthPrefix::Compressed => self.write_compressed_int(len as i32),
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        self.write_string_prefixed(LengthPrefix::I16, value)
    }

    pub fn write_utf32_string(&mut self, value: &str) -> CodecResult<()> {
        self.write_string_prefixed(LengthPrefix::I32, value)
    }

    pub fn write_string_prefixed(&mut self, prefix: LengthPrefix, value: &str) -> CodecResult<()> {
        self.write_length(prefix, value.len())?;
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }
}

/// A value with a fixed wire layout
///
/// Implemented for the scalars, `String` (i16 prefix), `Vec<T>` (i16 count)
/// and every data object. Records derive it field by field through
/// `#[derive(Wire)]`.
pub trait Wire: Sized {
    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self>;

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()>;
}

macro_rules! impl_wire_scalar {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl Wire for $ty {
                #[inline]
                fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
                    reader.$read()
                }

                #[inline]
                fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
                    writer.$write(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_wire_scalar! {
    u8 => read_u8, write_u8;
    i8 => read_i8, write_i8;
    bool => read_bool, write_bool;
    i16 => read_i16, write_i16;
    u16 => read_u16, write_u16;
    i32 => read_i32, write_i32;
    u32 => read_u32, write_u32;
    f32 => read_f32, write_f32;
}

impl Wire for String {
    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        reader.read_string()
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_string(self)
    }
}

impl<T: Wire> Wire for Vec<T> {
    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        let len = reader.read_length(LengthPrefix::I16)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_length(LengthPrefix::I16, self.len())?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressed_bytes(value: i32) -> Vec<u8> {
        let mut writer = PacketWriter::new();
        writer.write_compressed_int(value);
        writer.into_bytes().to_vec()
    }

    #[test]
    fn test_compressed_int_round_trip_edges() {
        for value in [0, 1, -1, 63, 64, -64, 8191, i32::MIN, i32::MAX] {
            let bytes = compressed_bytes(value);
            let mut reader = PacketReader::new(&bytes);
            assert_eq!(reader.read_compressed_int().unwrap(), value, "value {value}");
            assert!(reader.is_empty(), "value {value} left bytes behind");
        }
    }

    #[test]
    fn test_compressed_int_layout() {
        assert_eq!(compressed_bytes(0), vec![0x00]);
        assert_eq!(compressed_bytes(63), vec![0x3F]);
        assert_eq!(compressed_bytes(-1), vec![0x41]);
        // 64 spills into a second byte: low six bits zero, continuation set
        assert_eq!(compressed_bytes(64), vec![0x80, 0x01]);
        assert_eq!(compressed_bytes(-64), vec![0xC0, 0x01]);
        assert_eq!(compressed_bytes(i32::MIN).len(), 5);
    }

    #[test]
    fn test_compressed_int_overflow_rejected() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(
            reader.read_compressed_int(),
            Err(CodecError::CompressedIntOverflow)
        );

        // 2^31 without the sign flag is out of range
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x10];
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(
            reader.read_compressed_int(),
            Err(CodecError::CompressedIntOverflow)
        );
    }

    #[test]
    fn test_compressed_int_truncated() {
        let bytes = [0x80];
        let mut reader = PacketReader::new(&bytes);
        assert!(matches!(
            reader.read_compressed_int(),
            Err(CodecError::UnexpectedEndOfData { .. })
        ));
    }

    #[test]
    fn test_scalars_are_big_endian() {
        let mut writer = PacketWriter::new();
        writer.write_i32(0x0102_0304);
        writer.write_u16(0xABCD);
        writer.write_f32(1.5);
        writer.write_bool(true);
        assert_eq!(
            writer.as_slice(),
            &[0x01, 0x02, 0x03, 0x04, 0xAB, 0xCD, 0x3F, 0xC0, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn test_short_reads_never_panic() {
        let bytes = [0x01, 0x02, 0x03];
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(
            reader.read_i32(),
            Err(CodecError::UnexpectedEndOfData { need: 4, have: 3 })
        );
        // Failed read leaves the cursor untouched
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert!(reader.read_u16().is_err());
        assert!(reader.read_f32().is_err());
        assert!(reader.read_bytes(2).is_err());
        assert_eq!(reader.read_u8().unwrap(), 0x03);
        assert!(reader.read_bool().is_err());
    }

    #[test]
    fn test_string_prefixes() {
        let mut writer = PacketWriter::new();
        writer.write_string("héllo").unwrap();
        writer.write_utf32_string("long").unwrap();
        let bytes = writer.into_bytes();

        assert_eq!(&bytes[..2], &[0x00, 0x06]);
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "héllo");
        assert_eq!(reader.read_utf32_string().unwrap(), "long");
    }

    #[test]
    fn test_string_length_beyond_payload() {
        let bytes = [0x00, 0x10, b'a', b'b'];
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(
            reader.read_string(),
            Err(CodecError::UnexpectedEndOfData { need: 16, have: 2 })
        );
    }

    #[test]
    fn test_negative_length_rejected() {
        let bytes = [0xFF, 0xFF];
        let mut reader = PacketReader::new(&bytes);
        assert_eq!(reader.read_string(), Err(CodecError::InvalidLength(-1)));
    }

    #[test]
    fn test_string_too_long_for_prefix() {
        let long = "x".repeat(i16::MAX as usize + 1);
        let mut writer = PacketWriter::new();
        assert!(matches!(
            writer.write_string(&long),
            Err(CodecError::LengthOverflow { prefix: "i16", .. })
        ));
        assert!(writer.write_utf32_string(&long).is_ok());
    }

    #[test]
    fn test_vec_wire_uses_i16_count() {
        let values: Vec<i32> = vec![7, -7];
        let mut writer = PacketWriter::new();
        values.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 2 + 8);

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(Vec::<i32>::decode(&mut reader).unwrap(), values);
    }

    #[test]
    fn test_read_remaining() {
        let bytes = [1, 2, 3, 4];
        let mut reader = PacketReader::new(&bytes);
        reader.read_u8().unwrap();
        assert_eq!(reader.read_remaining(), &[2, 3, 4]);
        assert_eq!(reader.remaining(), 0);
    }
}
