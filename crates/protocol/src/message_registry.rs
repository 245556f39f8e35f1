//! Record trait and kind registry
//!
//! A [`Record`] is a fixed-schema message bound to one kind byte. Records are
//! normally declared with `#[derive(Record)]`, which generates the field by
//! field codec from the struct definition:
//!
//! ```
//! use realmlink_protocol::codec::{PacketReader, PacketWriter};
//! use realmlink_protocol::Record;
//!
//! #[derive(Debug, PartialEq, Record)]
//! #[kind = 31]
//! struct Pong {
//!     serial: i32,
//!     time: i32,
//! }
//!
//! let mut writer = PacketWriter::new();
//! Pong { serial: 9, time: 1200 }.encode(&mut writer).unwrap();
//!
//! let bytes = writer.into_bytes();
//! let decoded = Pong::decode(&mut PacketReader::new(&bytes)).unwrap();
//! assert_eq!(decoded, Pong { serial: 9, time: 1200 });
//! assert_eq!(Pong::KIND, 31);
//! ```
//!
//! The [`RecordRegistry`] maps a kind byte to the decoder of the record the
//! server sends under that kind. Registration is explicit; nothing is
//! discovered at runtime.

use std::collections::HashMap;

use crate::codec::{PacketReader, PacketWriter};
use crate::error::{CodecResult, DecodeError};
use crate::messages::ServerPacket;

/// A message with a one-byte kind and a fixed field layout
pub trait Record: Sized + Send + 'static {
    /// Kind byte on the wire
    const KIND: u8;

    /// Record name, used in logs
    const NAME: &'static str;

    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self>;

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()>;
}

/// A record the server sends, convertible to and from [`ServerPacket`]
pub trait IncomingRecord: Record {
    fn into_packet(self) -> ServerPacket;

    fn from_packet(packet: &ServerPacket) -> Option<&Self>;
}

type DecodeFn = fn(&mut PacketReader<'_>) -> CodecResult<ServerPacket>;

fn decode_as<R: IncomingRecord>(reader: &mut PacketReader<'_>) -> CodecResult<ServerPacket> {
    R::decode(reader).map(R::into_packet)
}

#[derive(Clone, Copy)]
struct RegistryEntry {
    name: &'static str,
    decode: DecodeFn,
}

/// A successfully decoded payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub packet: ServerPacket,

    /// Payload bytes the record layout did not consume
    pub unread: usize,
}

/// Kind byte → decoder table
#[derive(Default, Clone)]
pub struct RecordRegistry {
    entries: HashMap<u8, RegistryEntry>,
}

impl std::fmt::Debug for RecordRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRegistry")
            .field("kinds", &self.entries.len())
            .finish()
    }
}

impl RecordRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers the decoder for `R`
    ///
    /// Registering a second record under the same kind replaces the first
    /// and returns the name of the replaced record.
    pub fn register<R: IncomingRecord>(&mut self) -> Option<&'static str> {
        self.entries
            .insert(
                R::KIND,
                RegistryEntry {
                    name: R::NAME,
                    decode: decode_as::<R>,
                },
            )
            .map(|previous| previous.name)
    }

    pub fn unregister(&mut self, kind: u8) -> bool {
        self.entries.remove(&kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_registered(&self, kind: u8) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Name of the record registered under `kind`
    pub fn name_of(&self, kind: u8) -> Option<&'static str> {
        self.entries.get(&kind).map(|entry| entry.name)
    }

    /// Decodes one payload
    ///
    /// The reader is bounded to `payload`, so a malformed record can never
    /// consume bytes belonging to the next frame.
    pub fn decode(&self, kind: u8, payload: &[u8]) -> Result<DecodedRecord, DecodeError> {
        let entry = self
            .entries
            .get(&kind)
            .ok_or(DecodeError::UnknownKind(kind))?;

        let mut reader = PacketReader::new(payload);
        let packet = (entry.decode)(&mut reader).map_err(|source| DecodeError::Malformed {
            kind,
            name: entry.name,
            source,
        })?;

        Ok(DecodedRecord {
            packet,
            unread: reader.remaining(),
        })
    }
}
