//! # realmlink protocol
//!
//! Wire-level building blocks for the game protocol:
//! - [`codec`]: big-endian scalars, prefixed strings, compressed integers
//! - [`envelope`]: `i32 length | u8 kind | payload` framing over a byte stream
//! - [`cipher`]: the per-direction RC4 keystreams wrapping every frame
//! - [`messages`]: the kind table and the full record catalogue
//! - [`message_registry`]: the [`Record`] trait and the kind → decoder table
//! - [`failure`]: interpretation of server failure codes
//! - [`state`]: the session state machine
//! - [`transport`]: the seam between the session loop and a live connection
//!
//! ## Example
//!
//! ```
//! use realmlink_protocol::cipher::{CipherKey, CipherPair};
//! use realmlink_protocol::envelope::FrameDecoder;
//! use realmlink_protocol::messages::{incoming, ServerPacket};
//! use realmlink_protocol::{Envelope, RecordRegistry};
//!
//! let key = CipherKey::new([1; 13]);
//! let mut server = CipherPair::rc4(&key, &key);
//! let mut client = CipherPair::rc4(&key, &key);
//!
//! // Server side: encode, frame, encrypt
//! let envelope = Envelope::from_record(&incoming::Ping { serial: 42 }).unwrap();
//! let mut wire = envelope.to_bytes().to_vec();
//! server.encrypt(&mut wire);
//!
//! // Client side: decrypt, deframe, decode
//! client.decrypt(&mut wire);
//! let mut decoder = FrameDecoder::default();
//! decoder.extend(&wire);
//! let received = decoder.next_envelope().unwrap().unwrap();
//!
//! let registry = RecordRegistry::with_server_records();
//! let decoded = registry.decode(received.kind, &received.payload).unwrap();
//! assert_eq!(decoded.packet, ServerPacket::Ping(incoming::Ping { serial: 42 }));
//! ```

extern crate self as realmlink_protocol;

pub mod cipher;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod failure;
pub mod message_registry;
pub mod messages;
pub mod state;
pub mod transport;

pub use cipher::{CipherKey, CipherPair};
pub use codec::{PacketReader, PacketWriter, Wire};
pub use envelope::{Envelope, FrameDecoder, DEFAULT_MAX_FRAME_LEN, ENVELOPE_HEADER_SIZE};
pub use error::{CodecError, DecodeError, EnvelopeError, ProtocolError, Result};
pub use failure::{FailureAction, FailureCode};
pub use message_registry::{DecodedRecord, IncomingRecord, Record, RecordRegistry};
pub use messages::ServerPacket;
pub use realmlink_protocol_derive::{Record, Wire};
pub use state::ConnectionState;
pub use transport::{Endpoint, Transport};
