//! # realmlink
//!
//! Client-side engine for a binary, stream-cipher obfuscated game protocol.
//!
//! ## Components
//!
//! - `realmlink-protocol`: primitive codec, framing, RC4 keystreams, the record
//!   catalogue and the kind registry
//! - `realmlink-client`: session driver, transports, event dispatch, movement
//!   reporting and player state
//!
//! ## Example
//!
//! See `demos/relay_bot.rs` for a bot that answers private messages.

pub use realmlink_client as client;
pub use realmlink_protocol as protocol;
