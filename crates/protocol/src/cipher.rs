//! Stream cipher layer
//!
//! Each direction of a session owns one keystream. Every byte that crosses
//! the socket, frame header included, is XORed against the next keystream
//! byte of its direction, so the cursor of a direction only ever moves
//! forward by exactly the number of bytes passed through it.
//!
//! There is no resynchronisation primitive. A dropped or replayed byte on
//! either side garbles everything after it; the session layer treats that as
//! fatal and reconnects with fresh contexts.
//!
//! ## Example
//!
//! ```
//! use realmlink_protocol::cipher::{CipherKey, Keystream, Rc4Keystream};
//!
//! let key = CipherKey::new([7; 13]);
//! let mut sender = Rc4Keystream::new(&key);
//! let mut receiver = Rc4Keystream::new(&key);
//!
//! let mut data = *b"position report";
//! sender.apply(&mut data);
//! assert_ne!(&data, b"position report");
//!
//! receiver.apply(&mut data);
//! assert_eq!(&data, b"position report");
//! ```

use rc4::{consts::U13, Key, KeyInit, Rc4, StreamCipher};
use serde::{Deserialize, Serialize};

/// Length of the handshake keys
pub const KEY_LEN: usize = 13;

/// Default key for traffic received from the server
pub const DEFAULT_INBOUND_KEY: CipherKey = CipherKey([
    0xc9, 0x1d, 0x9e, 0xec, 0x42, 0x01, 0x60, 0x73, 0x0d, 0x82, 0x56, 0x04, 0xe0,
]);

/// Default key for traffic sent to the server
pub const DEFAULT_OUTBOUND_KEY: CipherKey = CipherKey([
    0x5a, 0x4d, 0x20, 0x16, 0xbc, 0x16, 0xdc, 0x64, 0x88, 0x31, 0x94, 0xff, 0xd9,
]);

/// Key material for one direction
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey(<redacted>)")
    }
}

/// Cipher identifier, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherType {
    /// Bytes pass through unchanged
    Plaintext,
    Rc4,
}

impl CipherType {
    pub fn name(&self) -> &'static str {
        match self {
            CipherType::Plaintext => "plaintext",
            CipherType::Rc4 => "RC4",
        }
    }
}

/// One direction's keystream
///
/// `apply` both encrypts and decrypts; the operation is a plain XOR.
pub trait Keystream: Send {
    /// XORs `data` in place and advances the cursor by `data.len()`
    fn apply(&mut self, data: &mut [u8]);

    fn cipher_type(&self) -> CipherType;
}

/// Identity keystream for local test servers
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextKeystream;

impl Keystream for PlaintextKeystream {
    fn apply(&mut self, _data: &mut [u8]) {}

    fn cipher_type(&self) -> CipherType {
        CipherType::Plaintext
    }
}

/// RC4 keystream seeded from a 13-byte key
pub struct Rc4Keystream {
    cipher: Rc4<U13>,
    processed: u64,
}

impl std::fmt::Debug for Rc4Keystream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rc4Keystream")
            .field("cipher", &"<redacted>")
            .field("processed", &self.processed)
            .finish()
    }
}

impl Rc4Keystream {
    pub fn new(key: &CipherKey) -> Self {
        Self {
            cipher: Rc4::new(Key::<U13>::from_slice(key.as_bytes())),
            processed: 0,
        }
    }

    /// Keystream bytes consumed so far
    #[inline]
    pub fn position(&self) -> u64 {
        self.processed
    }
}

impl Keystream for Rc4Keystream {
    fn apply(&mut self, data: &mut [u8]) {
        self.cipher.apply_keystream(data);
        self.processed += data.len() as u64;
    }

    fn cipher_type(&self) -> CipherType {
        CipherType::Rc4
    }
}

/// The two keystreams of a session
///
/// Built once per connection and dropped with it.
pub struct CipherPair {
    inbound: Box<dyn Keystream>,
    outbound: Box<dyn Keystream>,
}

impl std::fmt::Debug for CipherPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherPair")
            .field("inbound", &self.inbound.cipher_type())
            .field("outbound", &self.outbound.cipher_type())
            .finish()
    }
}

impl CipherPair {
    pub fn new(inbound: Box<dyn Keystream>, outbound: Box<dyn Keystream>) -> Self {
        Self { inbound, outbound }
    }

    /// RC4 in both directions
    pub fn rc4(inbound: &CipherKey, outbound: &CipherKey) -> Self {
        Self::new(
            Box::new(Rc4Keystream::new(inbound)),
            Box::new(Rc4Keystream::new(outbound)),
        )
    }

    pub fn plaintext() -> Self {
        Self::new(Box::new(PlaintextKeystream), Box::new(PlaintextKeystream))
    }

    /// Decrypts bytes read from the socket
    pub fn decrypt(&mut self, data: &mut [u8]) {
        self.inbound.apply(data);
    }

    /// Encrypts bytes about to be written to the socket
    pub fn encrypt(&mut self, data: &mut [u8]) {
        self.outbound.apply(data);
    }

    pub fn cipher_type(&self) -> CipherType {
        self.outbound.cipher_type()
    }

    /// Splits into `(inbound, outbound)` so each direction can be driven by its own task
    pub fn into_parts(self) -> (Box<dyn Keystream>, Box<dyn Keystream>) {
        (self.inbound, self.outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc4_is_deterministic() {
        let mut first = Rc4Keystream::new(&DEFAULT_OUTBOUND_KEY);
        let mut second = Rc4Keystream::new(&DEFAULT_OUTBOUND_KEY);
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        first.apply(&mut a);
        second.apply(&mut b);
        assert_eq!(a, b);
        assert_ne!(a, [0u8; 16]);
    }

    #[test]
    fn test_directions_are_independent() {
        let mut pair = CipherPair::rc4(&DEFAULT_INBOUND_KEY, &DEFAULT_OUTBOUND_KEY);
        let mut inbound = [0u8; 8];
        let mut outbound = [0u8; 8];
        pair.decrypt(&mut inbound);
        pair.encrypt(&mut outbound);
        assert_ne!(inbound, outbound);
    }

    #[test]
    fn test_chunked_equals_whole() {
        let key = CipherKey::new([0x42; KEY_LEN]);
        let data: Vec<u8> = (0..=255).collect();

        let mut whole = data.clone();
        Rc4Keystream::new(&key).apply(&mut whole);

        let mut chunked = data.clone();
        let mut stream = Rc4Keystream::new(&key);
        let (head, tail) = chunked.split_at_mut(37);
        stream.apply(head);
        stream.apply(tail);

        assert_eq!(whole, chunked);
        assert_eq!(stream.position(), 256);
    }

    #[test]
    fn test_plaintext_is_identity() {
        let mut pair = CipherPair::plaintext();
        let mut data = *b"abc";
        pair.encrypt(&mut data);
        pair.decrypt(&mut data);
        assert_eq!(&data, b"abc");
        assert_eq!(pair.cipher_type(), CipherType::Plaintext);
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let rendered = format!("{:?}", DEFAULT_INBOUND_KEY);
        assert!(!rendered.contains("c9"));
        assert!(rendered.contains("redacted"));
    }
}
