use thiserror::Error;

use crate::state::ConnectionState;

/// Errors raised by the primitive codec while reading or writing a payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Unexpected end of data: need {need} bytes, have {have}")]
    UnexpectedEndOfData { need: usize, have: usize },

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i64),

    #[error("Length {len} does not fit a {prefix} length prefix")]
    LengthOverflow { len: usize, prefix: &'static str },

    #[error("Compressed integer does not fit in 32 bits")]
    CompressedIntOverflow,

    /// A trailing field holds a value after an earlier trailing field was absent
    #[error("Trailing field {field} is set after an absent one")]
    TrailingGap { field: &'static str },
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors raised while cutting frames out of the inbound byte stream.
///
/// Both variants mean the stream can no longer be trusted: a garbage length
/// prefix is the usual symptom of a desynchronised keystream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("Invalid frame length: {0}")]
    InvalidLength(i32),

    #[error("Frame too large: {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },
}

pub type EnvelopeResult<T> = std::result::Result<T, EnvelopeError>;

/// Errors raised while turning a frame into a typed record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("No decoder registered for kind {0}")]
    UnknownKind(u8),

    #[error("Malformed {name} (kind {kind}): {source}")]
    Malformed {
        kind: u8,
        name: &'static str,
        #[source]
        source: CodecError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
