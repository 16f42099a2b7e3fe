use thiserror::Error;

use crate::digest::{BoxId, TokenId};

/// Result type for box and transaction codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Broad failure class of a [`CodecError`]
///
/// Lets callers tell malformed bytes apart from a malformed call without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer bytes were available than the format requires
    Underflow,
    /// The call itself was invalid for the value passed in
    Shape,
    /// Encoder data and the token table disagree
    Integrity,
    /// Bytes were present but do not form a valid encoding
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Underflow => write!(f, "underflow"),
            ErrorKind::Shape => write!(f, "shape violation"),
            ErrorKind::Integrity => write!(f, "integrity violation"),
            ErrorKind::Malformed => write!(f, "malformed input"),
        }
    }
}

/// Error types for box and transaction serialization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input ended before a field could be read
    #[error("Unexpected end of input reading {field}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// Variable-length integer does not fit in 64 bits
    #[error("VLQ overflow reading {field}")]
    VlqOverflow { field: &'static str },

    /// Decoded integer exceeds the range of its field
    #[error("Value {value} out of range for {field}")]
    OutOfRange { field: &'static str, value: u64 },

    /// A box candidate was serialized where a full box is required
    #[error("Invalid box shape: {0}")]
    ShapeViolation(String),

    /// Reduced inputs do not line up with the transaction inputs
    #[error("Reduced input count mismatch: expected {expected}, got {actual}")]
    ReducedInputCountMismatch { expected: usize, actual: usize },

    /// An unsigned input carried spending proof bytes
    #[error("Unsigned input {box_id} carries a {len} byte proof")]
    UnexpectedProof { box_id: BoxId, len: usize },

    /// Token index refers past the end of the token table
    #[error("Token index {index} out of range for token table with {len} entries")]
    TokenIndexOutOfRange { index: u64, len: usize },

    /// Token id is absent from the token table
    #[error("Token {0} not found in token table")]
    UnknownToken(TokenId),

    /// Context extension repeats a key
    #[error("Duplicate context extension key {0}")]
    DuplicateExtensionKey(u8),

    /// Register count above the number of non-mandatory slots
    #[error("Too many registers: {count} (max {max})")]
    TooManyRegisters { count: usize, max: usize },

    /// Typed constant could not be decoded
    #[error("Invalid constant: {0}")]
    InvalidConstant(String),

    /// Bytes left over after a complete value was read
    #[error("Trailing bytes after {field}: {remaining} unread")]
    TrailingBytes {
        field: &'static str,
        remaining: usize,
    },

    /// Invalid digest length
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex decoding error
    #[error("Hex decode error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Blake2b hashing error
    #[error("Blake2b error: {0}")]
    Blake2bError(String),
}

impl CodecError {
    /// Creates an unexpected-end error helper.
    pub fn unexpected_end(field: &'static str, needed: usize, remaining: usize) -> Self {
        CodecError::UnexpectedEnd {
            field,
            needed,
            remaining,
        }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::UnexpectedEnd { .. } => ErrorKind::Underflow,
            CodecError::ShapeViolation(_)
            | CodecError::ReducedInputCountMismatch { .. }
            | CodecError::UnexpectedProof { .. } => ErrorKind::Shape,
            CodecError::TokenIndexOutOfRange { .. }
            | CodecError::UnknownToken(_)
            | CodecError::DuplicateExtensionKey(_) => ErrorKind::Integrity,
            CodecError::VlqOverflow { .. }
            | CodecError::OutOfRange { .. }
            | CodecError::TooManyRegisters { .. }
            | CodecError::InvalidConstant(_)
            | CodecError::TrailingBytes { .. }
            | CodecError::InvalidLength { .. }
            | CodecError::HexError(_)
            | CodecError::Blake2bError(_) => ErrorKind::Malformed,
        }
    }
}
