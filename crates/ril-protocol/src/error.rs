//! Protocol error types.

use thiserror::Error;

/// Errors raised while reading or decoding a parcel.
///
/// Every variant describes a malformed payload: the decoder either ran past
/// the end of the buffer or met a value it has no mapping for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A read needed more bytes than the buffer has left.
    #[error("buffer underrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Underrun {
        /// Read position when the read was attempted.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A length or count prefix is negative or cannot fit in the buffer.
    #[error("invalid length {length} at offset {offset}")]
    InvalidLength {
        /// Offset of the length prefix.
        offset: usize,
        /// The length value found on the wire.
        length: i32,
    },

    /// An enumerated field carries a value outside its table.
    #[error("invalid {field} value: {value}")]
    InvalidDiscriminant {
        /// Name of the field being mapped.
        field: &'static str,
        /// The raw wire value.
        value: i32,
    },

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string data.
        offset: usize,
    },

    /// Payload is structurally wrong in a way the other variants don't cover.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
