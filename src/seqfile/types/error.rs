//! Custom error types for the seqfile-reader crate.

use std::io;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum SeqFileError {
    /// An I/O error other than a short read.
    #[error("I/O error: {0:?}")]
    Io(io::Error),

    /// The stream does not start with the `SEQ` magic.
    #[error("Not a sequence file: expected magic \"SEQ\", found {0:02x?}")]
    NotASequenceFile([u8; 3]),

    /// The file uses a feature this reader does not decode (e.g. compression).
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// No decoder is registered for the given class name.
    #[error("No known decoder for type '{0}'")]
    UnknownType(String),

    /// The stream lost alignment, e.g. an inline sync marker did not match the header.
    #[error("File corrupt: {0}")]
    CorruptFile(String),

    /// A length-prefixed string was not valid UTF-8.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Fewer bytes were available than a read required.
    #[error("Unexpected end of stream")]
    UnexpectedEndOfStream,

    /// A variable-length integer announced more trailing bytes than fit in 64 bits.
    #[error("Variable-length integer too long: {0} trailing bytes")]
    VarIntTooLong(usize),

    /// A length field is negative or inconsistent with its frame.
    #[error("Invalid length for {context}: {value}")]
    InvalidLength { context: &'static str, value: i64 },

    /// A payload handed to a built-in decoder is structurally invalid.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<io::Error> for SeqFileError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => SeqFileError::UnexpectedEndOfStream,
            _ => SeqFileError::Io(err),
        }
    }
}

/// A convenience `Result` type alias using the crate's `SeqFileError` type.
pub type Result<T> = std::result::Result<T, SeqFileError>;
