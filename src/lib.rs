//! # seqfile-reader
//!
//! A sequential reader for Hadoop-style sequence files: a `SEQ` header
//! followed by length-framed key/value records, with periodic sync markers.
//!
//! Keys and values are decoded by functions looked up by class name in a
//! [`DecoderRegistry`]. Typed bytes and raw `BytesWritable` payloads are
//! supported out of the box.
//!
//! **Note:** Compressed and block-compressed files are rejected with
//! [`SeqFileError::UnsupportedFeature`].
pub mod seqfile;

// Re-export the main types for convenience
pub use seqfile::{
    DecodeFn,
    DecoderRegistry,
    Result,
    SeqFileError,
    SequenceFileReader,
    iter::{Records, Values},
    types::models::{
        SequenceFileHeader,
        SyncMarker,
        Value,
        SYNC_MARKER_SIZE,
    },
};
