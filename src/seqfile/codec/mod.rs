//! Built-in payload decoders.
//!
//! Each decoder has the registry signature `fn(&[u8]) -> Result<Value>` and
//! receives one key or value span of a record frame, with the 4-byte length
//! indicator already stripped.
//!
//! # Submodules
//!
//! - [`typed_bytes`][]: Hadoop typed bytes (`TypedBytesWritable`)

pub mod typed_bytes;

use crate::seqfile::types::error::Result;
use crate::seqfile::types::models::Value;

/// Decodes a `BytesWritable` payload: the span itself is the value.
pub fn decode_bytes(span: &[u8]) -> Result<Value> {
    Ok(Value::Bytes(span.to_vec()))
}
