//! Core data structures for sequence file components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The parsed file header and its sync marker
//! - The decoded `Value` produced by payload decoders

use std::fmt;

/// Size in bytes of a sync marker, both in the header and inline.
pub const SYNC_MARKER_SIZE: usize = 16;

/// The per-file 16-byte sync marker.
///
/// Written once in the header and repeated inline (after a `-1` length
/// sentinel) so a reader can verify it is still aligned on a frame boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncMarker(pub [u8; SYNC_MARKER_SIZE]);

impl SyncMarker {
    pub fn as_bytes(&self) -> &[u8; SYNC_MARKER_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SyncMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncMarker(")?;
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// Complete parsed header of a sequence file.
///
/// Created once per opened stream and never modified afterwards.
/// `compression_class_name` is `Some` exactly when `compressed` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFileHeader {
    pub version: u8,
    pub key_class_name: String,
    pub value_class_name: String,
    pub compressed: bool,
    pub block_compressed: bool,
    pub compression_class_name: Option<String>,
    /// Metadata pairs in file order, duplicates included.
    pub metadata: Vec<(String, String)>,
    pub sync_marker: SyncMarker,
}

impl SequenceFileHeader {
    /// Looks up a metadata entry. When a key occurs more than once the last
    /// occurrence wins.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A decoded key or value.
///
/// The variants mirror the typed-bytes type system, which is rich enough to
/// also carry the simple Hadoop `Writable` types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    Byte(i8),
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Vector(Vec<Value>),
    List(Vec<Value>),
    /// Map entries in wire order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
