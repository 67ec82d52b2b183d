//! Mapping from key/value class names to payload decoders.
//!
//! A [`DecoderRegistry`] is built once, before any file is opened, and then
//! only read. [`SequenceFileReader::open_with`](crate::SequenceFileReader::open_with)
//! takes one by reference; [`SequenceFileReader::open`](crate::SequenceFileReader::open)
//! uses the shared [`DecoderRegistry::builtin`] table.

use std::collections::HashMap;
use std::sync::OnceLock;
use log::{debug, warn};

use super::codec::{self, typed_bytes};
use super::types::error::{Result, SeqFileError};
use super::types::models::Value;

/// Registry name of raw `BytesWritable` payloads.
pub const BYTES_WRITABLE_CLASS: &str = "org.apache.hadoop.io.BytesWritable";

/// A payload decoder: turns one key or value span into a [`Value`].
///
/// The span borrows the frame buffer for the duration of the call only;
/// anything the decoder keeps must be copied out.
pub type DecodeFn = fn(&[u8]) -> Result<Value>;

static BUILTIN: OnceLock<DecoderRegistry> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl DecoderRegistry {
    /// Creates a registry with no decoders at all.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Creates a registry preloaded with the built-in decoders:
    /// typed bytes and raw `BytesWritable`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(typed_bytes::TYPED_BYTES_CLASS, typed_bytes::decode);
        registry.register(BYTES_WRITABLE_CLASS, codec::decode_bytes);
        registry
    }

    /// Returns the process-wide registry of built-in decoders.
    ///
    /// Initialized on first use and immutable afterwards.
    pub fn builtin() -> &'static DecoderRegistry {
        BUILTIN.get_or_init(Self::with_builtins)
    }

    /// Registers `decode` under `name`, returning the decoder it replaced.
    /// The last registration for a name wins.
    pub fn register(&mut self, name: impl Into<String>, decode: DecodeFn) -> Option<DecodeFn> {
        let name = name.into();
        debug!("Registering decoder for '{}'", name);
        let previous = self.decoders.insert(name, decode);
        if previous.is_some() {
            warn!("Replaced an existing decoder registration");
        }
        previous
    }

    /// Looks up a decoder by exact class name.
    pub fn get(&self, name: &str) -> Option<DecodeFn> {
        self.decoders.get(name).copied()
    }

    /// Like [`get`](Self::get), but a missing entry is an
    /// [`SeqFileError::UnknownType`].
    pub fn resolve(&self, name: &str) -> Result<DecodeFn> {
        self.get(name)
            .ok_or_else(|| SeqFileError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
