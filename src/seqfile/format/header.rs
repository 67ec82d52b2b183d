//! Sequence file header parsing.
//!
//! This module handles:
//! - Validating the `SEQ` magic
//! - Reading key/value class names and compression flags
//! - Collecting the metadata pairs
//! - Reading the file's sync marker

use std::io::{Read, Seek};
use log::{debug, info, trace};

use crate::seqfile::types::{
    error::{Result, SeqFileError},
    models::{SequenceFileHeader, SyncMarker, SYNC_MARKER_SIZE},
};
use crate::seqfile::utils::ByteCursor;

/// The three magic bytes every sequence file starts with.
pub const MAGIC: &[u8; 3] = b"SEQ";

/// Parses the sequence file header from the cursor's current position.
///
/// # Header Structure
/// ```text
/// [3 bytes]  "SEQ"
/// [1 byte]   version
/// [vstring]  key class name
/// [vstring]  value class name
/// [1 byte]   compressed
/// [1 byte]   block compressed
/// [vstring]  compression codec class name (only if compressed)
/// [4 bytes]  metadata count (big-endian i32)
/// [vstring, vstring] x count
/// [16 bytes] sync marker
/// ```
///
/// The whole header is read before the compression flags are checked, so
/// a compressed file fails with [`SeqFileError::UnsupportedFeature`] rather
/// than with whatever error decoding its payloads would produce.
pub fn parse<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<SequenceFileHeader> {
    info!("Parsing sequence file header");

    // Step 1: Magic
    let magic: [u8; 3] = cursor.read_array()?;
    if &magic != MAGIC {
        return Err(SeqFileError::NotASequenceFile(magic));
    }

    // Step 2: Version
    let version = cursor.read_i8()? as u8;
    trace!("Header version: {}", version);

    // Step 3: Class names
    let key_class_name = cursor.read_string()?;
    let value_class_name = cursor.read_string()?;
    debug!("Key class: '{}', value class: '{}'", key_class_name, value_class_name);

    // Step 4: Compression flags
    let compressed = cursor.read_bool()?;
    let block_compressed = cursor.read_bool()?;

    // Step 5: Codec class, present only for compressed files
    let compression_class_name = if compressed {
        let codec = cursor.read_string()?;
        debug!("Compression codec: '{}'", codec);
        Some(codec)
    } else {
        None
    };

    // Step 6: Metadata
    let metadata = parse_metadata(cursor)?;

    // Step 7: Sync marker
    let sync_marker = SyncMarker(cursor.read_array::<SYNC_MARKER_SIZE>()?);
    trace!("Sync marker: {:?}", sync_marker);

    // Step 8: Capability check
    if compressed || block_compressed {
        return Err(SeqFileError::UnsupportedFeature("compression"));
    }

    info!(
        "Header parsed successfully: version={}, key='{}', value='{}', metadata entries={}",
        version,
        key_class_name,
        value_class_name,
        metadata.len()
    );

    Ok(SequenceFileHeader {
        version,
        key_class_name,
        value_class_name,
        compressed,
        block_compressed,
        compression_class_name,
        metadata,
        sync_marker,
    })
}

/// Reads the fixed-width entry count followed by that many string pairs.
fn parse_metadata<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Vec<(String, String)>> {
    let count = cursor.read_i32()?;
    let count = usize::try_from(count).map_err(|_| SeqFileError::InvalidLength {
        context: "metadata count",
        value: count as i64,
    })?;

    // Capacity is only a hint; a bogus count fails on the first short read.
    let mut metadata = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        let key = cursor.read_string()?;
        let value = cursor.read_string()?;
        trace!("Metadata: '{}' = '{}'", key, value);
        metadata.push((key, value));
    }
    Ok(metadata)
}
