//! Record frame reading.
//!
//! # Frame Structure
//! ```text
//! [4 bytes] buffer length (big-endian i32); -1 means a sync marker follows
//! [16 bytes] sync marker           (only after a -1 length)
//! [4 bytes] buffer length          (only after a sync marker)
//! [4 bytes] key length (big-endian i32)
//! [N bytes] buffer:
//!     [0, 4)                 key length indicator
//!     [4, key_len)           key payload
//!     [key_len, key_len + 4) value length indicator
//!     [key_len + 4, N)       value payload
//! ```

use std::io::{Read, Seek};
use log::trace;

use crate::seqfile::types::{
    error::{Result, SeqFileError},
    models::{SyncMarker, SYNC_MARKER_SIZE},
};
use crate::seqfile::utils::ByteCursor;

/// Length value announcing an inline sync marker instead of a record.
pub const SYNC_ESCAPE: i32 = -1;

/// Width of the length indicator in front of each payload in the buffer.
pub const LENGTH_INDICATOR_SIZE: usize = 4;

/// One record frame's buffer, split into key and value payload spans.
///
/// The spans borrow the buffer, so they live no longer than the frame.
#[derive(Debug)]
pub struct RawRecord {
    buf: Vec<u8>,
    key_len: usize,
}

impl RawRecord {
    /// Validates `key_len` against the buffer and builds the record.
    pub fn new(buf: Vec<u8>, key_len: i32) -> Result<Self> {
        let invalid = || SeqFileError::InvalidLength {
            context: "record key",
            value: key_len as i64,
        };
        let key_len = usize::try_from(key_len).map_err(|_| invalid())?;
        if key_len < LENGTH_INDICATOR_SIZE || key_len + LENGTH_INDICATOR_SIZE > buf.len() {
            return Err(invalid());
        }
        Ok(Self { buf, key_len })
    }

    pub fn key(&self) -> &[u8] {
        &self.buf[LENGTH_INDICATOR_SIZE..self.key_len]
    }

    pub fn value(&self) -> &[u8] {
        &self.buf[self.key_len + LENGTH_INDICATOR_SIZE..]
    }
}

/// Reads the next record frame.
///
/// Returns `Ok(None)` when the stream ends where a buffer length is expected,
/// either at the start of a frame or right after a verified sync marker.
/// A short read anywhere else means the file is truncated and fails with
/// [`SeqFileError::UnexpectedEndOfStream`].
pub fn read_frame<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    sync_marker: &SyncMarker,
) -> Result<Option<RawRecord>> {
    let mut buf_len = match cursor.try_read_i32()? {
        Some(len) => len,
        None => return Ok(None),
    };

    while buf_len == SYNC_ESCAPE {
        check_sync(cursor, sync_marker)?;
        buf_len = match cursor.try_read_i32()? {
            Some(len) => len,
            None => return Ok(None),
        };
    }

    let buf_len = usize::try_from(buf_len).map_err(|_| SeqFileError::InvalidLength {
        context: "record buffer",
        value: buf_len as i64,
    })?;
    let key_len = cursor.read_i32()?;
    trace!("Frame: buffer={} bytes, key={} bytes", buf_len, key_len);

    let buf = cursor.read_bytes(buf_len)?;
    RawRecord::new(buf, key_len).map(Some)
}

fn check_sync<R: Read + Seek>(cursor: &mut ByteCursor<R>, expected: &SyncMarker) -> Result<()> {
    let found: [u8; SYNC_MARKER_SIZE] = cursor.read_array()?;
    if found != *expected.as_bytes() {
        return Err(SeqFileError::CorruptFile(format!(
            "sync marker mismatch: expected {:?}, found {:?}",
            expected,
            SyncMarker(found)
        )));
    }
    trace!("Sync marker verified");
    Ok(())
}
