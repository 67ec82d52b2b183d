use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use log::{debug, info, trace};

use super::format;
use super::iter::{Records, Values};
use super::registry::{DecodeFn, DecoderRegistry};
use super::types::error::Result;
use super::types::models::{SequenceFileHeader, Value};
use super::utils::ByteCursor;

/// Sequential reader for uncompressed sequence files.
///
/// Owns its byte source and a cursor into it. Reading a record advances the
/// cursor; use [`tell`](Self::tell) and [`seek`](Self::seek) to come back to
/// a frame boundary recorded earlier, or [`rewind`](Self::rewind) to start
/// over from the first record.
pub struct SequenceFileReader<R> {
    cursor: ByteCursor<R>,
    header: SequenceFileHeader,
    key_decoder: DecodeFn,
    value_decoder: DecodeFn,
    /// Offset of the first record frame, right after the header.
    data_start: u64,
}

impl SequenceFileReader<BufReader<File>> {
    /// Opens the sequence file at `path` with the built-in decoders.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening sequence file: {}", path.display());
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> SequenceFileReader<R> {
    /// Opens a sequence file using the built-in decoder registry.
    pub fn open(source: R) -> Result<Self> {
        Self::open_with(source, DecoderRegistry::builtin())
    }

    /// Opens a sequence file, resolving key and value decoders in `registry`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The stream does not start with `SEQ`
    /// - The file is compressed or block-compressed
    /// - No decoder is registered for the key or value class
    /// - The header is truncated or holds invalid UTF-8
    pub fn open_with(source: R, registry: &DecoderRegistry) -> Result<Self> {
        let mut cursor = ByteCursor::new(source);
        let header = format::header::parse(&mut cursor)?;

        let key_decoder = registry.resolve(&header.key_class_name)?;
        let value_decoder = registry.resolve(&header.value_class_name)?;
        debug!(
            "Resolved decoders for '{}' and '{}'",
            header.key_class_name, header.value_class_name
        );

        let data_start = cursor.tell()?;
        trace!("Records start at offset {}", data_start);

        Ok(Self {
            cursor,
            header,
            key_decoder,
            value_decoder,
            data_start,
        })
    }

    pub fn header(&self) -> &SequenceFileHeader {
        &self.header
    }

    /// Offset of the first record frame.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Reads and decodes the next `(key, value)` pair.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. The frame buffer is
    /// dropped before this returns; decoded values own their data.
    pub fn next_record(&mut self) -> Result<Option<(Value, Value)>> {
        let Some(record) = format::record::read_frame(&mut self.cursor, &self.header.sync_marker)?
        else {
            trace!("End of records");
            return Ok(None);
        };
        let key = (self.key_decoder)(record.key())?;
        let value = (self.value_decoder)(record.value())?;
        Ok(Some((key, value)))
    }

    /// Like [`next_record`](Self::next_record), keeping only the value.
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        Ok(self.next_record()?.map(|(_, value)| value))
    }

    /// Iterates over the remaining `(key, value)` pairs.
    pub fn records(&mut self) -> Records<'_, R> {
        Records::new(self)
    }

    /// Iterates over the remaining values, skipping keys.
    pub fn values(&mut self) -> Values<'_, R> {
        Values::new(self)
    }

    /// Current byte offset in the source.
    pub fn tell(&mut self) -> Result<u64> {
        self.cursor.tell()
    }

    /// Moves to `pos`, which must be the start of a record frame (or of an
    /// inline sync marker) previously obtained from [`tell`](Self::tell).
    /// Reading from any other offset yields garbage or an error.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        trace!("Seeking to offset {}", pos);
        self.cursor.seek(pos)
    }

    /// Moves back to the first record.
    pub fn rewind(&mut self) -> Result<()> {
        self.cursor.seek(self.data_start)
    }

    pub fn get_ref(&self) -> &R {
        self.cursor.get_ref()
    }

    /// Gives back the byte source.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }
}

impl<R> std::fmt::Debug for SequenceFileReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceFileReader")
            .field("header", &self.header)
            .field("data_start", &self.data_start)
            .finish_non_exhaustive()
    }
}

impl<'a, R: Read + Seek> IntoIterator for &'a mut SequenceFileReader<R> {
    type Item = Result<(Value, Value)>;
    type IntoIter = Records<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}
