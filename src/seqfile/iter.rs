//! Iterators for sequential access to sequence file records.
//!
//! - [`Records`] yields `(key, value)` pairs
//! - [`Values`] yields values only, on top of the same frame reading
//!
//! Both stop after the first error.
//!
//! # Example
//! ```no_run
//! # use seqfile_reader::SequenceFileReader;
//! let mut reader = SequenceFileReader::open_path("part-00000").unwrap();
//! for result in reader.records() {
//!     let (key, value) = result.unwrap();
//!     println!("{:?} => {:?}", key, value);
//! }
//! ```

use std::io::{Read, Seek};

use super::reader::SequenceFileReader;
use super::types::error::Result;
use super::types::models::Value;

/// Iterator over `(key, value)` pairs.
///
/// Created by [`SequenceFileReader::records()`].
pub struct Records<'a, R> {
    reader: &'a mut SequenceFileReader<R>,
    done: bool,
}

impl<'a, R: Read + Seek> Records<'a, R> {
    pub(super) fn new(reader: &'a mut SequenceFileReader<R>) -> Self {
        Self { reader, done: false }
    }
}

impl<R: Read + Seek> Iterator for Records<'_, R> {
    type Item = Result<(Value, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(pair)) => Some(Ok(pair)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for Records<'_, R> {}

/// Iterator over values only.
///
/// Created by [`SequenceFileReader::values()`].
pub struct Values<'a, R> {
    records: Records<'a, R>,
}

impl<'a, R: Read + Seek> Values<'a, R> {
    pub(super) fn new(reader: &'a mut SequenceFileReader<R>) -> Self {
        Self {
            records: Records::new(reader),
        }
    }
}

impl<R: Read + Seek> Iterator for Values<'_, R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|result| result.map(|(_, value)| value))
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for Values<'_, R> {}
