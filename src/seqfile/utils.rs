//! Low-level byte reading utilities.
//!
//! [`ByteCursor`] wraps any seekable byte source and exposes the primitive
//! reads the sequence file format is built from: fixed-width big-endian
//! integers, Hadoop variable-length integers, length-prefixed UTF-8 strings
//! and raw byte runs.

use std::io::{self, Read, Seek, SeekFrom};
use byteorder::{BigEndian, ReadBytesExt};
use log::trace;

use super::types::error::{Result, SeqFileError};

/// Maximum number of bytes following the first byte of a variable-length
/// integer. Matches a 64-bit accumulator.
pub const MAX_VINT_TRAILING_BYTES: usize = 8;

/// Returns the total encoded size (first byte included) of a variable-length
/// integer, given its first byte.
///
/// Thresholds are those of Hadoop's `WritableUtils` (`-112`, `-120`), which is
/// what real files are written with. Single-byte literals stop at `-112`;
/// `-113..=-120` prefix positive values and `-121..=-128` negative ones.
pub fn decode_vint_size(first: i8) -> usize {
    let first = first as i32;
    if first >= -112 {
        1
    } else if first < -120 {
        (-119 - first) as usize
    } else {
        (-111 - first) as usize
    }
}

/// Returns true if the first byte of a variable-length integer marks a
/// negative value.
pub fn is_negative_vint(first: i8) -> bool {
    first < -120 || (-112..0).contains(&first)
}

/// Primitive reader over a seekable byte source.
///
/// Every read either returns exactly what was asked for or fails; a short
/// read is reported as [`SeqFileError::UnexpectedEndOfStream`].
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
}

impl<R: Read + Seek> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads exactly `n` bytes.
    ///
    /// The buffer grows with the data actually read, so a bogus length near
    /// `i32::MAX` on a short stream fails without a huge allocation.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(64 * 1024));
        (&mut self.inner).take(n as u64).read_to_end(&mut buf)?;
        if buf.len() < n {
            trace!("Short read: wanted {} bytes, got {}", n, buf.len());
            return Err(SeqFileError::UnexpectedEndOfStream);
        }
        Ok(buf)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a 4-byte big-endian two's-complement integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    /// Reads an 8-byte big-endian two's-complement integer.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64::<BigEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(self.inner.read_f64::<BigEndian>()?)
    }

    /// Reads a 4-byte integer at a frame boundary.
    ///
    /// Returns `Ok(None)` if the source ends before all 4 bytes are read,
    /// which callers treat as a clean end of data rather than an error.
    pub fn try_read_i32(&mut self) -> Result<Option<i32>> {
        let mut buf = Vec::with_capacity(4);
        (&mut self.inner).take(4).read_to_end(&mut buf)?;
        match <[u8; 4]>::try_from(buf.as_slice()) {
            Ok(bytes) => Ok(Some(i32::from_be_bytes(bytes))),
            Err(_) => {
                if !buf.is_empty() {
                    trace!("Ignoring {} trailing bytes at end of stream", buf.len());
                }
                Ok(None)
            }
        }
    }

    /// Reads one signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    /// Reads one byte as a boolean: any non-zero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.inner.read_u8()? != 0)
    }

    /// Reads a Hadoop variable-length integer (`WritableUtils.readVLong`).
    ///
    /// The first byte either is the value itself (when `>= -112`) or encodes
    /// both the sign and the number of big-endian magnitude bytes that follow.
    /// Negative values are stored one's-complemented.
    pub fn read_vlong(&mut self) -> Result<i64> {
        let first = self.read_i8()?;
        let size = decode_vint_size(first);
        if size == 1 {
            return Ok(first as i64);
        }

        let trailing = size - 1;
        if trailing > MAX_VINT_TRAILING_BYTES {
            return Err(SeqFileError::VarIntTooLong(trailing));
        }

        let mut x: u64 = 0;
        for _ in 0..trailing {
            let b = self.inner.read_u8()?;
            x = (x << 8) | b as u64;
        }

        let x = x as i64;
        Ok(if is_negative_vint(first) { x ^ -1 } else { x })
    }

    /// Reads a variable-length integer that must fit in 32 bits.
    pub fn read_vint(&mut self) -> Result<i32> {
        let value = self.read_vlong()?;
        i32::try_from(value).map_err(|_| SeqFileError::InvalidLength {
            context: "32-bit variable-length integer",
            value,
        })
    }

    /// Reads a variable-length-integer length prefix followed by that many
    /// bytes of UTF-8 text.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_vint()?;
        let len = usize::try_from(len).map_err(|_| SeqFileError::InvalidLength {
            context: "string",
            value: len as i64,
        })?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| SeqFileError::InvalidEncoding(format!("string is not valid UTF-8: {}", e)))
    }

    /// Returns the absolute byte offset in the underlying source.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Moves to an absolute byte offset in the underlying source.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<'a> ByteCursor<io::Cursor<&'a [u8]>> {
    /// Wraps a borrowed byte span, for payload decoders.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(io::Cursor::new(bytes))
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        let data = self.inner.get_ref();
        let pos = (self.inner.position() as usize).min(data.len());
        data.len() - pos
    }
}
