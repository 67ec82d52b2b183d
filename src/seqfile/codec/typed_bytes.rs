//! Hadoop typed bytes decoding.
//!
//! Every typed-bytes value starts with a one-byte type code followed by a
//! big-endian payload whose shape depends on the code:
//!
//! ```text
//!  0  bytes    [i32 length][raw bytes]
//!  1  byte     [1 byte]
//!  2  bool     [1 byte, non-zero = true]
//!  3  int      [i32]
//!  4  long     [i64]
//!  5  float    [f32]
//!  6  double   [f64]
//!  7  string   [i32 length][UTF-8 bytes]
//!  8  vector   [i32 count][value x count]
//!  9  list     [value ...][0xFF marker]
//! 10  map      [i32 count][(key, value) x count]
//! ```

use log::trace;

use crate::seqfile::types::error::{Result, SeqFileError};
use crate::seqfile::types::models::Value;
use crate::seqfile::utils::ByteCursor;

type SpanCursor<'a> = ByteCursor<std::io::Cursor<&'a [u8]>>;

/// Registry name of the typed-bytes wire encoding.
pub const TYPED_BYTES_CLASS: &str = "org.apache.hadoop.typedbytes.TypedBytesWritable";

/// Deepest container nesting accepted before the payload is rejected.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Bytes,
    Byte,
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Vector,
    List,
    Map,
    Marker,
}

impl TryFrom<u8> for TypeCode {
    type Error = SeqFileError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Bytes),
            1 => Ok(Self::Byte),
            2 => Ok(Self::Bool),
            3 => Ok(Self::Int),
            4 => Ok(Self::Long),
            5 => Ok(Self::Float),
            6 => Ok(Self::Double),
            7 => Ok(Self::String),
            8 => Ok(Self::Vector),
            9 => Ok(Self::List),
            10 => Ok(Self::Map),
            255 => Ok(Self::Marker),
            _ => Err(SeqFileError::InvalidFormat(format!("Unknown typed bytes code: {}", value))),
        }
    }
}

/// Decodes one typed-bytes value from the start of `span`.
pub fn decode(span: &[u8]) -> Result<Value> {
    let mut cursor = ByteCursor::from_slice(span);
    let value = read_value(&mut cursor, 0)?;
    if cursor.remaining() > 0 {
        trace!("Typed bytes: ignoring {} trailing bytes", cursor.remaining());
    }
    Ok(value)
}

fn read_code(cursor: &mut SpanCursor<'_>) -> Result<TypeCode> {
    let code = cursor.read_i8()? as u8;
    TypeCode::try_from(code)
}

fn read_value(cursor: &mut SpanCursor<'_>, depth: usize) -> Result<Value> {
    let code = read_code(cursor)?;
    read_typed(cursor, code, depth)
}

fn read_typed(cursor: &mut SpanCursor<'_>, code: TypeCode, depth: usize) -> Result<Value> {
    match code {
        TypeCode::Bytes => {
            let len = read_len(cursor, "typed bytes bytes")?;
            Ok(Value::Bytes(cursor.read_bytes(len)?))
        }
        TypeCode::Byte => Ok(Value::Byte(cursor.read_i8()?)),
        TypeCode::Bool => Ok(Value::Bool(cursor.read_bool()?)),
        TypeCode::Int => Ok(Value::Int(cursor.read_i32()?)),
        TypeCode::Long => Ok(Value::Long(cursor.read_i64()?)),
        TypeCode::Float => Ok(Value::Float(cursor.read_f32()?)),
        TypeCode::Double => Ok(Value::Double(cursor.read_f64()?)),
        TypeCode::String => {
            let len = read_len(cursor, "typed bytes string")?;
            let bytes = cursor.read_bytes(len)?;
            String::from_utf8(bytes).map(Value::String).map_err(|e| {
                SeqFileError::InvalidEncoding(format!(
                    "typed bytes string is not valid UTF-8: {}",
                    e
                ))
            })
        }
        TypeCode::Vector => {
            let depth = enter(depth)?;
            let count = read_len(cursor, "typed bytes vector")?;
            let mut items = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                items.push(read_value(cursor, depth)?);
            }
            Ok(Value::Vector(items))
        }
        TypeCode::List => {
            let depth = enter(depth)?;
            let mut items = Vec::new();
            loop {
                match read_code(cursor)? {
                    TypeCode::Marker => break,
                    code => items.push(read_typed(cursor, code, depth)?),
                }
            }
            Ok(Value::List(items))
        }
        TypeCode::Map => {
            let depth = enter(depth)?;
            let count = read_len(cursor, "typed bytes map")?;
            let mut entries = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                let key = read_value(cursor, depth)?;
                let value = read_value(cursor, depth)?;
                entries.push((key, value));
            }
            Ok(Value::Map(entries))
        }
        TypeCode::Marker => Err(SeqFileError::InvalidFormat(
            "List end marker outside of a list".to_string(),
        )),
    }
}

fn read_len(cursor: &mut SpanCursor<'_>, context: &'static str) -> Result<usize> {
    let len = cursor.read_i32()?;
    usize::try_from(len).map_err(|_| SeqFileError::InvalidLength { context, value: len as i64 })
}

fn enter(depth: usize) -> Result<usize> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(SeqFileError::InvalidFormat(format!(
            "Typed bytes nesting deeper than {}",
            MAX_NESTING_DEPTH
        )));
    }
    Ok(depth + 1)
}
