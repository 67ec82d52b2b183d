//! File format parsing layer for sequence files.
//!
//! This module sits between the raw [`ByteCursor`](crate::seqfile::utils::ByteCursor)
//! and the high-level [`SequenceFileReader`](crate::seqfile::reader::SequenceFileReader).
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header         │ ← header::parse()
//! ├─────────────────┤
//! │  Record frame   │ ← record::read_frame()
//! │  Record frame   │
//! │  (-1, sync)     │ ← verified inside read_frame()
//! │  Record frame   │
//! │  ...            │
//! └─────────────────┘
//! ```

pub mod header;
pub mod record;
