//! Core sequence file reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod registry;
pub mod types;
pub mod utils;

pub use reader::SequenceFileReader;
pub use registry::{DecodeFn, DecoderRegistry};
pub use types::error::{Result, SeqFileError};
