//! Chunked file reader/writer and a memory-mapped read view, the byte-I/O
//! layer every format parser and the decompressor build on.

mod error;
mod mapped;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use mapped::MappedView;
pub use reader::{read_chunk_at, read_first_chunk, ChunkReader, DEFAULT_CAPACITY};
pub use writer::{copy_file, ChunkWriter, WriteMode};
