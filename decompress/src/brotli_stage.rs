use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ioutil::ChunkWriter;

use crate::error::{Error, Result};

/// Decode the `br` encoding.
pub fn decode(path: &Path, writer: &mut ChunkWriter) -> Result<()> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = brotli::Decompressor::new(reader, 4096);
    std::io::copy(&mut decoder, writer).map_err(|e| Error::Brotli(e.to_string()))?;
    writer.flush()?;
    Ok(())
}
