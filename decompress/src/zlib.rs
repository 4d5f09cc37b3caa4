use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use ioutil::ChunkWriter;

use crate::error::{Error, Result};

/// Magic byte pairs that identify a gzip or zlib stream rather than a raw
/// DEFLATE stream. `0x78` is the first byte of every Zlib compression
/// level using a 32K window.
const GZIP_OR_ZLIB_MAGICS: [[u8; 2]; 5] = [
    [0x1F, 0x8B],
    [0x78, 0x01],
    [0x78, 0x5E],
    [0x78, 0x9C],
    [0x78, 0xDA],
];

/// Decode the `gzip`/`x-gzip`/`deflate` encodings. HTTP's `deflate` is
/// supposed to mean the Zlib format (RFC 1950) rather than raw DEFLATE
/// (RFC 1951), but some servers send raw DEFLATE under that name, so the
/// magic bytes decide which decoder to use rather than the encoding name.
pub fn decode(path: &Path, writer: &mut ChunkWriter) -> Result<()> {
    let mut magic = [0u8; 2];
    let mut probe = File::open(path)?;
    let read = probe.read(&mut magic)?;

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let is_gzip_or_zlib = read == 2 && GZIP_OR_ZLIB_MAGICS.contains(&magic);

    if is_gzip_or_zlib && magic == [0x1F, 0x8B] {
        let mut decoder = GzDecoder::new(reader);
        std::io::copy(&mut decoder, writer).map_err(|e| Error::Zlib(e.to_string()))?;
    } else if is_gzip_or_zlib {
        let mut decoder = ZlibDecoder::new(reader);
        std::io::copy(&mut decoder, writer).map_err(|e| Error::Zlib(e.to_string()))?;
    } else {
        let mut decoder = DeflateDecoder::new(reader);
        std::io::copy(&mut decoder, writer).map_err(|e| Error::Zlib(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}
