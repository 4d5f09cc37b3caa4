use std::path::Path;

use ioutil::{ChunkWriter, WriteMode};
use strings::Splitter;
use tracing::warn;

use crate::error::{Error, Result};
use crate::{brotli_stage, lzw, zlib};

/// Decode one stage of a `Content-Encoding` chain by name, dispatching to
/// the matching decompressor. `gzip`/`x-gzip`/`deflate` share a decoder
/// since the wire format, not the label, decides whether the stream is
/// gzip, Zlib, or raw DEFLATE.
fn decode_stage(encoding: &str, input: &Path, writer: &mut ChunkWriter) -> Result<()> {
    match encoding {
        "gzip" | "x-gzip" | "deflate" => zlib::decode(input, writer),
        "br" => brotli_stage::decode(input, writer),
        "compress" | "x-compress" => lzw::decode(input, writer),
        other => Err(Error::UnsupportedEncoding(other.to_string())),
    }
}

/// Decode `input` according to the `Content-Encoding` header value
/// `content_encoding`, writing the fully decoded payload to `output`.
///
/// `Content-Encoding` lists encodings in the order they were *applied*,
/// so decoding undoes them in reverse: the rightmost-listed encoding was
/// applied last and must be undone first.
pub fn decode(
    input: &Path,
    content_encoding: &str,
    output: &mut ChunkWriter,
    temp_dir: &Path,
) -> Result<()> {
    let encodings: Vec<&str> = Splitter::new(content_encoding, ", ")
        .reverse(true)
        .collect_all();

    if encodings.is_empty() {
        warn!("got empty content encoding, copying input through unchanged");
        copy_into(input, output)?;
        return Ok(());
    }

    if encodings.len() == 1 {
        return decode_stage(encodings[0], input, output);
    }

    // Ping-pong between two temp files so that stage N+1 never reads the
    // file it's also writing to.
    let mut even = ChunkWriter::create("unused", WriteMode::Temp { dir: temp_dir })?;
    let mut odd = ChunkWriter::create("unused", WriteMode::Temp { dir: temp_dir })?;

    let mut previous_path = input.to_path_buf();
    for (i, encoding) in encodings.iter().enumerate() {
        let is_last = i == encodings.len() - 1;

        if is_last {
            decode_stage(encoding, &previous_path, output)?;
            break;
        }

        let stage_writer = if i % 2 == 0 { &mut even } else { &mut odd };
        decode_stage(encoding, &previous_path, stage_writer)?;
        stage_writer.flush()?;
        previous_path = stage_writer.path().to_path_buf();
    }

    Ok(())
}

fn copy_into(input: &Path, output: &mut ChunkWriter) -> Result<()> {
    let mut reader = ioutil::ChunkReader::begin(input, 0, None)?;
    while reader.next()? {
        output.write_next(reader.data())?;
    }
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write as _;

    #[test]
    fn empty_encoding_copies_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, b"raw bytes").unwrap();

        let out_path = dir.path().join("out");
        let mut writer = ChunkWriter::create(&out_path, WriteMode::Truncate).unwrap();
        decode(&input, "", &mut writer, dir.path()).unwrap();
        drop(writer);

        assert_eq!(std::fs::read(&out_path).unwrap(), b"raw bytes");
    }

    #[test]
    fn single_stage_dispatches_directly() {
        let original = b"hello chained decoding";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let encoded = encoder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, &encoded).unwrap();

        let out_path = dir.path().join("out");
        let mut writer = ChunkWriter::create(&out_path, WriteMode::Truncate).unwrap();
        decode(&input, "gzip", &mut writer, dir.path()).unwrap();
        drop(writer);

        assert_eq!(std::fs::read(&out_path).unwrap(), original);
    }

    #[test]
    fn multi_stage_applies_in_reverse_order() {
        // gzip applied, then that result gzip'd again: Content-Encoding: gzip, gzip
        let original = b"double wrapped payload for the chain test";

        let mut inner = GzEncoder::new(Vec::new(), Compression::default());
        inner.write_all(original).unwrap();
        let once = inner.finish().unwrap();

        let mut outer = GzEncoder::new(Vec::new(), Compression::default());
        outer.write_all(&once).unwrap();
        let twice = outer.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, &twice).unwrap();

        let out_path = dir.path().join("out");
        let mut writer = ChunkWriter::create(&out_path, WriteMode::Truncate).unwrap();
        decode(&input, "gzip, gzip", &mut writer, dir.path()).unwrap();
        drop(writer);

        assert_eq!(std::fs::read(&out_path).unwrap(), original);
    }

    #[test]
    fn unsupported_encoding_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, b"data").unwrap();
        let out_path = dir.path().join("out");
        let mut writer = ChunkWriter::create(&out_path, WriteMode::Truncate).unwrap();
        assert!(decode(&input, "bzip2", &mut writer, dir.path()).is_err());
    }
}
