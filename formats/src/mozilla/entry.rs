use std::fs;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::http_headers::HttpHeaders;

use super::elements;
use super::header::{self, MetadataHeader};
use super::key::{self, ParsedKey};

/// One parsed cache2 entry, with every field the CSV sink needs already
/// extracted. `browser` and `profile` are filled in by the caller, which
/// knows the cache directory's position in a discovered profile tree;
/// this module only understands the entry file itself.
#[derive(Debug, Clone, Default)]
pub struct MozillaEntry {
    pub input_path: String,
    pub filename: String,
    pub extension: Option<String>,
    pub url: Option<String>,
    pub origin: Option<String>,
    pub last_modified_time: u32,
    pub last_access_time: u32,
    pub expiry_time: u32,
    pub access_count: u32,
    pub response: Option<String>,
    pub server: Option<String>,
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub content_range: Option<String>,
    pub content_encoding: Option<String>,
    pub browser: Option<String>,
    pub profile: Option<String>,
    pub version: String,
    /// Number of bytes at the front of `input_path` that are the actual
    /// cached payload, i.e. everything before the metadata header.
    pub payload_size: u64,
}

/// Parse one cache2 entry file: a metadata offset trailer, a metadata
/// header, a key, and an elements block, in that layout from the back of
/// the file forwards.
pub fn read(path: &Path) -> Result<MozillaEntry> {
    let data = fs::read(path)?;
    let path_string = path.to_string_lossy().into_owned();

    if data.len() < 4 {
        return Err(Error::MetadataTooSmall {
            path: path_string,
            expected: 4,
            actual: data.len() as i64,
        });
    }

    let trailer_start = data.len() - 4;
    let metadata_offset = (&data[trailer_start..]).read_u32::<BigEndian>()?;

    if metadata_offset as usize >= trailer_start {
        return Err(Error::MetadataOffsetOutOfRange {
            offset: metadata_offset,
            size: data.len() as u64,
            path: path_string,
        });
    }

    // The metadata header doesn't start at `metadata_offset` directly: a
    // hash chunk array (one slot per 256 KiB of payload, plus a 4-byte
    // count field) sits between the payload and the header.
    let hash_size = header::hash_size(metadata_offset) as usize;
    let header_start = metadata_offset as usize + hash_size;
    if header_start >= trailer_start {
        return Err(Error::MetadataTooSmall {
            path: path_string,
            expected: header_start as u64,
            actual: trailer_start as i64,
        });
    }

    let mut cursor = std::io::Cursor::new(&data[header_start..]);
    let header = MetadataHeader::read(&mut cursor, &path_string)?;
    let header_size = MetadataHeader::size(header.version);

    let key_start = header_start + header_size;
    let key_end = key_start + header.key_length as usize;
    if key_end > trailer_start {
        return Err(Error::MetadataTooSmall {
            path: path_string,
            expected: key_end as u64,
            actual: trailer_start as i64,
        });
    }

    let key_bytes = &data[key_start..key_end];
    let raw_key = String::from_utf8_lossy(key_bytes).into_owned();
    let parsed_key: ParsedKey = key::parse(&raw_key);

    let elements_data = &data[key_end..trailer_start];
    let parsed_elements = elements::parse(elements_data);

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extension = parsed_key
        .url
        .as_deref()
        .and_then(url_extension)
        .map(|s| s.to_string());

    let http_headers: Option<HttpHeaders> = parsed_elements.http_headers;
    let header_value = |name: &str| http_headers.as_ref().and_then(|h| h.get(name)).map(str::to_string);

    Ok(MozillaEntry {
        input_path: path_string,
        filename,
        extension,
        url: parsed_key.url,
        origin: parsed_key.partition_key.or(parsed_elements.request_origin),
        last_modified_time: header.last_modified_time,
        last_access_time: header.last_access_time,
        expiry_time: header.expiry_time,
        access_count: header.access_count,
        response: http_headers.as_ref().and_then(|h| h.status_line()).map(str::to_string),
        server: header_value("server"),
        cache_control: header_value("cache-control"),
        pragma: header_value("pragma"),
        content_type: header_value("content-type"),
        content_length: header_value("content-length"),
        content_range: header_value("content-range"),
        content_encoding: header_value("content-encoding"),
        browser: None,
        profile: None,
        version: format!("2.0.{}", header.version),
        payload_size: metadata_offset as u64,
    })
}

fn url_extension(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    let (_, dot, ext) = strings::partition(last_segment, ".");
    if dot.is_some() && !ext.is_empty() {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Builds a cache2 entry file: `payload_len` payload bytes, then the
    /// hash chunk block real entries carry at that payload size, then the
    /// metadata header/key/elements, then the offset trailer.
    fn build_entry_file(payload_len: usize, key: &str, elements_block: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; payload_len];
        let metadata_offset = buf.len() as u32;
        let hash_size = header::hash_size(metadata_offset) as usize;
        buf.extend(std::iter::repeat(0u8).take(hash_size));

        let key_bytes = key.as_bytes();
        let mut body = Vec::new();
        body.extend_from_slice(&3u32.to_be_bytes()); // version 3
        body.extend_from_slice(&5u32.to_be_bytes()); // access_count
        body.extend_from_slice(&100u32.to_be_bytes()); // last_access_time
        body.extend_from_slice(&200u32.to_be_bytes()); // last_modified_time
        body.extend_from_slice(&7u32.to_be_bytes()); // frecency
        body.extend_from_slice(&300u32.to_be_bytes()); // expiry_time
        body.extend_from_slice(&(key_bytes.len() as u32).to_be_bytes()); // key_length
        body.extend_from_slice(&0u32.to_be_bytes()); // flags
        body.extend_from_slice(key_bytes);
        body.extend_from_slice(elements_block);

        buf.extend_from_slice(&body);
        buf.extend_from_slice(&metadata_offset.to_be_bytes());
        buf
    }

    fn sample_elements_block() -> Vec<u8> {
        let mut elements_block = Vec::new();
        elements_block.extend_from_slice(b"response-head\0");
        elements_block
            .extend_from_slice(b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 42\0");
        elements_block
    }

    #[test]
    fn parses_a_well_formed_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0123456789abcdef0123456789abcdef01234567");

        let data = build_entry_file(
            0,
            "a,:https://cdn.example.com/path/image.png",
            &sample_elements_block(),
        );
        fs::write(&path, &data).unwrap();

        let entry = read(&path).unwrap();
        assert_eq!(entry.url.as_deref(), Some("https://cdn.example.com/path/image.png"));
        assert_eq!(entry.extension.as_deref(), Some("png"));
        assert_eq!(entry.content_type.as_deref(), Some("image/png"));
        assert_eq!(entry.content_length.as_deref(), Some("42"));
        assert_eq!(entry.access_count, 5);
        assert_eq!(entry.version, "2.0.3");
    }

    #[test]
    fn skips_the_hash_chunk_block_for_a_nonempty_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry_with_payload");

        // Payload spans more than one 256 KiB chunk, so the hash block
        // carries more than the flat 4-byte minimum; a reader that fails
        // to skip it would misparse the metadata header entirely.
        let data = build_entry_file(
            300_000,
            "a,:https://cdn.example.com/path/image.png",
            &sample_elements_block(),
        );
        fs::write(&path, &data).unwrap();

        let entry = read(&path).unwrap();
        assert_eq!(entry.url.as_deref(), Some("https://cdn.example.com/path/image.png"));
        assert_eq!(entry.access_count, 5);
        assert_eq!(entry.payload_size, 300_000);
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short");
        fs::write(&path, [0u8, 1, 2]).unwrap();
        assert!(read(&path).is_err());
    }

    #[test]
    fn url_extension_ignores_query_string() {
        assert_eq!(url_extension("https://example.com/a/b.js?v=2"), Some("js"));
        assert_eq!(url_extension("https://example.com/a/b"), None);
    }
}
