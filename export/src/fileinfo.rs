//! SHA-256 hashing and other per-file info gathered without loading a
//! whole file into memory at once.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;
use ioutil::ChunkReader;

/// Hash `path`'s contents, streaming it through a [`ChunkReader`] rather
/// than reading it whole. Returns the upper-case hex digest, or an empty
/// string if the file has no payload (zero bytes).
pub fn sha256_hex(path: &Path) -> Result<String> {
    let mut reader = ChunkReader::begin(path, 0, None)?;
    let mut hasher = Sha256::new();
    let mut any_bytes = false;

    while reader.next()? {
        any_bytes = true;
        hasher.update(reader.data());
    }

    if !any_bytes {
        return Ok(String::new());
    }

    Ok(hex::encode_upper(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn hashes_known_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        fs::write(&path, b"The quick brown fox jumps over the lazy dog.").unwrap();

        let digest = sha256_hex(&path).unwrap();
        assert_eq!(
            digest,
            "EF537F25C895BFA782526529A9B63D97AA631564D5D789C2B765448C8635FB6"
        );
    }

    #[test]
    fn empty_file_hashes_to_empty_string() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        assert_eq!(sha256_hex(&path).unwrap(), "");
    }
}
