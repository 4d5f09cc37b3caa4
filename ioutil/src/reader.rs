use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default chunk capacity, used when the caller doesn't pick one. Stands
/// in for "available memory" from the source spec, which has no portable
/// equivalent without an OS-specific crate.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// A reader that yields fixed-capacity chunks at an explicit, monotonically
/// increasing offset. `next` may return a short final chunk; it never
/// silently drops bytes. On EOF the underlying handle is closed and
/// further calls to `next` keep returning `false`.
pub struct ChunkReader {
    path: PathBuf,
    file: Option<File>,
    capacity: usize,
    offset: u64,
    buf: Vec<u8>,
    filled: usize,
    eof: bool,
}

impl ChunkReader {
    /// Open `path` for chunked reading, starting at byte `start_offset`.
    pub fn begin(path: impl AsRef<Path>, start_offset: u64, capacity: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        if start_offset > 0 {
            file.seek(SeekFrom::Start(start_offset))?;
        }

        let capacity = capacity.unwrap_or(DEFAULT_CAPACITY).max(1);
        Ok(Self {
            path,
            file: Some(file),
            capacity,
            offset: start_offset,
            buf: vec![0u8; capacity],
            filled: 0,
            eof: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    pub fn size(&self) -> usize {
        self.filled
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Seek the underlying handle by `delta` bytes relative to the current
    /// position, used when a caller over-read and must rewind to a byte
    /// boundary (the LZW decoder does this when it needs more input but
    /// has already consumed part of a partial code).
    pub fn rewind(&mut self, delta: i64) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            let pos = file.seek(SeekFrom::Current(delta))?;
            self.offset = pos;
        }
        Ok(())
    }

    /// Read the next chunk. Returns `Ok(true)` if any bytes (possibly
    /// fewer than `capacity`) were read, `Ok(false)` at EOF.
    pub fn next(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };

        let mut total = 0;
        while total < self.capacity {
            let n = file.read(&mut self.buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        self.filled = total;
        self.offset += total as u64;

        if total == 0 {
            self.eof = true;
            self.file = None;
            return Ok(false);
        }

        Ok(true)
    }

    /// Close the reader early (e.g. after reading only a header).
    pub fn end(mut self) {
        self.file = None;
    }
}

/// Read the first `count` bytes of `path` without disturbing later chunked
/// reads of the same file (used for signature/magic sniffing).
pub fn read_first_chunk(path: impl AsRef<Path>, count: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; count];
    let mut total = 0;
    while total < count {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    buf.truncate(total);
    Ok(buf)
}

/// Read `count` bytes starting at `offset` from the end semantics used by
/// the Mozilla parser (reading the trailing metadata-offset field).
pub fn read_chunk_at(path: impl AsRef<Path>, offset: u64, count: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; count];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn reads_full_file_in_chunks() {
        let data = vec![7u8; 10];
        let file = write_temp(&data);
        let mut reader = ChunkReader::begin(file.path(), 0, Some(4)).unwrap();

        let mut collected = Vec::new();
        while reader.next().unwrap() {
            collected.extend_from_slice(reader.data());
        }

        assert_eq!(collected, data);
        assert!(reader.eof());
    }

    #[test]
    fn never_silently_drops_a_short_final_chunk() {
        let data = vec![1, 2, 3, 4, 5];
        let file = write_temp(&data);
        let mut reader = ChunkReader::begin(file.path(), 0, Some(3)).unwrap();

        assert!(reader.next().unwrap());
        assert_eq!(reader.data(), &[1, 2, 3]);
        assert!(reader.next().unwrap());
        assert_eq!(reader.data(), &[4, 5]);
        assert!(!reader.next().unwrap());
        assert!(reader.eof());
    }

    #[test]
    fn start_offset_skips_leading_bytes() {
        let data = vec![1, 2, 3, 4, 5];
        let file = write_temp(&data);
        let mut reader = ChunkReader::begin(file.path(), 2, Some(64)).unwrap();
        reader.next().unwrap();
        assert_eq!(reader.data(), &[3, 4, 5]);
    }

    #[test]
    fn eof_is_sticky() {
        let file = write_temp(&[]);
        let mut reader = ChunkReader::begin(file.path(), 0, Some(4)).unwrap();
        assert!(!reader.next().unwrap());
        assert!(!reader.next().unwrap());
    }
}
