use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;

enum Inner {
    Plain(File),
    Temp(NamedTempFile),
}

/// How a [`ChunkWriter`] should open its destination.
pub enum WriteMode<'a> {
    /// Append to an existing file, creating it (and its parent
    /// directories) if necessary.
    Append,
    /// Truncate an existing file, or create a new one.
    Truncate,
    /// Create a uniquely-named file inside `dir`. The file is removed when
    /// the writer is dropped unless [`ChunkWriter::persist`] is called.
    Temp { dir: &'a Path },
}

/// A writer over a file, supporting append/truncate modes and a temp-file
/// lifecycle used for intermediate decompression stages and payload
/// staging before the final copy-out.
pub struct ChunkWriter {
    path: PathBuf,
    inner: Inner,
}

impl ChunkWriter {
    pub fn create(path: impl AsRef<Path>, mode: WriteMode<'_>) -> Result<Self> {
        match mode {
            WriteMode::Append => {
                let path = path.as_ref().to_path_buf();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                Ok(Self {
                    path,
                    inner: Inner::Plain(file),
                })
            }
            WriteMode::Truncate => {
                let path = path.as_ref().to_path_buf();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&path)?;
                Ok(Self {
                    path,
                    inner: Inner::Plain(file),
                })
            }
            WriteMode::Temp { dir } => {
                std::fs::create_dir_all(dir)?;
                let temp = NamedTempFile::new_in(dir)?;
                let path = temp.path().to_path_buf();
                Ok(Self {
                    path,
                    inner: Inner::Temp(temp),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_next(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.inner {
            Inner::Plain(file) => file.write_all(data)?,
            Inner::Temp(temp) => temp.as_file_mut().write_all(data)?,
        }
        Ok(())
    }

    /// Truncate the file to `size` bytes, positioning at the new
    /// end-of-file. Used by the Mozilla parser to discard trailing
    /// metadata after copying the payload out.
    pub fn truncate(&mut self, size: u64) -> Result<()> {
        let file = match &mut self.inner {
            Inner::Plain(file) => file,
            Inner::Temp(temp) => temp.as_file_mut(),
        };
        file.set_len(size)?;
        file.seek(SeekFrom::Start(size))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Plain(file) => file.flush()?,
            Inner::Temp(temp) => temp.as_file_mut().flush()?,
        }
        Ok(())
    }

    /// Keep a temp-mode writer's file at `dest` instead of deleting it when
    /// dropped. No-op (returns `Ok(())`) for non-temp writers.
    pub fn persist(self, dest: impl AsRef<Path>) -> Result<()> {
        if let Inner::Temp(temp) = self.inner {
            temp.persist(dest).map_err(|e| e.error)?;
        }
        Ok(())
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            Inner::Plain(file) => file.write(buf),
            Inner::Temp(temp) => temp.as_file_mut().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            Inner::Plain(file) => file.flush(),
            Inner::Temp(temp) => temp.as_file_mut().flush(),
        }
    }
}

/// Copy `src`'s contents into `dest` byte-for-byte, creating `dest`'s
/// parent directories as needed.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    if let Some(parent) = dest.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::copy(src, dest)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn append_mode_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.bin");
        let mut writer = ChunkWriter::create(&path, WriteMode::Append).unwrap();
        writer.write_next(b"hello").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"hello");
    }

    #[test]
    fn append_mode_appends_across_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut writer = ChunkWriter::create(&path, WriteMode::Append).unwrap();
        writer.write_next(b"a").unwrap();
        drop(writer);

        let mut writer = ChunkWriter::create(&path, WriteMode::Append).unwrap();
        writer.write_next(b"b").unwrap();
        drop(writer);

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"ab");
    }

    #[test]
    fn truncate_mode_resets_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut writer = ChunkWriter::create(&path, WriteMode::Append).unwrap();
        writer.write_next(b"long original contents").unwrap();
        drop(writer);

        let mut writer = ChunkWriter::create(&path, WriteMode::Truncate).unwrap();
        writer.write_next(b"short").unwrap();
        drop(writer);

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"short");
    }

    #[test]
    fn truncate_call_discards_trailing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let mut writer = ChunkWriter::create(&path, WriteMode::Truncate).unwrap();
        writer.write_next(b"payloadMETADATA").unwrap();
        writer.truncate(7).unwrap();
        drop(writer);

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }

    #[test]
    fn temp_files_are_removed_unless_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChunkWriter::create("unused", WriteMode::Temp { dir: dir.path() }).unwrap();
        let temp_path = writer.path().to_path_buf();
        assert!(temp_path.exists());
        drop(writer);
        assert!(!temp_path.exists());
    }

    #[test]
    fn temp_file_can_be_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("final.bin");
        let mut writer = ChunkWriter::create("unused", WriteMode::Temp { dir: dir.path() }).unwrap();
        writer.write_next(b"data").unwrap();
        writer.persist(&dest).unwrap();
        assert!(dest.exists());
    }
}
