use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Error, Result};

/// A read-only, contiguous view of a non-empty file's contents.
pub struct MappedView {
    path: PathBuf,
    mmap: Mmap,
}

impl MappedView {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(Error::EmptyFile(path));
        }

        // SAFETY: the file is opened read-only for the lifetime of this
        // view and is not expected to be mutated concurrently by another
        // process during a forensic export run.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn maps_a_non_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"mapped contents").unwrap();
        file.flush().unwrap();

        let view = MappedView::open(file.path()).unwrap();
        assert_eq!(view.as_bytes(), b"mapped contents");
    }

    #[test]
    fn rejects_empty_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = MappedView::open(file.path());
        assert!(matches!(result, Err(Error::EmptyFile(_))));
    }
}
