//! Parsing for Gecko's `cache2` disk cache: the `index` file, per-entry
//! metadata/key/elements, and profile/cache directory discovery.

mod elements;
mod entry;
mod header;
mod key;
mod roots;

pub use entry::MozillaEntry;
pub use header::{IndexHeader, MetadataHeader, MAX_INDEX_VERSION};
pub use roots::{
    cache_directory_override, discover, discover_from_prefs, entry_files, unescape_pref_string,
    DiscoveredCache,
};

use std::path::Path;

use crate::error::Result;

/// A cache2 directory is recognized either by its `index` file or by an
/// `entries` subdirectory (the index can be absent/corrupt on disk
/// while entries are still readable individually).
pub fn is_cache2_dir(dir: &Path) -> bool {
    dir.join("index").is_file() || dir.join("entries").is_dir()
}

/// Read and validate the `index` file's header. Only the header is
/// parsed; the per-entry hash table that follows isn't needed since
/// entries are read directly from the `entries`/`doomed` directories.
pub fn read_index(cache_dir: &Path) -> Result<IndexHeader> {
    let index_path = cache_dir.join("index");
    let mut file = std::fs::File::open(index_path)?;
    IndexHeader::read(&mut file)
}

/// Parse every entry under a cache2 directory, tagging each with the
/// given browser/profile names. Entries that fail to parse are logged
/// and skipped rather than aborting the whole scan, since a single
/// corrupt or partially-written entry shouldn't hide the rest of a
/// cache from the export.
pub fn scan(cache_dir: &Path, browser: Option<&str>, profile: Option<&str>) -> Vec<MozillaEntry> {
    let mut results = Vec::new();

    for path in roots::entry_files(cache_dir) {
        match entry::read(&path) {
            Ok(mut parsed) => {
                parsed.browser = browser.map(str::to_string);
                parsed.profile = profile.map(str::to_string);
                results.push(parsed);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to parse cache2 entry");
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn recognizes_cache2_dir_by_entries_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("entries")).unwrap();
        assert!(is_cache2_dir(dir.path()));
    }

    #[test]
    fn recognizes_cache2_dir_by_index_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index"), [0u8; 16]).unwrap();
        assert!(is_cache2_dir(dir.path()));
    }

    #[test]
    fn rejects_unrelated_directory() {
        let dir = tempdir().unwrap();
        assert!(!is_cache2_dir(dir.path()));
    }

    #[test]
    fn scan_skips_unparsable_entries_without_aborting() {
        let dir = tempdir().unwrap();
        let entries_dir = dir.path().join("entries");
        fs::create_dir(&entries_dir).unwrap();
        fs::write(entries_dir.join("bad"), [0u8; 2]).unwrap();

        let results = scan(dir.path(), Some("Firefox"), Some("default"));
        assert!(results.is_empty());
    }
}
