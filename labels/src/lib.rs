//! Loads the label-file grammar (file signatures/MIME-types/extensions
//! and reversed-host URL domains) and matches cache entries against the
//! loaded labels.

mod error;
mod matcher;
mod rulefile;
mod types;

pub use error::{Error, Result};
pub use matcher::{FileMatchParams, Matcher};
pub use rulefile::parse;
pub use types::{Domain, FileLabel, Label, LabelKind, Signature, UrlLabel};

/// Parse every `*.txt` label file in `dir` (non-recursively) and build a
/// single [`Matcher`] over their combined labels.
pub fn load_directory(dir: &std::path::Path) -> Result<Matcher> {
    let mut labels = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        let path_str = path.to_string_lossy();
        match rulefile::parse(&content, &path_str) {
            Ok(mut loaded) => {
                tracing::info!("loaded {} labels from '{}'", loaded.len(), path_str);
                labels.append(&mut loaded);
            }
            Err(err) => {
                tracing::error!("failed to load '{}': {}", path_str, err);
            }
        }
    }

    Ok(Matcher::new(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_every_file_in_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("a.txt")).unwrap();
        writeln!(f, "NAME A\nBEGIN_FILE X\nBEGIN_EXTENSIONS\nfoo\nEND\nEND").unwrap();
        let mut f = std::fs::File::create(dir.path().join("b.txt")).unwrap();
        writeln!(f, "NAME B\nBEGIN_FILE Y\nBEGIN_EXTENSIONS\nbar\nEND\nEND").unwrap();

        let matcher = load_directory(dir.path()).unwrap();
        assert_eq!(matcher.labels().len(), 2);
    }
}
