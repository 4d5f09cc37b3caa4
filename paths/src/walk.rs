use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::Result;

/// What kind of filesystem entries a [`Walker`] should yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Files,
    Directories,
    Both,
}

/// Metadata about one walked entry.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub created: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub depth: usize,
    pub is_dir: bool,
}

/// A depth-first directory walk. `max_depth` follows the source's
/// convention: `-1` unbounded, `0` the base directory only, `n` descend
/// `n` levels. Built on `walkdir`, which already manages its own explicit
/// stack rather than recursing, so depth is bounded by available memory
/// and not the native call stack, matching §4.4's requirement.
pub struct Walker {
    base: PathBuf,
    max_depth: i32,
    kind: EntryKind,
    pattern: Option<Pattern>,
}

impl Walker {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            max_depth: -1,
            kind: EntryKind::Both,
            pattern: None,
        }
    }

    pub fn max_depth(mut self, max_depth: i32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn glob(mut self, pattern: &str) -> Self {
        self.pattern = Pattern::new(pattern).ok();
        self
    }

    /// Run the walk, collecting every matching entry.
    pub fn walk(&self) -> Result<Vec<WalkEntry>> {
        let mut walker = WalkDir::new(&self.base).min_depth(0);
        walker = match self.max_depth {
            -1 => walker,
            n => walker.max_depth(n.max(0) as usize),
        };

        let mut out = Vec::new();
        for entry in walker.into_iter().filter_map(std::result::Result::ok) {
            let depth = entry.depth();
            if depth == 0 {
                // The base directory itself is never yielded as a result,
                // matching the source walker's "query roots, not the
                // base" semantics.
                continue;
            }

            let is_dir = entry.file_type().is_dir();
            let matches_kind = match self.kind {
                EntryKind::Files => !is_dir,
                EntryKind::Directories => is_dir,
                EntryKind::Both => true,
            };
            if !matches_kind {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(pattern) = &self.pattern {
                if !pattern.matches(&name) {
                    continue;
                }
            }

            let metadata = entry.metadata().ok();
            let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
            let created = metadata.as_ref().and_then(|m| m.created().ok());
            let accessed = metadata.as_ref().and_then(|m| m.accessed().ok());
            let modified = metadata.as_ref().and_then(|m| m.modified().ok());

            out.push(WalkEntry {
                path: entry.path().to_path_buf(),
                name,
                size,
                created,
                accessed,
                modified,
                depth,
                is_dir,
            });
        }

        Ok(out)
    }
}
