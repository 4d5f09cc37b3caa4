use std::path::{Path, PathBuf};

/// Case-insensitive path string comparison.
pub fn eq(a: &str, b: &str) -> bool {
    strings::eq_ignore_case(a, b)
}

/// Resolve `p` against the process working directory if it is relative.
pub fn absolute(p: &Path) -> std::io::Result<PathBuf> {
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(p))
    }
}

/// Whether `a` and `b` refer to the same filesystem object. Delegates to
/// the host's stable file identity (volume + file index on Windows,
/// device + inode on Unix) via the `same-file` crate, falling back to
/// canonicalized-path equality when the identity check itself fails (e.g.
/// one of the paths doesn't exist).
pub fn same_file(a: &Path, b: &Path) -> bool {
    match same_file::is_same_file(a, b) {
        Ok(result) => result,
        Err(_) => match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        },
    }
}

/// Deduplicate `paths` by case-insensitive string equality, preserving
/// first-seen order. Mozilla cache root discovery can yield the same
/// directory by multiple routes (default locations plus `prefs.js`
/// overrides).
pub fn unique_directories(paths: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(paths.len());
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let lower = path.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
            out.push(path);
        }
    }
    out
}
