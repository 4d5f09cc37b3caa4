use std::fs;
use std::path::{Path, PathBuf};

use paths::{EntryKind, Walker};
use strings::partition;

/// Vendor/product directory names searched under the usual profile
/// container locations (`%APPDATA%`, `%LOCALAPPDATA%`, `~/.mozilla`,
/// `~/Library/Application Support`, ...). Not exhaustive, just the set
/// of shipping Gecko-based browsers worth looking for by default.
const BROWSER_DIRS: &[&str] = &[
    "Mozilla/Firefox",
    "Mozilla/SeaMonkey",
    "Waterfox",
    "Thunderbird",
    "Tor Browser/Browser",
];

/// Subdirectories of a browser directory that hold one folder per
/// profile. Desktop Firefox uses `Profiles`; some Gecko embedders use
/// `Users50` (the legacy profile-manager name Mozilla used before
/// renaming it to "Profiles").
const PROFILE_CONTAINER_DIRS: &[&str] = &["Profiles", "Users50"];

/// One discovered cache2 directory plus the browser/profile names it
/// belongs to, inferred from its position under a profile container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredCache {
    pub path: PathBuf,
    pub browser: Option<String>,
    pub profile: Option<String>,
}

/// Search every combination of `bases` x [`BROWSER_DIRS`] x
/// [`PROFILE_CONTAINER_DIRS`] for profile directories, then append the
/// cache subdirectory names cache2 actually uses.
pub fn discover(bases: &[PathBuf]) -> Vec<DiscoveredCache> {
    let mut found = Vec::new();

    for base in bases {
        for browser_dir in BROWSER_DIRS {
            let browser_path = base.join(browser_dir);
            if !browser_path.is_dir() {
                continue;
            }
            let browser_name = browser_dir.rsplit('/').next().unwrap_or(browser_dir);

            for container in PROFILE_CONTAINER_DIRS {
                let container_path = browser_path.join(container);
                let Ok(read_dir) = fs::read_dir(&container_path) else {
                    continue;
                };

                for profile_entry in read_dir.flatten() {
                    let profile_path = profile_entry.path();
                    if !profile_path.is_dir() {
                        continue;
                    }

                    let profile_name = profile_entry.file_name().to_string_lossy().into_owned();
                    found.extend(caches_under_profile(&profile_path, browser_name, &profile_name));
                }
            }
        }
    }

    dedup_by_path(found)
}

fn dedup_by_path(caches: Vec<DiscoveredCache>) -> Vec<DiscoveredCache> {
    let mut seen = std::collections::HashSet::new();
    caches
        .into_iter()
        .filter(|c| seen.insert(c.path.to_string_lossy().to_lowercase()))
        .collect()
}

// Salt directories (`*.slt`) hold the on-disk cache when a profile is
// in batch/portable mode; when present, the salt directory itself is
// the "profile" component rather than its parent.
fn caches_under_profile(profile_path: &Path, browser: &str, profile: &str) -> Vec<DiscoveredCache> {
    let mut result = Vec::new();

    if let Some(cache) = cache_dir_in(profile_path) {
        result.push(DiscoveredCache {
            path: cache,
            browser: Some(browser.to_string()),
            profile: Some(profile.to_string()),
        });
    }

    if let Ok(entries) = fs::read_dir(profile_path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && path.extension().map(|e| e == "slt").unwrap_or(false) {
                let salt_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                if let Some(cache) = cache_dir_in(&path) {
                    result.push(DiscoveredCache {
                        path: cache,
                        browser: Some(browser.to_string()),
                        profile: salt_name,
                    });
                }
            }
        }
    }

    result
}

fn cache_dir_in(dir: &Path) -> Option<PathBuf> {
    for name in ["cache2", "Cache", "NewCache"] {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    None
}

/// Unescape a `prefs.js`/`user.js` string literal: only `\\` and `\"`
/// are special, matching the limited escaping Gecko's pref serializer
/// actually emits.
pub fn unescape_pref_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                Some('"') => {
                    out.push('"');
                    chars.next();
                }
                _ => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Scan a `prefs.js`/`user.js` file for `browser.cache.disk.directory`
/// (or `.parent_directory`) overrides, returning the configured cache
/// root if present.
pub fn cache_directory_override(prefs_content: &str) -> Option<String> {
    for line in prefs_content.lines() {
        let line = line.trim();
        let Some(rest) = line
            .strip_prefix("user_pref(\"")
            .or_else(|| line.strip_prefix("user_pref( \""))
        else {
            continue;
        };

        let (pref_name, delim, remainder) = partition(rest, "\"");
        if delim.is_none() || !pref_name.contains("browser.cache") || !pref_name.contains("directory") {
            continue;
        }

        let (_, _, value_part) = partition(remainder, "\"");
        let (value, value_delim, _) = partition(value_part, "\"");
        if value_delim.is_none() && value.is_empty() {
            continue;
        }
        return Some(unescape_pref_string(value));
    }
    None
}

/// Scan `prefs.js`/`user.js` under every discovered profile directory
/// for a cache directory override, in addition to the default
/// `cache2` location `discover` already looks for.
pub fn discover_from_prefs(profile_dirs: &[PathBuf]) -> Vec<DiscoveredCache> {
    let mut result = Vec::new();

    for profile_dir in profile_dirs {
        for prefs_name in ["prefs.js", "user.js"] {
            let prefs_path = profile_dir.join(prefs_name);
            let Ok(content) = fs::read_to_string(&prefs_path) else {
                continue;
            };

            if let Some(override_dir) = cache_directory_override(&content) {
                let cache_path = PathBuf::from(&override_dir).join("cache2");
                if cache_path.is_dir() {
                    let profile_name = profile_dir.file_name().map(|n| n.to_string_lossy().into_owned());
                    result.push(DiscoveredCache {
                        path: cache_path,
                        browser: None,
                        profile: profile_name,
                    });
                }
            }
        }
    }

    result
}

/// Walk a cache2 directory's `entries` and `doomed` subdirectories for
/// entry files, ignoring the top-level `index`.
pub fn entry_files(cache_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for sub in ["entries", "doomed"] {
        let dir = cache_dir.join(sub);
        if !dir.is_dir() {
            continue;
        }
        if let Ok(walker) = Walker::new(&dir).kind(EntryKind::Files).walk() {
            files.extend(walker.into_iter().map(|e| e.path));
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unescapes_backslash_and_quote() {
        assert_eq!(unescape_pref_string(r#"C:\\Users\\me"#), r"C:\Users\me");
        assert_eq!(unescape_pref_string(r#"a\"b"#), "a\"b");
    }

    #[test]
    fn finds_cache_directory_override() {
        let prefs = r#"user_pref("browser.cache.disk.parent_directory", "D:\\cache\\ff");
user_pref("other.pref", "1");"#;
        assert_eq!(
            cache_directory_override(prefs),
            Some(r"D:\cache\ff".to_string())
        );
    }

    #[test]
    fn missing_override_returns_none() {
        let prefs = r#"user_pref("general.useragent.locale", "en-US");"#;
        assert_eq!(cache_directory_override(prefs), None);
    }

    #[test]
    fn entry_files_collects_from_entries_and_doomed() {
        let dir = tempdir().unwrap();
        let entries_dir = dir.path().join("entries");
        let doomed_dir = dir.path().join("doomed");
        fs::create_dir_all(&entries_dir).unwrap();
        fs::create_dir_all(&doomed_dir).unwrap();
        fs::write(entries_dir.join("a"), b"x").unwrap();
        fs::write(doomed_dir.join("b"), b"y").unwrap();

        let files = entry_files(dir.path());
        assert_eq!(files.len(), 2);
    }
}
