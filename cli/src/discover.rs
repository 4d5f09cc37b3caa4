//! Per-format entry discovery: given a cache root and which format it
//! holds, produce the [`CacheEntry`] list the orchestrator pipeline
//! consumes. Mozilla's cache2 parser and the Shockwave/Director
//! classifier already live in `formats`; formats this tool recognizes
//! only by directory layout (WinINET, Flash, Java, Unity) or not at all
//! (a plain `WALK` task) fall back to a generic file walk that still
//! labels and hashes every file it finds, just without format-specific
//! metadata extraction.

use std::path::Path;

use export::{CacheEntry, FormatFlag};
use formats::mozilla;
use formats::shockwave;
use paths::{EntryKind, Walker};

/// One discovered entry plus the output subdirectory (if any) it should
/// be grouped under, beyond the format's own top-level directory.
pub struct Discovered {
    pub entry: CacheEntry,
    pub subdirectory: Option<String>,
}

pub fn discover(format: FormatFlag, root: &Path) -> Vec<Discovered> {
    match format {
        FormatFlag::Mozilla => discover_mozilla(root),
        FormatFlag::Shockwave => discover_shockwave(root),
        FormatFlag::Walk | FormatFlag::Wininet | FormatFlag::Flash | FormatFlag::Java | FormatFlag::Unity => {
            discover_plain_walk(root)
        }
    }
}

fn discover_mozilla(root: &Path) -> Vec<Discovered> {
    if mozilla::is_cache2_dir(root) {
        return mozilla::scan(root, None, None)
            .into_iter()
            .map(|entry| Discovered {
                entry: entry.into(),
                subdirectory: None,
            })
            .collect();
    }

    let mut out = Vec::new();
    for cache in mozilla::discover(&[root.to_path_buf()]) {
        let subdirectory = match (&cache.browser, &cache.profile) {
            (Some(browser), Some(profile)) => Some(format!("{browser}/{profile}")),
            (Some(browser), None) => Some(browser.clone()),
            _ => None,
        };
        for entry in mozilla::scan(&cache.path, cache.browser.as_deref(), cache.profile.as_deref()) {
            out.push(Discovered {
                entry: entry.into(),
                subdirectory: subdirectory.clone(),
            });
        }
    }
    out
}

fn discover_shockwave(root: &Path) -> Vec<Discovered> {
    let walked = match Walker::new(root).kind(EntryKind::Files).walk() {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %root.display(), error = %err, "failed to walk Shockwave root");
            return Vec::new();
        }
    };

    walked
        .into_iter()
        .map(|walk_entry| {
            let is_xtra = walk_entry
                .path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("x32"))
                .unwrap_or(false);
            let format = shockwave::director_format(&walk_entry.path);
            let xtra = if is_xtra {
                shockwave::resource::read(&walk_entry.path)
            } else {
                shockwave::VersionResource::default()
            };
            Discovered {
                entry: CacheEntry::from_shockwave_file(walk_entry.path, format, xtra, None, None),
                subdirectory: Some(if is_xtra { "Xtras".to_string() } else { "Cache".to_string() }),
            }
        })
        .collect()
}

/// The format's output subdirectory name, e.g. `output_root/Mozilla/...`.
pub fn format_short(format: FormatFlag) -> &'static str {
    match format {
        FormatFlag::Walk => "Walk",
        FormatFlag::Wininet => "WinINET",
        FormatFlag::Mozilla => "Mozilla",
        FormatFlag::Flash => "Flash",
        FormatFlag::Shockwave => "Shockwave",
        FormatFlag::Java => "Java",
        FormatFlag::Unity => "Unity",
    }
}

/// Formats with no dedicated parser still get enumerated, hashed, and
/// labeled; they just carry none of the per-entry metadata a real
/// format parser would have recovered (no URL, no timestamps).
fn discover_plain_walk(root: &Path) -> Vec<Discovered> {
    let walked = match Walker::new(root).kind(EntryKind::Files).walk() {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %root.display(), error = %err, "failed to walk cache root");
            return Vec::new();
        }
    };

    walked
        .into_iter()
        .map(|walk_entry| Discovered {
            entry: CacheEntry::from_shockwave_file(
                walk_entry.path,
                String::new(),
                shockwave::VersionResource::default(),
                None,
                None,
            ),
            subdirectory: None,
        })
        .collect()
}
