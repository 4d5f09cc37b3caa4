//! The virtual cache entry: whichever format parser produced it, every
//! entry is flattened into this one shape before the orchestrator's
//! filename/labeling/copy steps run. Each entry produces exactly one
//! manifest row.

use std::path::PathBuf;

use formats::mozilla::MozillaEntry;
use formats::shockwave::VersionResource;

/// A cache entry ready for export: source path, whatever metadata its
/// format parser recovered, and format-specific extras (Shockwave's
/// director-format classification and executable version resource).
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub input_path: PathBuf,
    pub filename: String,
    pub extension: Option<String>,
    pub url: Option<String>,
    pub origin: Option<String>,
    pub last_modified_time: Option<u32>,
    pub last_access_time: Option<u32>,
    pub expiry_time: Option<u32>,
    pub access_count: Option<u32>,
    pub response: Option<String>,
    pub server: Option<String>,
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub content_range: Option<String>,
    pub content_encoding: Option<String>,
    pub browser: Option<String>,
    pub profile: Option<String>,
    pub version: Option<String>,
    pub director_format: Option<String>,
    pub xtra: Option<VersionResource>,
    /// Bytes at the front of `input_path` that are the actual payload
    /// (Mozilla entries carry trailing metadata past this point; for a
    /// plain walked file the whole file is payload).
    pub payload_size: Option<u64>,
}

impl From<MozillaEntry> for CacheEntry {
    fn from(entry: MozillaEntry) -> Self {
        Self {
            input_path: PathBuf::from(entry.input_path),
            filename: entry.filename,
            extension: entry.extension,
            url: entry.url,
            origin: entry.origin,
            last_modified_time: Some(entry.last_modified_time),
            last_access_time: Some(entry.last_access_time),
            expiry_time: Some(entry.expiry_time),
            access_count: Some(entry.access_count),
            response: entry.response,
            server: entry.server,
            cache_control: entry.cache_control,
            pragma: entry.pragma,
            content_type: entry.content_type,
            content_length: entry.content_length,
            content_range: entry.content_range,
            content_encoding: entry.content_encoding,
            browser: entry.browser,
            profile: entry.profile,
            version: Some(entry.version),
            director_format: None,
            xtra: None,
            payload_size: Some(entry.payload_size),
        }
    }
}

impl CacheEntry {
    /// Build an entry for a plain walked/Shockwave-support file: no
    /// cache-format metadata, just a source path and whatever the
    /// director-format classifier and version-resource reader recovered.
    pub fn from_shockwave_file(
        path: PathBuf,
        director_format: String,
        xtra: VersionResource,
        browser: Option<String>,
        profile: Option<String>,
    ) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| !e.is_empty());
        let payload_size = std::fs::metadata(&path).ok().map(|m| m.len());

        Self {
            input_path: path,
            filename,
            extension,
            director_format: if director_format.is_empty() {
                None
            } else {
                Some(director_format)
            },
            xtra: Some(xtra),
            browser,
            profile,
            payload_size,
            ..Default::default()
        }
    }
}
