//! The nine-step per-entry pipeline: filename derivation, row
//! population, conditional decompression, hashing, labeling, filtering,
//! copy-out, row emission, and arena cleanup.

use std::path::{Path, PathBuf};

use arena::{Region, ScopedCheckpoint};
use ioutil::{copy_file, read_first_chunk, ChunkReader, ChunkWriter, WriteMode};
use labels::{FileMatchParams, LabelKind, Matcher};

use crate::batch::FormatFlag;
use crate::csv::{self, Row};
use crate::entry::CacheEntry;
use crate::error::{Error, Result};
use crate::fileinfo::sha256_hex;
use crate::run::{ExportRun, FormatState};
use crate::url;

/// The host path-length limit destination construction must respect
/// before falling back to the synthesized-filename scheme. Windows'
/// classic `MAX_PATH`; kept as one constant across hosts so behavior
/// (and its tests) stay reproducible off Windows.
const MAX_PATH_LENGTH: usize = 260;

/// Destination collisions are retried with a `~N` suffix up to this many
/// times before falling back to the per-format directory with the
/// synthesized filename.
const COLLISION_RETRY_LIMIT: u32 = 1000;

/// What happened to one entry after running the pipeline.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub included: bool,
    pub exported: bool,
    pub output_path: Option<PathBuf>,
    pub output_size: Option<u64>,
}

pub struct Orchestrator<'a> {
    run: &'a ExportRun,
    matcher: &'a Matcher,
    transient: &'a Region,
    synthesized_counter: u32,
}

impl<'a> Orchestrator<'a> {
    pub fn new(run: &'a ExportRun, matcher: &'a Matcher, transient: &'a Region) -> Self {
        Self {
            run,
            matcher,
            transient,
            synthesized_counter: 0,
        }
    }

    fn synthesize_filename(&mut self) -> String {
        self.synthesized_counter += 1;
        format!("~WCE{:04}", self.synthesized_counter)
    }

    /// Copy the leading `bounded_len` bytes of `src` into a fresh temp
    /// file. Used when a format's on-disk entry carries trailing metadata
    /// (Mozilla's cache2 files) that must never reach hashing, labeling,
    /// or decompression.
    fn materialize_bounded_payload(&self, src: &Path, bounded_len: u64) -> Result<ChunkWriter> {
        let mut writer = ChunkWriter::create("payload", WriteMode::Temp { dir: &self.run.temporary_path })?;
        let mut reader = ChunkReader::begin(src, 0, None)?;
        let mut remaining = bounded_len;
        while remaining > 0 && reader.next()? {
            let data = reader.data();
            let take = data.len().min(remaining as usize);
            writer.write_next(&data[..take])?;
            remaining -= take as u64;
        }
        writer.flush()?;
        Ok(writer)
    }

    /// Run the full pipeline for one entry, writing a row to `sink` when
    /// the entry is kept and either copied or copy-out wasn't requested.
    pub fn export_next(
        &mut self,
        mut entry: CacheEntry,
        format: FormatFlag,
        format_short: &str,
        subdirectory: Option<&str>,
        state: &mut FormatState,
        sink: &mut csv::Sink,
    ) -> Result<ExportOutcome> {
        let _scope = ScopedCheckpoint::new(self.transient);
        state.record_found();

        // Step 1: filename derivation.
        let filename = self.derive_filename(&entry);

        // Step 2: row population.
        let mut row = Row::new();
        let found = entry.input_path.is_file();
        let full_len = std::fs::metadata(&entry.input_path).map(|m| m.len()).ok();
        populate_row(&mut row, &entry, &filename, found, full_len);

        // Bound the payload to `payload_size` when a format's entry
        // carries trailing metadata past the cached body.
        let mut temp_guards: Vec<ChunkWriter> = Vec::new();
        let mut payload_path = entry.input_path.clone();
        let mut payload_len = full_len.unwrap_or(0);
        if let Some(bounded) = entry.payload_size {
            if bounded < payload_len {
                let writer = self.materialize_bounded_payload(&entry.input_path, bounded)?;
                payload_path = writer.path().to_path_buf();
                payload_len = bounded;
                temp_guards.push(writer);
            }
        }

        // Step 3: conditional decompression.
        let mut decompressed = false;
        if self.run.decompress && payload_len > 0 {
            if let Some(encoding) = entry.content_encoding.clone().filter(|e| !e.is_empty()) {
                let mut writer = ChunkWriter::create("decoded", WriteMode::Temp { dir: &self.run.temporary_path })?;
                decompress::decode(&payload_path, &encoding, &mut writer, &self.run.temporary_path)?;
                writer.flush()?;
                payload_path = writer.path().to_path_buf();
                payload_len = std::fs::metadata(&payload_path).map(|m| m.len()).unwrap_or(0);
                decompressed = true;
                temp_guards.push(writer);
            }
        }
        row.set("Decompressed", if decompressed { "Yes" } else { "No" });

        // Step 4: hash.
        let hash = if payload_len > 0 {
            sha256_hex(&payload_path)?
        } else {
            String::new()
        };
        row.set("SHA-256", hash);

        // Step 5: labeling.
        let signature_bytes = if payload_len > 0 {
            read_first_chunk(&payload_path, self.matcher.max_signature_size()).unwrap_or_default()
        } else {
            Vec::new()
        };
        let file_label = self.matcher.match_file(FileMatchParams {
            signature_bytes: &signature_bytes,
            mime_type: entry.content_type.as_deref(),
            extension: entry.extension.as_deref().unwrap_or(""),
        });

        let parsed_url = entry.url.as_deref().map(url::parse);
        let url_label = parsed_url
            .as_ref()
            .and_then(|u| self.matcher.match_url(&u.host, &u.path));

        let parsed_origin = entry.origin.as_deref().map(url::parse);
        let origin_label = parsed_origin
            .as_ref()
            .and_then(|o| self.matcher.match_url(&o.host, ""));

        if let Some(label) = file_label {
            row.set("Major File Label", label.major_name.clone());
            row.set("Minor File Label", label.minor_name.clone());
        }
        if let Some(label) = url_label {
            row.set("Major URL Label", label.major_name.clone());
            row.set("Minor URL Label", label.minor_name.clone());
        }
        if let Some(label) = origin_label {
            row.set("Major Origin Label", label.major_name.clone());
            row.set("Minor Origin Label", label.minor_name.clone());
        }

        // Step 6: filter decision.
        let mentioned: Vec<&str> = [file_label, url_label]
            .into_iter()
            .flatten()
            .flat_map(|label| [label.major_name.as_str(), label.minor_name.as_str()])
            .collect();

        let included = if self.run.ignore_filter.contains(&format) {
            true
        } else if !self.run.positive_filter.is_empty() {
            label_set_intersects(&mentioned, &self.run.positive_filter)
        } else if !self.run.negative_filter.is_empty() {
            !label_set_intersects(&mentioned, &self.run.negative_filter)
        } else {
            true
        };

        row.set("Excluded", if included { "No" } else { "Yes" });
        row.set("Format", format_short);

        if !included {
            state.record_excluded();
            return Ok(ExportOutcome {
                included: false,
                exported: false,
                output_path: None,
                output_size: None,
            });
        }

        // Step 7: copy-out.
        let mut outcome_path = None;
        let mut outcome_size = None;
        let mut exported = false;

        if self.run.copy_files {
            let default_extension = file_label.and_then(|l| match &l.kind {
                LabelKind::File(f) => f.default_extension.clone(),
                LabelKind::Url(_) => None,
            });

            let (dest, size) = self.copy_out(
                &payload_path,
                payload_len,
                &entry,
                &filename,
                format_short,
                subdirectory,
                parsed_url.as_ref(),
                parsed_origin.as_ref(),
                default_extension.as_deref(),
            )?;

            row.set("Output Path", dest.to_string_lossy().into_owned());
            row.set("Output Size", size.to_string());
            outcome_path = Some(dest);
            outcome_size = Some(size);
            exported = true;
        }
        row.set("Exported", if exported { "Yes" } else { "No" });

        // Step 8: emit row.
        if exported || !self.run.copy_files {
            if self.run.create_manifest {
                sink.write_row(&row).map_err(Error::Io)?;
            }
            state.record_exported();
        }

        entry.input_path = payload_path;
        drop(temp_guards);

        // Step 9 (arena clear) happens via `_scope`'s Drop at the end of
        // this function.
        Ok(ExportOutcome {
            included: true,
            exported,
            output_path: outcome_path,
            output_size: outcome_size,
        })
    }

    fn derive_filename(&mut self, entry: &CacheEntry) -> String {
        if let Some(url) = entry.url.as_deref() {
            let parsed = url::parse(url);
            let tail = parsed.path.rsplit('/').next().unwrap_or("");
            if !tail.is_empty() {
                return tail.to_string();
            }
        }

        if let Some(name) = entry.input_path.file_name().and_then(|n| n.to_str()) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        self.synthesize_filename()
    }

    /// Push `raw` onto `dir` as one or more real directory components.
    /// [`paths::safe`] produces a single backslash-joined string (it
    /// describes a foreign, possibly-Windows machine); the orchestrator
    /// runs against the local filesystem, so each backslash-delimited
    /// piece becomes its own `PathBuf` component here.
    fn push_safe_path(dir: &mut PathBuf, raw: &str) {
        for component in paths::safe(raw).split('\\').filter(|c| !c.is_empty()) {
            dir.push(component);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_out(
        &mut self,
        payload_path: &Path,
        payload_len: u64,
        entry: &CacheEntry,
        filename: &str,
        format_short: &str,
        subdirectory: Option<&str>,
        parsed_url: Option<&url::Url>,
        parsed_origin: Option<&url::Url>,
        default_extension: Option<&str>,
    ) -> Result<(PathBuf, u64)> {
        let mut named = filename.to_string();
        if paths::parse(&named).extension.is_empty() {
            if let Some(ext) = default_extension.filter(|e| !e.is_empty()) {
                named = format!("{named}.{ext}");
            } else if let Some(ext) = entry.extension.as_deref().filter(|e| !e.is_empty()) {
                named = format!("{named}.{ext}");
            }
        }
        let safe_name = paths::safe(&named);

        let mut dir = self.run.output_path.join(format_short);
        if let Some(sub) = subdirectory {
            Self::push_safe_path(&mut dir, sub);
        }
        if self.run.group_origin {
            if let Some(origin) = parsed_origin {
                if !origin.host.is_empty() {
                    Self::push_safe_path(&mut dir, &origin.host);
                }
            }
        }
        if let Some(url) = parsed_url {
            if !url.host.is_empty() {
                Self::push_safe_path(&mut dir, &url.host);
            }
            let parent = paths::parse(&url.path).parent;
            if !parent.is_empty() {
                Self::push_safe_path(&mut dir, &parent);
            }
        }

        let fallback_dir = {
            let mut d = self.run.output_path.join(format_short);
            if let Some(sub) = subdirectory {
                Self::push_safe_path(&mut d, sub);
            }
            d
        };

        let candidate = dir.join(&safe_name);
        if candidate.to_string_lossy().len() > MAX_PATH_LENGTH {
            let synthesized = self.synthesize_filename();
            let dest = fallback_dir.join(synthesized);
            let size = copy_file(payload_path, &dest)?;
            return Ok((dest, size));
        }

        match self.try_copy_with_collisions(payload_path, &candidate) {
            Ok(dest) => {
                let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(payload_len);
                Ok((dest, size))
            }
            Err(_) => {
                let synthesized = self.synthesize_filename();
                let dest = fallback_dir.join(synthesized);
                let size = copy_file(payload_path, &dest)?;
                Ok((dest, size))
            }
        }
    }

    fn try_copy_with_collisions(&self, src: &Path, dest: &Path) -> Result<PathBuf> {
        if !dest.exists() {
            copy_file(src, dest)?;
            return Ok(dest.to_path_buf());
        }

        let parsed = paths::parse(&dest.to_string_lossy());
        for n in 1..=COLLISION_RETRY_LIMIT {
            let candidate_name = if parsed.extension.is_empty() {
                format!("{}~{n}", parsed.stem)
            } else {
                format!("{}~{n}.{}", parsed.stem, parsed.extension)
            };
            let candidate = dest.with_file_name(candidate_name);
            if !candidate.exists() {
                copy_file(src, &candidate)?;
                return Ok(candidate);
            }
        }

        Err(Error::CollisionUnresolvable(
            dest.to_string_lossy().into_owned(),
            COLLISION_RETRY_LIMIT,
        ))
    }
}

fn label_set_intersects(labels: &[&str], filter: &[String]) -> bool {
    labels
        .iter()
        .any(|label| filter.iter().any(|f| f.eq_ignore_ascii_case(label)))
}

fn populate_row(row: &mut Row, entry: &CacheEntry, filename: &str, found: bool, input_size: Option<u64>) {
    row.set("Filename", filename.to_string());
    row.set("Extension", entry.extension.clone().unwrap_or_default());
    row.set("URL", entry.url.clone().unwrap_or_default());
    row.set("Origin", entry.origin.clone().unwrap_or_default());
    if let Some(v) = entry.last_modified_time {
        row.set("Last Modified Time", v.to_string());
    }
    if let Some(v) = entry.last_access_time {
        row.set("Last Access Time", v.to_string());
    }
    if let Some(v) = entry.expiry_time {
        row.set("Expiry Time", v.to_string());
    }
    if let Some(v) = entry.access_count {
        row.set("Access Count", v.to_string());
    }
    row.set("Response", entry.response.clone().unwrap_or_default());
    row.set("Server", entry.server.clone().unwrap_or_default());
    row.set("Cache Control", entry.cache_control.clone().unwrap_or_default());
    row.set("Pragma", entry.pragma.clone().unwrap_or_default());
    row.set("Content Type", entry.content_type.clone().unwrap_or_default());
    row.set("Content Length", entry.content_length.clone().unwrap_or_default());
    row.set("Content Range", entry.content_range.clone().unwrap_or_default());
    row.set("Content Encoding", entry.content_encoding.clone().unwrap_or_default());
    row.set("Browser", entry.browser.clone().unwrap_or_default());
    row.set("Profile", entry.profile.clone().unwrap_or_default());
    row.set("Version", entry.version.clone().unwrap_or_default());
    row.set("Found", if found { "Yes" } else { "No" });
    row.set("Input Path", entry.input_path.to_string_lossy().into_owned());
    if let Some(size) = input_size {
        row.set("Input Size", size.to_string());
    }
    if let Some(director_format) = entry.director_format.clone() {
        row.set("Director Format", director_format);
    }
    if let Some(xtra) = &entry.xtra {
        row.set("Xtra Description", xtra.file_description.clone());
        row.set("Xtra Version", xtra.product_version.clone());
        row.set("Xtra Copyright", xtra.legal_copyright.clone());
    }
}
