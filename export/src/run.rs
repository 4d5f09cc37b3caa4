//! Process-wide export configuration and per-format bookkeeping.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::batch::FormatFlag;
use crate::error::{Error, Result};

const DEFAULT_OUTPUT_DIR: &str = "ExportedCache";
const DEFAULT_TEMPORARY_DIR: &str = ".temp";

/// Immutable, process-wide export configuration, built once at startup
/// from CLI options or a batch descriptor and never mutated afterward.
#[derive(Debug, Clone)]
pub struct ExportRun {
    pub formats: HashSet<FormatFlag>,
    pub input_path: Option<PathBuf>,
    pub batch_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub temporary_path: PathBuf,
    pub positive_filter: Vec<String>,
    pub negative_filter: Vec<String>,
    pub ignore_filter: HashSet<FormatFlag>,
    pub copy_files: bool,
    pub create_manifest: bool,
    pub decompress: bool,
    pub group_origin: bool,
    pub auto_confirm: bool,
}

/// Builds an [`ExportRun`], validating the option combinations spec.md
/// requires: exactly one format for single-path mode, an output
/// directory distinct from the current working directory, and no
/// simultaneous `input_path`/`batch_path`.
#[derive(Debug, Default)]
pub struct ExportRunBuilder {
    formats: HashSet<FormatFlag>,
    input_path: Option<PathBuf>,
    batch_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    temporary_path: Option<PathBuf>,
    positive_filter: Vec<String>,
    negative_filter: Vec<String>,
    ignore_filter: HashSet<FormatFlag>,
    copy_files: bool,
    create_manifest: bool,
    decompress: bool,
    group_origin: bool,
    auto_confirm: bool,
}

impl ExportRunBuilder {
    pub fn new() -> Self {
        Self {
            copy_files: true,
            create_manifest: true,
            decompress: true,
            ..Default::default()
        }
    }

    pub fn format(mut self, format: FormatFlag) -> Self {
        self.formats.insert(format);
        self
    }

    pub fn input_path(mut self, path: PathBuf) -> Self {
        self.input_path = Some(path);
        self
    }

    pub fn batch_path(mut self, path: PathBuf) -> Self {
        self.batch_path = Some(path);
        self
    }

    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn temporary_path(mut self, path: PathBuf) -> Self {
        self.temporary_path = Some(path);
        self
    }

    pub fn positive_filter(mut self, labels: Vec<String>) -> Self {
        self.positive_filter = labels;
        self
    }

    pub fn negative_filter(mut self, labels: Vec<String>) -> Self {
        self.negative_filter = labels;
        self
    }

    pub fn ignore_filter(mut self, formats: HashSet<FormatFlag>) -> Self {
        self.ignore_filter = formats;
        self
    }

    pub fn copy_files(mut self, value: bool) -> Self {
        self.copy_files = value;
        self
    }

    pub fn create_manifest(mut self, value: bool) -> Self {
        self.create_manifest = value;
        self
    }

    pub fn decompress(mut self, value: bool) -> Self {
        self.decompress = value;
        self
    }

    pub fn group_origin(mut self, value: bool) -> Self {
        self.group_origin = value;
        self
    }

    pub fn auto_confirm(mut self, value: bool) -> Self {
        self.auto_confirm = value;
        self
    }

    pub fn build(self) -> Result<ExportRun> {
        if self.input_path.is_some() && self.batch_path.is_some() {
            return Err(Error::ConflictingOptions(
                "input_path and batch_path cannot both be set".to_string(),
            ));
        }

        if self.input_path.is_none() && self.batch_path.is_none() {
            return Err(Error::MissingMandatoryOption("input_path or batch_path"));
        }

        if self.input_path.is_some() && self.formats.len() != 1 {
            return Err(Error::SinglePathFormatCount(self.formats.len()));
        }

        let output_path = self.output_path.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let temporary_path = self.temporary_path.unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPORARY_DIR));

        if let Ok(current_dir) = std::env::current_dir() {
            if let Ok(absolute_output) = paths::absolute(&output_path) {
                if absolute_output == current_dir {
                    return Err(Error::OutputIsWorkingDirectory);
                }
            }
        }

        Ok(ExportRun {
            formats: self.formats,
            input_path: self.input_path,
            batch_path: self.batch_path,
            output_path,
            temporary_path,
            positive_filter: self.positive_filter,
            negative_filter: self.negative_filter,
            ignore_filter: self.ignore_filter,
            copy_files: self.copy_files,
            create_manifest: self.create_manifest,
            decompress: self.decompress,
            group_origin: self.group_origin,
            auto_confirm: self.auto_confirm,
        })
    }
}

/// Per-format bookkeeping: the current format's output subdirectory and
/// running counters. `begin`/`end` must balance exactly one-to-one; an
/// unbalanced pair is a programmer error caught by the debug assertion in
/// `Drop`.
pub struct FormatState {
    pub format: FormatFlag,
    pub output_subdir: PathBuf,
    pub found: u64,
    pub exported: u64,
    pub excluded: u64,
    began: bool,
}

impl FormatState {
    pub fn begin(format: FormatFlag, output_subdir: PathBuf) -> Self {
        tracing::info!(?format, "beginning format");
        Self {
            format,
            output_subdir,
            found: 0,
            exported: 0,
            excluded: 0,
            began: true,
        }
    }

    pub fn record_found(&mut self) {
        self.found += 1;
    }

    pub fn record_exported(&mut self) {
        self.exported += 1;
    }

    pub fn record_excluded(&mut self) {
        self.excluded += 1;
    }

    pub fn end(mut self) {
        tracing::info!(
            format = ?self.format,
            found = self.found,
            exported = self.exported,
            excluded = self.excluded,
            "ended format"
        );
        self.began = false;
    }
}

impl Drop for FormatState {
    fn drop(&mut self) {
        debug_assert!(!self.began, "FormatState for {:?} dropped without end()", self.format);
    }
}
