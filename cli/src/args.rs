//! Command-line surface: translates `clap`-parsed options into an
//! [`export::ExportRunBuilder`], following the option table spec.md's
//! external-interfaces section lays out (formats, single-path vs. batch
//! mode, filters, and the copy/manifest/decompress/group-origin toggles).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use export::{ExportRunBuilder, FormatFlag};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "cache-forensics",
    about = "Discover, label, and export browser and plugin disk caches to a CSV manifest",
    version
)]
pub struct Cli {
    /// One cache/plugin root to export; requires exactly one `--format`.
    #[arg(long, conflicts_with = "batch")]
    pub input: Option<PathBuf>,

    /// A batch descriptor naming multiple roots and foreign-machine
    /// key-path profiles; conflicts with `--input`.
    #[arg(long, conflicts_with = "input")]
    pub batch: Option<PathBuf>,

    /// Format to export from `--input`; repeat to export several formats
    /// from a batch descriptor's profiles.
    #[arg(long = "format", value_enum)]
    pub formats: Vec<FormatArg>,

    /// Shorthand for `--format wininet --format mozilla`.
    #[arg(long)]
    pub browsers: bool,

    /// Shorthand for `--format flash --format shockwave --format java --format unity`.
    #[arg(long)]
    pub plugins: bool,

    /// Shorthand for every supported format.
    #[arg(long)]
    pub all: bool,

    /// Directory the manifest and copied payloads are written under.
    #[arg(long, default_value = "ExportedCache")]
    pub output: PathBuf,

    /// Scratch directory for decompression and bounded-payload staging.
    #[arg(long, default_value = ".temp")]
    pub temp: PathBuf,

    /// Directory of `*.txt` label rule files.
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Only export entries carrying one of these label names.
    #[arg(long = "include-label")]
    pub positive_filter: Vec<String>,

    /// Exclude entries carrying one of these label names.
    #[arg(long = "exclude-label")]
    pub negative_filter: Vec<String>,

    /// Formats exempt from `--include-label`/`--exclude-label`.
    #[arg(long = "ignore-filter-for", value_enum)]
    pub ignore_filter: Vec<FormatArg>,

    /// Skip copying payloads out; still labels and logs them.
    #[arg(long)]
    pub no_copy_files: bool,

    /// Skip writing the CSV manifest.
    #[arg(long)]
    pub no_manifest: bool,

    /// Skip decompressing `Content-Encoding`d payloads before hashing/labeling.
    #[arg(long)]
    pub no_decompress: bool,

    /// Group copied-out files under a directory named for the entry's origin.
    #[arg(long)]
    pub group_origin: bool,

    /// Proceed without an interactive confirmation prompt.
    #[arg(long)]
    pub yes: bool,

    /// Full diagnostic log destination.
    #[arg(long, default_value = "export.log")]
    pub log_file: PathBuf,

    /// Console verbosity.
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Walk,
    Wininet,
    Mozilla,
    Flash,
    Shockwave,
    Java,
    Unity,
}

impl From<FormatArg> for FormatFlag {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Walk => FormatFlag::Walk,
            FormatArg::Wininet => FormatFlag::Wininet,
            FormatArg::Mozilla => FormatFlag::Mozilla,
            FormatArg::Flash => FormatFlag::Flash,
            FormatArg::Shockwave => FormatFlag::Shockwave,
            FormatArg::Java => FormatFlag::Java,
            FormatArg::Unity => FormatFlag::Unity,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

const BROWSER_FORMATS: &[FormatArg] = &[FormatArg::Wininet, FormatArg::Mozilla];
const PLUGIN_FORMATS: &[FormatArg] = &[
    FormatArg::Flash,
    FormatArg::Shockwave,
    FormatArg::Java,
    FormatArg::Unity,
];
const ALL_FORMATS: &[FormatArg] = &[
    FormatArg::Walk,
    FormatArg::Wininet,
    FormatArg::Mozilla,
    FormatArg::Flash,
    FormatArg::Shockwave,
    FormatArg::Java,
    FormatArg::Unity,
];

impl Cli {
    /// Expand `--browsers`/`--plugins`/`--all` and the repeated
    /// `--format` flags into one deduplicated set.
    pub fn selected_formats(&self) -> Vec<FormatArg> {
        let mut out = self.formats.clone();
        if self.browsers {
            out.extend_from_slice(BROWSER_FORMATS);
        }
        if self.plugins {
            out.extend_from_slice(PLUGIN_FORMATS);
        }
        if self.all {
            out.extend_from_slice(ALL_FORMATS);
        }
        out.sort_by_key(|f| *f as usize);
        out.dedup_by_key(|f| *f as usize);
        out
    }

    pub fn build_run_base(&self) -> ExportRunBuilder {
        let mut builder = ExportRunBuilder::new()
            .output_path(self.output.clone())
            .temporary_path(self.temp.clone())
            .positive_filter(self.positive_filter.clone())
            .negative_filter(self.negative_filter.clone())
            .ignore_filter(self.ignore_filter.iter().map(|f| FormatFlag::from(*f)).collect())
            .copy_files(!self.no_copy_files)
            .create_manifest(!self.no_manifest)
            .decompress(!self.no_decompress)
            .group_origin(self.group_origin)
            .auto_confirm(self.yes);

        for format in self.selected_formats() {
            builder = builder.format(FormatFlag::from(format));
        }
        if let Some(input) = &self.input {
            builder = builder.input_path(input.clone());
        }
        if let Some(batch) = &self.batch {
            builder = builder.batch_path(batch.clone());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browsers_flag_expands_to_wininet_and_mozilla() {
        let cli = Cli::parse_from(["cache-forensics", "--input", "/cache", "--browsers"]);
        let selected = cli.selected_formats();
        assert!(selected.contains(&FormatArg::Wininet));
        assert!(selected.contains(&FormatArg::Mozilla));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn repeated_format_flags_are_deduplicated() {
        let cli = Cli::parse_from([
            "cache-forensics",
            "--input",
            "/cache",
            "--format",
            "mozilla",
            "--format",
            "mozilla",
        ]);
        assert_eq!(cli.selected_formats(), vec![FormatArg::Mozilla]);
    }
}
