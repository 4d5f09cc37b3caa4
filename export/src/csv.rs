//! CSV manifest sink: one row per exported cache entry, written with a
//! fixed, format-spanning column list so Mozilla and Shockwave rows can
//! share a single file. Columns the current row has nothing for are left
//! blank rather than omitted, keeping every row the same width.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;

/// Column order is significant: it is the file's header row and must
/// never change without a new manifest version, since existing manifests
/// are appended to rather than rewritten.
pub const COLUMNS: &[&str] = &[
    "Filename",
    "Extension",
    "URL",
    "Origin",
    "Last Modified Time",
    "Creation Time",
    "Last Write Time",
    "Last Access Time",
    "Expiry Time",
    "Access Count",
    "Response",
    "Server",
    "Cache Control",
    "Pragma",
    "Content Type",
    "Content Length",
    "Content Range",
    "Content Encoding",
    "Browser",
    "Profile",
    "Version",
    "Found",
    "Input Path",
    "Input Size",
    "Decompressed",
    "Exported",
    "Output Path",
    "Output Size",
    "Major File Label",
    "Minor File Label",
    "Major URL Label",
    "Minor URL Label",
    "Major Origin Label",
    "Minor Origin Label",
    "SHA-256",
    "Format",
    "Mode",
    "Excluded",
    "Director Format",
    "Xtra Description",
    "Xtra Version",
    "Xtra Copyright",
];

const LINE_TERMINATOR: &str = "\r\n";

/// A single manifest row: column name to value, built up by the
/// orchestrator as each step of export learns more about an entry.
/// Columns absent from the map are written out empty.
#[derive(Debug, Clone, Default)]
pub struct Row(pub HashMap<&'static str, String>);

impl Row {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<String>) {
        self.0.insert(column, value.into());
    }
}

/// Quote a CSV field if it contains a comma, double quote, or newline,
/// doubling any interior quotes. Fields needing no escaping are returned
/// unchanged.
pub fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
        out
    } else {
        value.to_string()
    }
}

/// Appends manifest rows to a CSV file, writing the header exactly once
/// (skipped entirely if the file already exists, so multiple export runs
/// into the same manifest keep appending rows under one header).
pub struct Sink {
    file: fs::File,
}

impl Sink {
    pub fn open(path: &Path) -> Result<Self> {
        let add_header = !path.is_file();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        if add_header {
            let header: Vec<String> = COLUMNS.iter().map(|c| escape(c)).collect();
            write!(file, "{}{}", header.join(","), LINE_TERMINATOR)?;
        }

        Ok(Self { file })
    }

    pub fn write_row(&mut self, row: &Row) -> io::Result<()> {
        let mut fields = Vec::with_capacity(COLUMNS.len());
        for column in COLUMNS {
            let value = row.0.get(column).map(String::as_str).unwrap_or("");
            fields.push(escape(value));
        }
        write!(self.file, "{}{}", fields.join(","), LINE_TERMINATOR)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn leaves_plain_fields_unescaped() {
        assert_eq!(escape("abc"), "abc");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn quotes_fields_with_a_comma() {
        assert_eq!(escape("abc,def"), "\"abc,def\"");
    }

    #[test]
    fn quotes_fields_with_a_newline() {
        assert_eq!(escape("abc\ndef"), "\"abc\ndef\"");
    }

    #[test]
    fn doubles_interior_quotes() {
        assert_eq!(escape("abc\"def"), "\"abc\"\"def\"");
    }

    #[test]
    fn writes_header_once_across_multiple_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");

        {
            let mut sink = Sink::open(&path).unwrap();
            let mut row = Row::new();
            row.set("Filename", "a.bin");
            sink.write_row(&row).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = Sink::open(&path).unwrap();
            let mut row = Row::new();
            row.set("Filename", "b.bin");
            sink.write_row(&row).unwrap();
            sink.flush().unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Filename").count(), 1);
        assert!(contents.contains("a.bin"));
        assert!(contents.contains("b.bin"));
        assert!(contents.contains("\r\n"));
    }

    #[test]
    fn missing_columns_are_emitted_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        let mut sink = Sink::open(&path).unwrap();
        let mut row = Row::new();
        row.set("Filename", "only.bin");
        sink.write_row(&row).unwrap();
        sink.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let data_line = contents.lines().nth(1).unwrap();
        assert_eq!(data_line.matches(',').count(), COLUMNS.len() - 1);
    }
}
