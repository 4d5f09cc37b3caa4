//! Dual logging sinks: a human-readable console layer at the user's
//! chosen level, and a full-diagnostic log file that always receives
//! every event regardless of console verbosity. The log file is written
//! with CRLF line endings, matching the manifest's own line convention.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::error::{Error, Result};

/// Wraps a file so every `\n` written through it becomes `\r\n`, without
/// doubling a `\r` a caller already supplied.
struct CrlfFile(File);

impl Write for CrlfFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut last_was_cr = false;
        for &byte in buf {
            if byte == b'\n' && !last_was_cr {
                self.0.write_all(b"\r\n")?;
            } else {
                self.0.write_all(&[byte])?;
            }
            last_was_cr = byte == b'\r';
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[derive(Clone)]
pub struct CrlfLogWriter(Arc<Mutex<CrlfFile>>);

impl CrlfLogWriter {
    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::OpenLog {
                path: path.to_string_lossy().into_owned(),
                source,
            })?;
        Ok(Self(Arc::new(Mutex::new(CrlfFile(file)))))
    }
}

impl Write for CrlfLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log file mutex poisoned").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().expect("log file mutex poisoned").flush()
    }
}

impl<'a> MakeWriter<'a> for CrlfLogWriter {
    type Writer = CrlfLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global tracing subscriber: a console layer capped at
/// `console_level`, and a log-file layer that always runs at `TRACE` so
/// the file carries the full diagnostic record spec.md's error-handling
/// section calls for.
pub fn init(console_level: Level, log_path: &Path) -> Result<()> {
    let file_writer = CrlfLogWriter::open(log_path)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(LevelFilter::from_level(console_level));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
