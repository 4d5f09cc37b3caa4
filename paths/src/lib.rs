//! Path-string parsing, filesystem-safe rewriting, real-filesystem
//! comparison, and a stack-based directory walker. Path parsing and
//! rewriting operate on plain strings rather than `std::path::Path`
//! since they frequently describe a machine other than the one running
//! the export (batch-mode key paths, cache keys recorded on a different
//! host); only [`compare`] and [`walk`] touch the local filesystem.

mod compare;
mod error;
mod parse;
mod safe;
mod walk;

pub use compare::{absolute, eq, same_file, unique_directories};
pub use error::{Error, Result};
pub use parse::{join, parse, Parsed};
pub use safe::{safe, MAX_COMPONENT_LEN};
pub use walk::{EntryKind, WalkEntry, Walker};
