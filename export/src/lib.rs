//! Export orchestrator: batch descriptor and key-path discovery, the
//! CSV manifest sink, URL decomposition, and the per-entry pipeline that
//! ties format parsers to labeling, filtering, and copy-out.

pub mod batch;
pub mod csv;
pub mod entry;
pub mod error;
pub mod fileinfo;
pub mod keypaths;
pub mod orchestrate;
pub mod run;
pub mod url;

pub use batch::{Batch, FormatFlag, Profile, SinglePathTask};
pub use entry::CacheEntry;
pub use error::{Error, Result};
pub use keypaths::{BatchKeyPathsSource, DefaultKeyPathsSource, KeyPaths, KeyPathsSource};
pub use orchestrate::{ExportOutcome, Orchestrator};
pub use run::{ExportRun, ExportRunBuilder, FormatState};
