use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported cache index version {0}")]
    UnsupportedIndexVersion(u32),

    #[error("unsupported metadata version {0} in '{1}'")]
    UnsupportedMetadataVersion(u32, String),

    #[error("metadata offset {offset:#010x} goes past the end of '{path}' ({size} bytes)")]
    MetadataOffsetOutOfRange {
        offset: u32,
        size: u64,
        path: String,
    },

    #[error("metadata in '{path}' is {actual} bytes, expected at least {expected}")]
    MetadataTooSmall {
        path: String,
        expected: u64,
        actual: i64,
    },

    #[error("not a recognized Mozilla cache directory: '{0}'")]
    NotAMozillaCache(String),
}
