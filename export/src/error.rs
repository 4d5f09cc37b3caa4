use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ioutil(#[from] ioutil::Error),

    #[error(transparent)]
    Paths(#[from] paths::Error),

    #[error(transparent)]
    Decompress(#[from] decompress::Error),

    #[error(transparent)]
    Labels(#[from] labels::Error),

    #[error(transparent)]
    Formats(#[from] formats::Error),

    #[error("destination path exceeds the host path-length limit: '{0}'")]
    PathTooLong(String),

    #[error("could not resolve a unique destination for '{0}' after {1} collision retries")]
    CollisionUnresolvable(String, u32),

    #[error("missing mandatory option: {0}")]
    MissingMandatoryOption(&'static str),

    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("output directory must not be the current working directory")]
    OutputIsWorkingDirectory,

    #[error("malformed batch descriptor at line {line}: {message}")]
    MalformedBatch { line: usize, message: String },

    #[error("malformed label file '{path}': {message}")]
    MalformedLabelFile { path: String, message: String },

    #[error("single-path task requires exactly one format flag, got {0}")]
    SinglePathFormatCount(usize),

    #[error("unsupported cache version {0}")]
    UnsupportedVersion(u32),
}
