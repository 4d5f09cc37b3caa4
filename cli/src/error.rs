use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Export(#[from] export::Error),

    #[error(transparent)]
    Labels(#[from] labels::Error),

    #[error("failed to read batch descriptor '{path}': {source}")]
    ReadBatch { path: String, source: std::io::Error },

    #[error("failed to open log file '{path}': {source}")]
    OpenLog { path: String, source: std::io::Error },
}
