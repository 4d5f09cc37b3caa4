use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot memory-map an empty file: {0}")]
    EmptyFile(std::path::PathBuf),

    #[error("writer is not open")]
    WriterClosed,
}
