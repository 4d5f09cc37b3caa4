use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected END directive in '{0}'")]
    UnexpectedEnd(String),

    #[error("unknown directive '{directive}' in '{path}'")]
    UnknownDirective { directive: String, path: String },

    #[error("missing value for directive '{directive}' in '{path}'")]
    MissingValue { directive: String, path: String },

    #[error("invalid signature byte '{value}' in '{path}'")]
    InvalidSignatureByte { value: String, path: String },

    #[error("unterminated list in '{0}'")]
    UnterminatedList(String),

    #[error("unterminated label in '{0}'")]
    UnterminatedLabel(String),
}
