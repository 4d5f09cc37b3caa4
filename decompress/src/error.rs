use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zlib/deflate decompression failed: {0}")]
    Zlib(String),

    #[error("brotli decompression failed: {0}")]
    Brotli(String),

    #[error("invalid compress signature {0:#04x}{1:#04x}")]
    InvalidLzwSignature(u8, u8),

    #[error("maximum compression bits {0} out of bounds ({1} to {2})")]
    LzwBitsOutOfBounds(u8, u8, u8),

    #[error("LZW index {index} out of bounds (0 to {max})")]
    LzwIndexOutOfBounds { index: u32, max: usize },

    #[error("unsupported content encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("chained decoding produced no output stage")]
    EmptyChain,
}
