//! Decodes the `Content-Encoding` chains found on cached HTTP responses:
//! gzip/zlib/raw-deflate via `flate2`, Brotli via the `brotli` crate, and
//! a from-scratch decoder for the `compress`/ncompress Unix utility's LZW
//! format, since no maintained crate implements that legacy format.

mod brotli_stage;
mod chain;
mod error;
mod lzw;
mod zlib;

pub use chain::decode;
pub use error::{Error, Result};
