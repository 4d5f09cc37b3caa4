//! Parsers for the browser cache container formats this tool exports:
//! Gecko's `cache2` disk cache and Shockwave/Director's Xtra and cache
//! directories.

pub mod error;
pub mod http_headers;
pub mod mozilla;
pub mod shockwave;

pub use error::{Error, Result};
