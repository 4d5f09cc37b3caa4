//! Length-tagged strings with both a code-unit count (storage size) and a
//! user-visible grapheme-cluster count, plus a stateful splitter and a
//! simple builder.
//!
//! Case-insensitive comparison and case mapping are delegated to
//! [`str::to_lowercase`]/[`str::eq_ignore_ascii_case`] rather than to an OS
//! locale service: almost everything this tool compares case-insensitively
//! (paths, MIME types, extensions, header names, hostnames) is ASCII
//! structural text, and pinning to Rust's stable Unicode case-folding
//! tables keeps behavior identical across hosts without an FFI locale
//! binding. See DESIGN.md for this Open Question's resolution.

mod builder;
mod split;
mod text;

pub use builder::Builder;
pub use split::{partition, Split, Splitter};
pub use text::Text;

/// Case-insensitive equality over the comparable ASCII-heavy domains this
/// tool handles (paths, extensions, hostnames, MIME prefixes).
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.len() == b.len() && a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive prefix test.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    if haystack.is_ascii() && prefix.is_ascii() {
        return haystack.len() >= prefix.len()
            && haystack[..prefix.len()].eq_ignore_ascii_case(prefix);
    }
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}
