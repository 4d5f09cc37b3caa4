use unicode_segmentation::UnicodeSegmentation;

/// A string carrying both a code-unit count (UTF-16 code units, matching
/// the source's `TCHAR`-based storage size) and a user-visible character
/// count (grapheme clusters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Text {
    inner: String,
}

impl Text {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Storage size, in UTF-16 code units.
    pub fn code_count(&self) -> usize {
        self.inner.encode_utf16().count()
    }

    /// User-visible character count, in grapheme clusters.
    pub fn char_count(&self) -> usize {
        self.inner.graphemes(true).count()
    }

    /// Slice by grapheme-cluster index, clamped to bounds.
    pub fn char_slice(&self, start: usize, end: usize) -> &str {
        let graphemes: Vec<(usize, &str)> = self.inner.grapheme_indices(true).collect();
        let len = graphemes.len();
        let start = start.min(len);
        let end = end.min(len).max(start);

        let byte_start = graphemes.get(start).map(|(i, _)| *i).unwrap_or(self.inner.len());
        let byte_end = graphemes.get(end).map(|(i, _)| *i).unwrap_or(self.inner.len());
        &self.inner[byte_start..byte_end]
    }

    /// The first grapheme cluster, if any.
    pub fn char_at(&self, index: usize) -> Option<&str> {
        self.inner.graphemes(true).nth(index)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn into_string(self) -> String {
        self.inner
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s.to_owned())
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl std::ops::Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_counts_match() {
        let t = Text::new("hello");
        assert_eq!(t.code_count(), 5);
        assert_eq!(t.char_count(), 5);
    }

    #[test]
    fn combining_marks_reduce_char_count_relative_to_code_units() {
        // "e" + combining acute accent: two Unicode scalars, one code unit
        // count of 2, but a single grapheme cluster.
        let t = Text::new("e\u{0301}");
        assert_eq!(t.char_count(), 1);
        assert_eq!(t.code_count(), 2);
    }

    #[test]
    fn char_slice_clamps_to_bounds() {
        let t = Text::new("hello");
        assert_eq!(t.char_slice(1, 3), "el");
        assert_eq!(t.char_slice(0, 100), "hello");
        assert_eq!(t.char_slice(10, 20), "");
    }
}
