/// A byte pattern used for file-signature matching. Each position is
/// either a literal byte to match or a wildcard (`__` in the label-file
/// grammar) that matches anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub bytes: Vec<u8>,
    pub wildcards: Vec<bool>,
}

impl Signature {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether `data` matches this signature at offset 0. Shorter-than-pattern
    /// data never matches; the pattern may be shorter than `data`, in which
    /// case only the overlapping prefix is compared.
    pub fn matches(&self, data: &[u8]) -> bool {
        if self.bytes.len() > data.len() {
            return false;
        }
        self.bytes
            .iter()
            .zip(self.wildcards.iter())
            .zip(data.iter())
            .all(|((byte, wildcard), actual)| *wildcard || byte == actual)
    }
}

/// A host/path pair from a `BEGIN_DOMAINS` list. `host` is matched as
/// reversed dot-separated labels (most-specific first); `path` is
/// matched as a case-insensitive prefix of the URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub host: String,
    pub path: String,
}

/// One entry of a `BEGIN_FILE ... END` block: a set of signatures, MIME
/// type prefixes, and extensions, any one of which identifies a file as
/// belonging to this label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileLabel {
    pub signatures: Vec<Signature>,
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
    pub default_extension: Option<String>,
}

/// One entry of a `BEGIN_URL ... END` block: a set of domains, any one of
/// which identifies a URL as belonging to this label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlLabel {
    pub domains: Vec<Domain>,
}

/// A loaded label: the `NAME` directive's value for the enclosing file
/// (`major_name`), the `BEGIN_FILE`/`BEGIN_URL` value (`minor_name`), and
/// the file- or URL-specific match data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub major_name: String,
    pub minor_name: String,
    pub kind: LabelKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelKind {
    File(FileLabel),
    Url(UrlLabel),
}

impl Label {
    pub fn is_file(&self) -> bool {
        matches!(self.kind, LabelKind::File(_))
    }

    pub fn is_url(&self) -> bool {
        matches!(self.kind, LabelKind::Url(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_with_wildcards() {
        let sig = Signature {
            bytes: vec![0x25, 0x50, 0x44, 0x46],
            wildcards: vec![false, false, false, false],
        };
        assert!(sig.matches(b"%PDF-1.4"));
        assert!(!sig.matches(b"%PNF-1.4"));
    }

    #[test]
    fn signature_wildcard_matches_anything() {
        let sig = Signature {
            bytes: vec![0x00, 0x00],
            wildcards: vec![true, false],
        };
        assert!(sig.matches(&[0xFF, 0x00]));
        assert!(!sig.matches(&[0xFF, 0x01]));
    }

    #[test]
    fn signature_longer_than_data_never_matches() {
        let sig = Signature {
            bytes: vec![1, 2, 3],
            wildcards: vec![false, false, false],
        };
        assert!(!sig.matches(&[1, 2]));
    }
}
