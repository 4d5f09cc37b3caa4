use crate::types::{Label, LabelKind};

/// Everything a file match needs to check a label against: the file's
/// leading bytes (for signature matching), an optional response MIME
/// type, and the file's extension (without the leading dot).
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMatchParams<'a> {
    pub signature_bytes: &'a [u8],
    pub mime_type: Option<&'a str>,
    pub extension: &'a str,
}

/// A loaded set of labels, queried by [`Matcher::match_file`] and
/// [`Matcher::match_url`].
pub struct Matcher {
    labels: Vec<Label>,
    max_signature_size: usize,
}

impl Matcher {
    pub fn new(labels: Vec<Label>) -> Self {
        let max_signature_size = labels
            .iter()
            .filter_map(|l| match &l.kind {
                LabelKind::File(f) => f.signatures.iter().map(|s| s.len()).max(),
                LabelKind::Url(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            labels,
            max_signature_size,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn max_signature_size(&self) -> usize {
        self.max_signature_size
    }

    /// Match a file against the loaded file labels in three tiers, in
    /// order: byte signature, then MIME-type prefix, then extension
    /// equality. The first tier to produce a match wins; tiers are not
    /// combined.
    pub fn match_file(&self, params: FileMatchParams<'_>) -> Option<&Label> {
        if !params.signature_bytes.is_empty() {
            for label in &self.labels {
                let LabelKind::File(file) = &label.kind else {
                    continue;
                };
                if file
                    .signatures
                    .iter()
                    .any(|sig| !sig.is_empty() && sig.matches(params.signature_bytes))
                {
                    return Some(label);
                }
            }
        }

        if let Some(mime_type) = params.mime_type {
            for label in &self.labels {
                let LabelKind::File(file) = &label.kind else {
                    continue;
                };
                if file
                    .mime_types
                    .iter()
                    .any(|prefix| mime_type.to_lowercase().starts_with(&prefix.to_lowercase()))
                {
                    return Some(label);
                }
            }
        }

        for label in &self.labels {
            let LabelKind::File(file) = &label.kind else {
                continue;
            };
            if file
                .extensions
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(params.extension))
            {
                return Some(label);
            }
        }

        None
    }

    /// Match a URL against the loaded URL labels. `host` and `path` are
    /// the URL's host and path components (path with or without a
    /// leading `/`; it is stripped before comparison).
    pub fn match_url(&self, host: &str, path: &str) -> Option<&Label> {
        let url_path = path.strip_prefix('/').unwrap_or(path);
        let param_components = reversed_labels(host);

        for label in &self.labels {
            let LabelKind::Url(url) = &label.kind else {
                continue;
            };

            for domain in &url.domains {
                let any_tld = domain.host.ends_with(".*");
                let label_components = reversed_labels(&domain.host);

                if host_matches(&label_components, &param_components, any_tld) {
                    let path_ok = url_path.to_lowercase().starts_with(&domain.path.to_lowercase());
                    if path_ok {
                        return Some(label);
                    }
                }
            }
        }

        None
    }
}

/// Split a dot-separated host into labels ordered most-specific first
/// (i.e. reversed: `"a.b.example.com"` -> `["com", "example", "b", "a"]`).
fn reversed_labels(host: &str) -> Vec<&str> {
    host.split('.').rev().collect()
}

/// Check whether `label_components` (a label's reversed host, itself
/// already reversed so index 0 is the TLD) matches `param_components`
/// (the query host, same ordering). A `*` component is always a
/// wildcard, wherever it falls: `*.example.com` reverses to
/// `["com", "example", "*"]`, with the wildcard trailing, so it matches
/// any subdomain of `example.com`; `example.*` (detected via `any_tld`)
/// reverses with the wildcard leading, and additionally tries inserting
/// a second synthetic leading wildcard so multi-label TLDs like
/// `co.uk` also match.
fn host_matches(label_components: &[&str], param_components: &[&str], any_tld: bool) -> bool {
    if label_components.len() <= param_components.len()
        && matches_with_wildcard(label_components, param_components)
    {
        return true;
    }

    if any_tld {
        let mut with_any_tld = Vec::with_capacity(label_components.len() + 1);
        with_any_tld.push("*");
        with_any_tld.extend_from_slice(label_components);

        if with_any_tld.len() <= param_components.len() {
            return matches_with_wildcard(&with_any_tld, param_components);
        }
    }

    false
}

fn matches_with_wildcard(label_components: &[&str], param_components: &[&str]) -> bool {
    for (k, label_component) in label_components.iter().enumerate() {
        if *label_component == "*" {
            continue;
        }
        if param_components[k] != *label_component {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Domain, FileLabel, LabelKind, Signature, UrlLabel};

    fn file_label(name: &str, file: FileLabel) -> Label {
        Label {
            major_name: "Major".to_string(),
            minor_name: name.to_string(),
            kind: LabelKind::File(file),
        }
    }

    fn url_label(name: &str, domains: Vec<Domain>) -> Label {
        Label {
            major_name: "Major".to_string(),
            minor_name: name.to_string(),
            kind: LabelKind::Url(UrlLabel { domains }),
        }
    }

    #[test]
    fn signature_match_takes_priority_over_extension() {
        let matcher = Matcher::new(vec![
            file_label(
                "ByExtension",
                FileLabel {
                    extensions: vec!["bin".to_string()],
                    ..Default::default()
                },
            ),
            file_label(
                "BySignature",
                FileLabel {
                    signatures: vec![Signature {
                        bytes: vec![0x25, 0x50, 0x44, 0x46],
                        wildcards: vec![false; 4],
                    }],
                    ..Default::default()
                },
            ),
        ]);

        let result = matcher
            .match_file(FileMatchParams {
                signature_bytes: b"%PDF-1.4",
                mime_type: None,
                extension: "bin",
            })
            .unwrap();
        assert_eq!(result.minor_name, "BySignature");
    }

    #[test]
    fn mime_type_match_is_a_case_insensitive_prefix() {
        let matcher = Matcher::new(vec![file_label(
            "HTML",
            FileLabel {
                mime_types: vec!["text/html".to_string()],
                ..Default::default()
            },
        )]);

        let result = matcher
            .match_file(FileMatchParams {
                signature_bytes: &[],
                mime_type: Some("TEXT/HTML; charset=utf-8"),
                extension: "html",
            })
            .unwrap();
        assert_eq!(result.minor_name, "HTML");
    }

    #[test]
    fn extension_match_is_the_last_resort() {
        let matcher = Matcher::new(vec![file_label(
            "Archive",
            FileLabel {
                extensions: vec!["zip".to_string()],
                ..Default::default()
            },
        )]);

        let result = matcher
            .match_file(FileMatchParams {
                signature_bytes: &[],
                mime_type: None,
                extension: "ZIP",
            })
            .unwrap();
        assert_eq!(result.minor_name, "Archive");
    }

    #[test]
    fn exact_host_match() {
        let matcher = Matcher::new(vec![url_label(
            "Example",
            vec![Domain {
                host: "example.com".to_string(),
                path: String::new(),
            }],
        )]);
        assert!(matcher.match_url("example.com", "/page").is_some());
        assert!(matcher.match_url("other.com", "/page").is_none());
    }

    #[test]
    fn leading_wildcard_matches_any_subdomain() {
        let matcher = Matcher::new(vec![url_label(
            "Example",
            vec![Domain {
                host: "*.example.com".to_string(),
                path: String::new(),
            }],
        )]);
        assert!(matcher.match_url("cdn.assets.example.com", "/x").is_some());
        assert!(matcher.match_url("example.com", "/x").is_none());
    }

    #[test]
    fn any_tld_wildcard_matches_alternate_tlds() {
        let matcher = Matcher::new(vec![url_label(
            "Example",
            vec![Domain {
                host: "example.*".to_string(),
                path: String::new(),
            }],
        )]);
        assert!(matcher.match_url("example.org", "/x").is_some());
        assert!(matcher.match_url("example.co.uk", "/x").is_some());
        assert!(matcher.match_url("notexample.org", "/x").is_none());
    }

    #[test]
    fn path_prefix_must_also_match() {
        let matcher = Matcher::new(vec![url_label(
            "Example",
            vec![Domain {
                host: "example.com".to_string(),
                path: "videos".to_string(),
            }],
        )]);
        assert!(matcher.match_url("example.com", "/videos/123").is_some());
        assert!(matcher.match_url("example.com", "/images/123").is_none());
    }
}
