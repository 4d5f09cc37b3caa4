use strings::{partition, Splitter};

use crate::error::{Error, Result};
use crate::types::{Domain, FileLabel, Label, LabelKind, Signature, UrlLabel};

const LINE_DELIMITERS: &str = "\r\n";
const SPACE_DELIMITERS: &str = " \t";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListType {
    None,
    Signatures,
    MimeTypes,
    Extensions,
    Domains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelType {
    None,
    File,
    Url,
}

struct InProgress {
    kind: LabelType,
    minor_name: String,
    file: FileLabel,
    url: UrlLabel,
}

impl InProgress {
    fn empty() -> Self {
        Self {
            kind: LabelType::None,
            minor_name: String::new(),
            file: FileLabel::default(),
            url: UrlLabel::default(),
        }
    }
}

fn parse_signature_line(line: &str, path: &str) -> Result<Signature> {
    let mut bytes = Vec::new();
    let mut wildcards = Vec::new();
    for token in Splitter::new(line, SPACE_DELIMITERS).collect_all() {
        if token == "__" {
            bytes.push(0u8);
            wildcards.push(true);
        } else if let Ok(byte) = u8::from_str_radix(token, 16) {
            bytes.push(byte);
            wildcards.push(false);
        } else {
            return Err(Error::InvalidSignatureByte {
                value: token.to_string(),
                path: path.to_string(),
            });
        }
    }
    Ok(Signature { bytes, wildcards })
}

fn parse_domain_line(line: &str) -> Domain {
    let (host, _, path) = partition(line, "/");
    Domain {
        host: host.to_string(),
        path: path.to_string(),
    }
}

/// Parse one label-file's contents into a list of [`Label`]s. Mirrors the
/// source grammar: an optional `NAME` directive scopes every label that
/// follows it in the same file, then any number of
/// `BEGIN_FILE <name> ... END` / `BEGIN_URL <name> ... END` blocks, each
/// containing `BEGIN_SIGNATURES`/`BEGIN_MIME_TYPES`/`BEGIN_EXTENSIONS`/
/// `BEGIN_DOMAINS` sublists terminated by their own `END`.
pub fn parse(content: &str, path: &str) -> Result<Vec<Label>> {
    let mut labels = Vec::new();
    let mut major_name = String::new();
    let mut list_type = ListType::None;
    let mut current = InProgress::empty();

    for raw_line in Splitter::new(content, LINE_DELIMITERS).keep_empty(true).collect_all() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line == "END" {
            if list_type != ListType::None {
                list_type = ListType::None;
                continue;
            } else if current.kind != LabelType::None {
                let kind = match current.kind {
                    LabelType::File => LabelKind::File(current.file),
                    LabelType::Url => LabelKind::Url(current.url),
                    LabelType::None => unreachable!(),
                };
                labels.push(Label {
                    major_name: String::new(),
                    minor_name: current.minor_name,
                    kind,
                });
                current = InProgress::empty();
                continue;
            } else {
                return Err(Error::UnexpectedEnd(path.to_string()));
            }
        }

        if current.kind != LabelType::None {
            match current.kind {
                LabelType::File => {
                    if list_type != ListType::None {
                        match list_type {
                            ListType::Signatures => {
                                current.file.signatures.push(parse_signature_line(line, path)?);
                            }
                            ListType::MimeTypes => {
                                current.file.mime_types.push(line.to_string());
                            }
                            ListType::Extensions => {
                                for token in Splitter::new(line, SPACE_DELIMITERS).collect_all() {
                                    current.file.extensions.push(token.to_string());
                                }
                            }
                            _ => unreachable!("unhandled file list type"),
                        }
                    } else if line == "BEGIN_SIGNATURES" {
                        list_type = ListType::Signatures;
                    } else if line == "BEGIN_MIME_TYPES" {
                        list_type = ListType::MimeTypes;
                    } else if line == "BEGIN_EXTENSIONS" {
                        list_type = ListType::Extensions;
                    } else {
                        let (directive, delim, value) = partition(line, SPACE_DELIMITERS);
                        if directive == "DEFAULT_EXTENSION" {
                            if delim.is_none() {
                                return Err(Error::MissingValue {
                                    directive: directive.to_string(),
                                    path: path.to_string(),
                                });
                            }
                            current.file.default_extension = Some(value.trim().to_string());
                        } else {
                            return Err(Error::UnknownDirective {
                                directive: directive.to_string(),
                                path: path.to_string(),
                            });
                        }
                    }
                }
                LabelType::Url => {
                    if list_type != ListType::None {
                        match list_type {
                            ListType::Domains => {
                                current.url.domains.push(parse_domain_line(line));
                            }
                            _ => unreachable!("unhandled URL list type"),
                        }
                    } else if line == "BEGIN_DOMAINS" {
                        list_type = ListType::Domains;
                    } else {
                        return Err(Error::UnknownDirective {
                            directive: line.to_string(),
                            path: path.to_string(),
                        });
                    }
                }
                LabelType::None => unreachable!(),
            }
        } else {
            let (directive, delim, value) = partition(line, SPACE_DELIMITERS);
            if delim.is_none() {
                return Err(Error::MissingValue {
                    directive: directive.to_string(),
                    path: path.to_string(),
                });
            }
            let value = value.trim();

            if directive == "NAME" {
                major_name = value.to_string();
            } else if directive == "BEGIN_FILE" {
                current.kind = LabelType::File;
                current.minor_name = value.to_string();
            } else if directive == "BEGIN_URL" {
                current.kind = LabelType::Url;
                current.minor_name = value.to_string();
            } else {
                return Err(Error::UnknownDirective {
                    directive: directive.to_string(),
                    path: path.to_string(),
                });
            }
        }
    }

    if list_type != ListType::None {
        return Err(Error::UnterminatedList(path.to_string()));
    }
    if current.kind != LabelType::None {
        return Err(Error::UnterminatedLabel(path.to_string()));
    }

    for label in &mut labels {
        label.major_name = major_name.clone();
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_file_label_with_all_sublists() {
        let content = "\
NAME Documents
BEGIN_FILE PDF
BEGIN_SIGNATURES
25 50 44 46
END
BEGIN_MIME_TYPES
application/pdf
END
BEGIN_EXTENSIONS
pdf
END
DEFAULT_EXTENSION pdf
END
";
        let labels = parse(content, "test.txt").unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].major_name, "Documents");
        assert_eq!(labels[0].minor_name, "PDF");
        let LabelKind::File(file) = &labels[0].kind else {
            panic!("expected a file label");
        };
        assert_eq!(file.signatures[0].bytes, vec![0x25, 0x50, 0x44, 0x46]);
        assert_eq!(file.mime_types, vec!["application/pdf"]);
        assert_eq!(file.extensions, vec!["pdf"]);
        assert_eq!(file.default_extension.as_deref(), Some("pdf"));
    }

    #[test]
    fn parses_a_url_label_with_domains() {
        let content = "\
NAME Social
BEGIN_URL Example
BEGIN_DOMAINS
example.com/path
*.example.com
END
END
";
        let labels = parse(content, "test.txt").unwrap();
        let LabelKind::Url(url) = &labels[0].kind else {
            panic!("expected a URL label");
        };
        assert_eq!(url.domains.len(), 2);
        assert_eq!(url.domains[0].host, "example.com");
        assert_eq!(url.domains[0].path, "path");
        assert_eq!(url.domains[1].host, "*.example.com");
        assert_eq!(url.domains[1].path, "");
    }

    #[test]
    fn wildcard_signature_byte_is_zero_with_wildcard_flag() {
        let content = "\
BEGIN_FILE X
BEGIN_SIGNATURES
__ __ 00
END
END
";
        let labels = parse(content, "test.txt").unwrap();
        let LabelKind::File(file) = &labels[0].kind else {
            panic!()
        };
        assert_eq!(file.signatures[0].wildcards, vec![true, true, false]);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let content = "\
# a comment

BEGIN_FILE X

# another comment
BEGIN_EXTENSIONS
txt
END
END
";
        let labels = parse(content, "test.txt").unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn unterminated_label_is_an_error() {
        let content = "BEGIN_FILE X\n";
        assert!(parse(content, "test.txt").is_err());
    }

    #[test]
    fn unknown_directive_is_an_error() {
        let content = "NONSENSE foo\n";
        assert!(parse(content, "test.txt").is_err());
    }

    #[test]
    fn multiple_labels_share_the_same_major_name() {
        let content = "\
NAME Images
BEGIN_FILE PNG
BEGIN_EXTENSIONS
png
END
END
BEGIN_FILE JPEG
BEGIN_EXTENSIONS
jpg jpeg
END
END
";
        let labels = parse(content, "test.txt").unwrap();
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|l| l.major_name == "Images"));
    }
}
