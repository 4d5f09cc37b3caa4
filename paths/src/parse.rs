/// The parsed components of a path string. Operates on path strings
/// directly (rather than `std::path::Path`) since this tool frequently
/// handles paths describing a *foreign* machine (batch-mode key paths,
/// Mozilla cache keys) that are never passed to the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub parent: String,
    pub name: String,
    pub stem: String,
    pub extension: String,
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Parse `p` into `(parent, name, stem, extension)`. `extension` is the
/// portion of `name` after the last `.`, or empty if `name` has none.
pub fn parse(p: &str) -> Parsed {
    let last_sep = p.rfind(is_separator);
    let (parent, name) = match last_sep {
        Some(idx) => (p[..idx].to_string(), p[idx + 1..].to_string()),
        None => (String::new(), p.to_string()),
    };

    let (stem, extension) = match name.rfind('.') {
        Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx + 1..].to_string()),
        _ => (name.clone(), String::new()),
    };

    Parsed {
        parent,
        name,
        stem,
        extension,
    }
}

/// Join `base` and `component` with a single `\` separator, tolerating
/// either side already having one.
pub fn join(base: &str, component: &str) -> String {
    if component.is_empty() {
        return base.to_string();
    }
    if base.is_empty() {
        return component.to_string();
    }

    let base_trimmed = base.trim_end_matches(is_separator);
    let component_trimmed = component.trim_start_matches(is_separator);
    format!("{base_trimmed}\\{component_trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_parent_name_stem_extension() {
        let parsed = parse(r"C:\Users\me\file.tar.gz");
        assert_eq!(parsed.parent, r"C:\Users\me");
        assert_eq!(parsed.name, "file.tar.gz");
        assert_eq!(parsed.stem, "file.tar");
        assert_eq!(parsed.extension, "gz");
    }

    #[test]
    fn no_extension_is_empty() {
        let parsed = parse(r"C:\Users\me\README");
        assert_eq!(parsed.stem, "README");
        assert_eq!(parsed.extension, "");
    }

    #[test]
    fn leading_dot_is_not_an_extension_separator() {
        let parsed = parse(r"C:\Users\me\.gitignore");
        assert_eq!(parsed.stem, ".gitignore");
        assert_eq!(parsed.extension, "");
    }

    #[test]
    fn forward_slashes_are_accepted() {
        let parsed = parse("a/b/c.txt");
        assert_eq!(parsed.parent, "a/b");
        assert_eq!(parsed.name, "c.txt");
    }

    #[test]
    fn join_normalizes_separators() {
        assert_eq!(join(r"C:\Users\me\", r"\file.txt"), r"C:\Users\me\file.txt");
        assert_eq!(join(r"C:\Users\me", "file.txt"), r"C:\Users\me\file.txt");
    }
}
