/// Maximum length of a single path component. Windows' `NAME_MAX`
/// equivalent for a single path segment.
pub const MAX_COMPONENT_LEN: usize = 255;

const RESERVED_CHARS: [char; 6] = ['<', '>', '"', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "AUX", "CON", "NUL", "PRN", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Stage 1: replace reserved characters, forbid `:` except at position 1
/// (the drive-letter colon), map `/` to `\`, and strip control characters
/// below code 32.
fn safe_chars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for (i, c) in path.chars().enumerate() {
        if RESERVED_CHARS.contains(&c) {
            out.push('_');
        } else if c == ':' && i != 1 {
            out.push('_');
        } else if c == '/' {
            out.push('\\');
        } else if (c as u32) < 32 {
            // Drop the character entirely.
        } else {
            out.push(c);
        }
    }
    out
}

/// Stage 2: collapse runs of separators.
fn safe_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut components = path.split(is_separator).filter(|c| !c.is_empty());
    if let Some(first) = components.next() {
        out.push_str(first);
    }
    for component in components {
        out.push('\\');
        out.push_str(component);
    }
    out
}

/// Stage 3: truncate each component to [`MAX_COMPONENT_LEN`].
fn safe_components(path: &str) -> String {
    let components: Vec<&str> = path.split(is_separator).collect();
    let truncated: Vec<String> = components
        .into_iter()
        .map(|c| c.chars().take(MAX_COMPONENT_LEN).collect())
        .collect();
    truncated.join("\\")
}

/// Stage 4: escape reserved device-name stems (prefix `_`) and components
/// ending in a space or period (suffix `_`).
fn safe_names(path: &str) -> String {
    let components: Vec<&str> = path.split(is_separator).collect();
    let escaped: Vec<String> = components
        .into_iter()
        .map(|component| {
            let ends_unsafe = component.ends_with(' ') || component.ends_with('.');

            let stem = component.split('.').next().unwrap_or(component).trim();
            let is_reserved = RESERVED_NAMES
                .iter()
                .any(|name| name.eq_ignore_ascii_case(stem));

            let mut result = String::new();
            if is_reserved {
                result.push('_');
            }
            result.push_str(component);
            if ends_unsafe {
                result.push('_');
            }
            result
        })
        .collect();
    escaped.join("\\")
}

/// Rewrite `path` into a filesystem-legal Windows path: reserved
/// characters replaced, forward slashes mapped to backslashes, collapsed
/// separators, length-capped components, and escaped reserved device
/// names / trailing space-or-period components.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/fileio/naming-a-file#naming-conventions>.
pub fn safe(path: &str) -> String {
    let result = safe_chars(path);
    let result = safe_slashes(&result);
    let result = safe_components(&result);
    safe_names(&result)
}
