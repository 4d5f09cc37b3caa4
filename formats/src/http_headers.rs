use strings::partition;

/// A parsed `response-head` element: the raw status line (stored under
/// the empty key, matching the cache format's own convention of storing
/// it as the first "headerless" line) plus every `Name: value` header,
/// keyed by lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn status_line(&self) -> Option<&str> {
        self.get("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a stored `response-head` blob: a status line, then `\r\n`
/// separated `Name: value` header lines (the first line has no colon and
/// is stored under the empty-string key).
pub fn parse(raw: &str) -> HttpHeaders {
    let mut entries = Vec::new();

    for (i, line) in raw.split("\r\n").enumerate() {
        if line.is_empty() {
            continue;
        }
        if i == 0 {
            entries.push((String::new(), line.to_string()));
            continue;
        }
        let (name, delim, value) = partition(line, ":");
        if delim.is_some() {
            entries.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    HttpHeaders { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_line_and_headers() {
        let headers = parse("HTTP/1.1 200 OK\r\nContent-Type: text/html");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.status_line(), Some("HTTP/1.1 200 OK"));
        assert_eq!(headers.get("content-type"), Some("text/html"));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let headers = parse("HTTP/1.1 200 OK\r\nCONTENT-TYPE: text/html");
        assert_eq!(headers.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn empty_input_has_no_entries() {
        let headers = parse("");
        assert!(headers.is_empty());
    }
}
