use strings::{partition, Splitter};

/// The parts of a cache2 entry key this tool cares about: the request
/// URL (the `:`-prefixed property, always last) and a `scheme://host`
/// partition key recovered from the `O^` origin-attributes property's
/// percent-encoded `partitionKey=(scheme,host[,port])` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedKey {
    pub url: Option<String>,
    pub partition_key: Option<String>,
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(value) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a cache2 entry key: a comma-separated list of typed properties.
/// Only the `O^` origin-attributes property and the final `:`-prefixed
/// URL property are extracted; every other property (anonymous flags,
/// the `~` privacy generation counter, etc.) is ignored.
pub fn parse(key: &str) -> ParsedKey {
    let mut result = ParsedKey::default();

    for property in Splitter::new(key, ",").keep_empty(true).collect_all() {
        if let Some(attributes) = property.strip_prefix("O^") {
            for attribute in Splitter::new(attributes, "&").collect_all() {
                let (name, delim, value) = partition(attribute, "=");
                if delim.is_none() || name != "partitionKey" {
                    continue;
                }

                let decoded = percent_decode(value);
                let inner = decoded
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                    .unwrap_or(&decoded);

                let parts: Vec<&str> = Splitter::new(inner, ",").collect_all();
                if parts.len() >= 2 {
                    result.partition_key = Some(format!("{}://{}", parts[0], parts[1]));
                }
            }
        } else if let Some(url) = property.strip_prefix(':') {
            result.url = Some(url.to_string());
        }
    }

    result
}
