use crate::http_headers::{self, HttpHeaders};

/// The two named elements this tool extracts from a cache2 entry's
/// element block: the stored HTTP response head, and the origin the
/// request was made from (used as a CSV_ORIGIN fallback when the key's
/// partition key is absent).
#[derive(Debug, Clone, Default)]
pub struct Elements {
    pub http_headers: Option<HttpHeaders>,
    pub request_origin: Option<String>,
}

/// Parse a cache2 entry's element block: contiguous NUL-terminated
/// key/value string pairs. Unrecognized keys are skipped; and unlike the
/// cache2 key and metadata header, this block is UTF-8 (not ASCII) text.
pub fn parse(data: &[u8]) -> Elements {
    let mut result = Elements::default();
    let mut pos = 0;

    while pos < data.len() {
        let Some(key_end) = data[pos..].iter().position(|&b| b == 0) else {
            break;
        };
        let key = String::from_utf8_lossy(&data[pos..pos + key_end]).into_owned();
        let value_start = pos + key_end + 1;

        if value_start >= data.len() {
            break;
        }

        let Some(value_end) = data[value_start..].iter().position(|&b| b == 0) else {
            break;
        };
        let value = String::from_utf8_lossy(&data[value_start..value_start + value_end]).into_owned();

        match key.as_str() {
            "response-head" => result.http_headers = Some(http_headers::parse(&value)),
            "request-origin" => result.request_origin = Some(value),
            _ => {}
        }

        pos = value_start + value_end + 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_elements() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"response-head\0");
        buf.extend_from_slice(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\0");
        buf.extend_from_slice(b"request-origin\0");
        buf.extend_from_slice(b"example.com\0");
        buf.extend_from_slice(b"key\0");
        buf.extend_from_slice(b"value\0");
        buf
    }

    #[test]
    fn extracts_response_head_and_request_origin() {
        let data = build_elements();
        let result = parse(&data);
        let headers = result.http_headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.status_line(), Some("HTTP/1.1 200 OK"));
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(result.request_origin.as_deref(), Some("example.com"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let result = parse(&[]);
        assert!(result.http_headers.is_none());
        assert!(result.request_origin.is_none());
    }
}
