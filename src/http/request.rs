//! Request head parsing.
//!
//! # Responsibilities
//! - Parse one read's worth of bytes as a single HTTP/1.x request head
//! - Extract the only header the server acts on (`Connection`)
//!
//! # Design Decisions
//! - Single-read framing: a head that is not complete in this chunk is rejected
//! - Bodies are never consumed; anything after the head is ignored

use thiserror::Error;

/// Upper bound on headers accepted in one request head.
pub const MAX_HEADERS: usize = 64;

/// Why a chunk of bytes was not a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request: {0}")]
    Malformed(#[from] httparse::Error),

    #[error("incomplete request head")]
    Incomplete,
}

/// What the handler needs to know about a parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    /// The client sent `Connection: close`.
    pub close_requested: bool,
}

/// Parse `data` as one complete request head.
pub fn parse_head(data: &[u8]) -> Result<RequestHead, ParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    match req.parse(data)? {
        httparse::Status::Complete(_) => {}
        httparse::Status::Partial => return Err(ParseError::Incomplete),
    }

    // First occurrence wins, like a header map lookup.
    let close_requested = req
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("connection"))
        .and_then(|h| std::str::from_utf8(h.value).ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("close"));

    Ok(RequestHead {
        method: req.method.unwrap_or_default().to_string(),
        path: req.path.unwrap_or_default().to_string(),
        close_requested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_request() {
        let head = parse_head(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/");
        assert!(!head.close_requested);
    }

    #[test]
    fn connection_close_matches_any_case() {
        for value in ["close", "CLOSE", "Close", " cLoSe "] {
            let raw = format!("GET / HTTP/1.1\r\nHost: x\r\nconnection:{value}\r\n\r\n");
            assert!(parse_head(raw.as_bytes()).unwrap().close_requested, "{value:?}");
        }
    }

    #[test]
    fn other_connection_values_keep_open() {
        for value in ["keep-alive", "upgrade", "keep-alive, close"] {
            let raw = format!("GET / HTTP/1.1\r\nConnection: {value}\r\n\r\n");
            assert!(!parse_head(raw.as_bytes()).unwrap().close_requested, "{value:?}");
        }
    }

    #[test]
    fn only_first_connection_header_counts() {
        let raw = b"GET / HTTP/1.1\r\nConnection: keep-alive\r\nConnection: close\r\n\r\n";
        assert!(!parse_head(raw).unwrap().close_requested);
    }

    #[test]
    fn body_bytes_are_ignored() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let head = parse_head(raw).unwrap();
        assert_eq!(head.method, "POST");
        assert_eq!(head.path, "/submit");
    }

    #[test]
    fn garbage_line_is_malformed() {
        assert!(matches!(
            parse_head(b"this is not http\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn split_head_is_incomplete() {
        assert_eq!(
            parse_head(b"GET / HTTP/1.1\r\nHost: x\r\n"),
            Err(ParseError::Incomplete)
        );
    }
}
