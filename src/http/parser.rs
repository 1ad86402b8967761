use thiserror::Error;

use crate::http::headers::HeaderMap;
use crate::http::request::{Method, Request};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than three space-separated tokens, or an empty token.
    #[error("malformed request line {0:?}")]
    MalformedRequestLine(String),

    /// A header line without a colon.
    #[error("malformed header line {0:?}")]
    MalformedHeaderLine(String),

    #[error("request head is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),

    #[error("body is {actual} bytes but Content-Length declares {declared}")]
    BodyLengthMismatch { declared: usize, actual: usize },

    /// More bytes are needed before a request can be framed.
    #[error("incomplete request")]
    Incomplete,
}

const HEADERS_END: &[u8] = b"\r\n\r\n";

/// Decodes a buffer holding exactly one request.
///
/// Everything after the blank line is the body. When a `Content-Length` is
/// declared, the body must be exactly that long; without one the trailing
/// bytes are taken verbatim. A buffer with no blank line is decoded as a
/// head-only request with an empty body.
pub fn decode_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (head, body) = match find_headers_end(buf) {
        Some(end) => (&buf[..end], &buf[end + HEADERS_END.len()..]),
        None => (buf, &buf[buf.len()..]),
    };

    let mut request = decode_head(head)?;

    if let Some(declared) = declared_length(&request.headers)? {
        if declared != body.len() {
            return Err(ParseError::BodyLengthMismatch {
                declared,
                actual: body.len(),
            });
        }
    }

    request.body = body.to_vec();
    Ok(request)
}

/// Frames and decodes the first request in a connection buffer.
///
/// Returns the request and the number of bytes it occupied, or
/// `ParseError::Incomplete` if the head or the declared body has not fully
/// arrived. The body is framed by `Content-Length` only; without it the
/// request has no body and any following bytes belong to the next request.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let mut request = decode_head(&buf[..headers_end])?;

    let body_start = headers_end + HEADERS_END.len();
    let content_length = declared_length(&request.headers)?.unwrap_or(0);

    if buf.len() - body_start < content_length {
        return Err(ParseError::Incomplete);
    }

    let total_consumed = body_start + content_length;
    request.body = buf[body_start..total_consumed].to_vec();

    Ok((request, total_consumed))
}

/// Offset of the blank line that terminates the header section.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_END.len())
        .position(|w| w == HEADERS_END)
}

fn decode_head(head: &[u8]) -> Result<Request, ParseError> {
    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ').map(str::trim);

    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if !m.is_empty() && !t.is_empty() && !v.is_empty() => {
            (m, t, v)
        }
        _ => return Err(ParseError::MalformedRequestLine(request_line.to_string())),
    };

    // Headers
    let mut headers = HeaderMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeaderLine(line.to_string()))?;

        headers.set(key.trim(), value.trim());
    }

    Ok(Request {
        method: Method::parse(method),
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
    })
}

fn declared_length(headers: &HeaderMap) -> Result<Option<usize>, ParseError> {
    headers
        .get("Content-Length")
        .map(parse_content_length)
        .transpose()
}

/// Parses a `Content-Length` value. Only a non-empty run of ASCII digits is
/// accepted; signs, whitespace, and anything else are rejected.
pub fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidContentLength(value.to_string());

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse::<usize>().map_err(|_| invalid())
}
