use std::io::Write;

use crate::error::Error;
use crate::http::headers::HeaderMap;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";
const KEEP_ALIVE: &str = "keep-alive";

/// Serializes a response into wire bytes.
///
/// A `Connection` header is always present (`keep-alive` unless the caller
/// set one). With a non-empty body the header section is closed by the
/// computed `Content-Length` line and a blank line, followed by the body.
/// With an empty body the output ends right after the last header line and
/// carries no `Content-Length`.
pub fn serialize_response(status: StatusCode, headers: Option<HeaderMap>, body: &[u8]) -> Vec<u8> {
    let mut headers = headers.unwrap_or_default();

    if !headers.contains("Connection") {
        headers.set("Connection", KEEP_ALIVE);
    }
    // Always recomputed from the body below.
    headers.remove("Content-Length");

    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Body
    if !body.is_empty() {
        buf.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
        buf.extend_from_slice(body);
    }

    buf
}

/// Encodes a response and writes it to `out` in a single write.
pub fn write_response<W: Write + ?Sized>(
    out: &mut W,
    status: StatusCode,
    headers: Option<HeaderMap>,
    body: &[u8],
) -> crate::Result<()> {
    let buf = serialize_response(status, headers, body);
    out.write_all(&buf).map_err(Error::Write)
}
