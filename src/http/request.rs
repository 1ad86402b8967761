use std::fmt;

use crate::http::headers::HeaderMap;
use crate::http::parser::{ParseError, parse_content_length};

pub const HTTP_1_0: &str = "HTTP/1.0";
pub const HTTP_1_1: &str = "HTTP/1.1";

/// HTTP request methods.
///
/// Methods the server does not know by name are kept verbatim as
/// `Extension` so that decoding never rejects a request on its method alone;
/// the router simply finds no rule for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other method token, stored as received
    Extension(String),
}

/// A decoded HTTP request.
///
/// Owned by the connection for the duration of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Path plus optional query, as received (e.g. "/echo/hi?x=1")
    pub target: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Method {
    /// Parses an HTTP method token. Matching is case-sensitive, so `get`
    /// becomes an extension method rather than `GET`.
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Extension("get".into()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            target: self.target.ok_or("target missing")?,
            version: self.version.unwrap_or_else(|| HTTP_1_1.to_string()),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// The declared `Content-Length`, `None` when absent.
    ///
    /// Uses the same strict digits-only rule as request framing.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        self.header("Content-Length")
            .map(parse_content_length)
            .transpose()
    }

    /// Determines whether the connection should stay open after this exchange.
    ///
    /// HTTP/1.1 keeps the connection unless `Connection: close` is sent. Any
    /// other version is treated as HTTP/1.0 and keeps it only on an explicit
    /// `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let connection = self.header("Connection");

        if self.version == HTTP_1_1 {
            !connection.is_some_and(|v| v.eq_ignore_ascii_case("close"))
        } else {
            connection.is_some_and(|v| v.eq_ignore_ascii_case("keep-alive"))
        }
    }

    /// Serializes the request back into wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.body.len());
        buf.extend_from_slice(
            format!("{} {} {}\r\n", self.method, self.target, self.version).as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            buf.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);
        buf
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}
