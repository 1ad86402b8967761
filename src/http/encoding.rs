//! Content-coding negotiation for response bodies.
//!
//! Only `gzip` is supported. Negotiation walks the comma-separated
//! `Accept-Encoding` tokens in the order the client listed them and picks the
//! first exact match; quality parameters are not interpreted, so a token such
//! as `gzip;q=0.8` does not match.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

use crate::http::request::Request;

pub const GZIP: &str = "gzip";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode {coding} payload: {source}")]
    Encode {
        coding: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {coding} payload: {source}")]
    Decode {
        coding: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
}

impl ContentCoding {
    /// Matches a single `Accept-Encoding` token verbatim.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            GZIP => Some(ContentCoding::Gzip),
            _ => None,
        }
    }

    /// Picks the first supported coding from an `Accept-Encoding` value.
    pub fn negotiate(accept_encoding: &str) -> Option<Self> {
        accept_encoding
            .split(',')
            .map(str::trim)
            .find_map(Self::from_token)
    }

    /// Picks the coding for a request's response, if any.
    pub fn from_request(req: &Request) -> Option<Self> {
        req.header("Accept-Encoding").and_then(Self::negotiate)
    }

    /// Value for the `Content-Encoding` response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => GZIP,
        }
    }

    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let coding = self.as_str();
        let wrap = |source| CodecError::Encode { coding, source };

        match self {
            ContentCoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data).map_err(wrap)?;
                encoder.finish().map_err(wrap)
            }
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let coding = self.as_str();
        let wrap = |source| CodecError::Decode { coding, source };

        match self {
            ContentCoding::Gzip => {
                // A gzip member always has a header, even for an empty payload.
                if data.is_empty() {
                    return Err(wrap(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "empty input",
                    )));
                }

                let mut out = Vec::new();
                GzDecoder::new(data).read_to_end(&mut out).map_err(wrap)?;
                Ok(out)
            }
        }
    }
}
