//! Crate-wide error type.

use std::time::Duration;

use thiserror::Error;

use crate::files::FileError;
use crate::http::encoding::CodecError;
use crate::http::parser::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The buffered bytes do not form a valid request.
    #[error("HTTP parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a response to the output stream failed.
    #[error("failed to write response: {0}")]
    Write(#[source] std::io::Error),

    /// A partially received request did not complete before the read deadline.
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("handler exceeded its deadline of {0:?}")]
    HandlerTimeout(Duration),

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("request exceeds {0} bytes")]
    RequestTooLarge(usize),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    File(#[from] FileError),
}
