//! Courier - HTTP/1.1 file server
//!
//! Core library: request decoding, keep-alive connection handling, prefix
//! routing, content-coding negotiation, and response encoding.

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod router;
pub mod server;

pub use error::{Error, Result};
