//! HTTP/1.1 protocol implementation.
//!
//! This module turns bytes received on a connection into requests and
//! responses back into bytes, with support for keep-alive connections.
//!
//! # Architecture
//!
//! - **`headers`**: Case-insensitive header map
//! - **`parser`**: Decodes and frames requests from byte buffers
//! - **`request`**: HTTP request representation and keep-alive rules
//! - **`response`**: Status codes and the response builder
//! - **`writer`**: Serializes responses onto an output stream
//! - **`encoding`**: `Accept-Encoding` negotiation and the gzip codec
//! - **`connection`**: The per-connection request/response state machine
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete request (read deadline)
//!        └──────┬──────┘
//!               │ Request decoded        (malformed → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │    Routing       │ ← Run the matched handler (handler deadline)
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::config::SessionConfig;
//! use courier::http::connection::Connection;
//! use courier::router::Router;
//! use courier::server::Shutdown;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(Router::new());
//!     let shutdown = Shutdown::new();
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = SessionConfig::default();
//!         let mut conn = Connection::new(socket, router.clone(), config, shutdown.clone());
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod encoding;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
