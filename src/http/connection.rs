use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout, timeout_at};

use crate::config::SessionConfig;
use crate::error::Error;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::router::Router;
use crate::server::shutdown::Shutdown;

const READ_CHUNK_SIZE: usize = 1024;

/// One accepted client connection.
///
/// Requests are read, routed, and answered strictly one after another. The
/// stream is anything byte-oriented: a `TcpStream` in the server, an
/// in-memory duplex pipe in tests.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    router: Arc<Router>,
    config: SessionConfig,
    shutdown: Shutdown,
}

pub enum ConnectionState {
    Reading,
    Routing(Request),
    Writing(Vec<u8>, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, router: Arc<Router>, config: SessionConfig, shutdown: Shutdown) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            router,
            config,
            shutdown,
        }
    }

    /// Drives the connection until it closes.
    ///
    /// Returns `Ok` for an orderly close (client hang-up, idle timeout,
    /// shutdown, or a non-keep-alive exchange) and `Err` for everything that
    /// aborted the connection.
    pub async fn run(&mut self) -> crate::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let deadline = Instant::now() + self.config.read_timeout;
                    self.state = match self.read_request(deadline).await? {
                        Some(req) => ConnectionState::Routing(req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Routing(req) => {
                    tracing::info!(
                        method = %req.method,
                        target = %req.target,
                        version = %req.version,
                        "Handling request"
                    );

                    let keep_alive = req.keep_alive();
                    let response = self.dispatch(req).await?;
                    self.state = ConnectionState::Writing(response, keep_alive);
                }

                ConnectionState::Writing(response, keep_alive) => {
                    self.stream.write_all(&response).await.map_err(Error::Write)?;
                    self.stream.flush().await.map_err(Error::Write)?;

                    tracing::debug!(keep_alive, "Response sent");
                    if keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the buffer holds one complete request.
    ///
    /// Returns `None` when the connection should close quietly: the peer hung
    /// up or stayed idle past `deadline` between requests, or shutdown was
    /// triggered.
    pub async fn read_request(&mut self, deadline: Instant) -> crate::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            if !self.buffer.is_empty() {
                match parse_http_request(&self.buffer) {
                    Ok((request, consumed)) => {
                        self.buffer.advance(consumed);
                        return Ok(Some(request));
                    }
                    Err(ParseError::Incomplete) => {}
                    Err(e) => return Err(e.into()),
                }
            }

            if self.buffer.len() >= self.config.max_request_bytes {
                return Err(Error::RequestTooLarge(self.config.max_request_bytes));
            }

            if self.shutdown.is_triggered() {
                return Ok(None);
            }

            let mut temp = [0u8; READ_CHUNK_SIZE];
            let read = tokio::select! {
                res = timeout_at(deadline, self.stream.read(&mut temp)) => res,
                _ = self.shutdown.recv() => {
                    tracing::debug!("Shutdown interrupted read");
                    return Ok(None);
                }
            };

            let n = match read {
                Err(_) if self.buffer.is_empty() => {
                    tracing::debug!("Idle timeout");
                    return Ok(None);
                }
                Err(_) => return Err(Error::Timeout(self.config.read_timeout)),
                Ok(res) => res?,
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    // Client closed connection
                    return Ok(None);
                }
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-request",
                )));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    /// Runs the router on a blocking thread under the handler deadline and
    /// returns the bytes the handler wrote.
    async fn dispatch(&self, req: Request) -> crate::Result<Vec<u8>> {
        let router = Arc::clone(&self.router);
        let budget = self.config.handler_timeout;

        // The blocking task is not cancelled on timeout; its output is dropped.
        let task = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            router.route(&req, &mut out).map(|()| out)
        });

        match timeout(budget, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(Error::Handler(join.to_string())),
            Err(_) => Err(Error::HandlerTimeout(budget)),
        }
    }
}
