use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{Instrument, info};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::router::Router;
use crate::server::shutdown::Shutdown;

/// Binds the configured address and serves until shutdown.
pub async fn run(cfg: &Config, router: Router, shutdown: Shutdown) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, Arc::new(router), cfg, shutdown).await
}

/// Accepts connections on `listener` and spawns a session for each.
///
/// Each accept waits at most `accept_poll` so the shutdown flag is observed
/// even if the wake-up is missed. Once shutdown is triggered no more
/// connections are accepted; sessions already running are left to finish on
/// their own.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    cfg: &Config,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let poll = cfg.accept_poll();
    let session = cfg.session();

    loop {
        if shutdown.is_triggered() {
            break;
        }

        let accepted = tokio::select! {
            res = timeout(poll, listener.accept()) => res,
            _ = shutdown.recv() => break,
        };

        let (socket, peer) = match accepted {
            Err(_) => continue,
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Error accepting connection");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        let shutdown = shutdown.clone();
        let span = tracing::info_span!("conn", %peer);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, router, session, shutdown);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {}", peer, e);
                }
            }
            .instrument(span),
        );
    }

    info!("Server is shutting down");
    Ok(())
}
