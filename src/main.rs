use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use courier::config::Config;
use courier::files::LocalFileStore;
use courier::router::handlers::app_router;
use courier::server::{self, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "courier", about = "HTTP/1.1 file server")]
struct Cli {
    /// Directory to look for the files
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:4221
    #[arg(long)]
    listen: Option<String>,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(directory) = cli.directory {
        cfg.directory = directory;
    }
    if let Some(listen) = cli.listen {
        cfg.listen_addr = listen;
    }

    let router = app_router(Arc::new(LocalFileStore::new(cfg.directory.clone())));
    let shutdown = Shutdown::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    server::run(&cfg, router, shutdown).await
}

async fn watch_signals(shutdown: Shutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
