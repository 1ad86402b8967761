use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Server settings.
///
/// Loaded from defaults, an optional YAML file, and the `LISTEN` / `FILES_DIR`
/// environment variables, in that order of increasing precedence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Directory served by the `/files` routes.
    pub directory: PathBuf,
    /// How long a single accept waits before re-checking for shutdown.
    pub accept_poll_ms: u64,
    /// Deadline for receiving one complete request.
    pub read_timeout_ms: u64,
    /// Deadline for a handler to produce its response.
    pub handler_timeout_ms: u64,
    pub max_request_bytes: usize,
}

/// The per-connection subset of [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub read_timeout: Duration,
    pub handler_timeout: Duration,
    pub max_request_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4221".to_string(),
            directory: PathBuf::from("/tmp/"),
            accept_poll_ms: 1_000,
            read_timeout_ms: 30_000,
            handler_timeout_ms: 30_000,
            max_request_bytes: 1024 * 1024,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Config::default().session()
    }
}

impl Config {
    pub fn load() -> Self {
        Self::default().with_env()
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Ok(Self::from_yaml(&raw)?.with_env())
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(raw).context("invalid config")
    }

    fn with_env(mut self) -> Self {
        if let Ok(listen_addr) = std::env::var("LISTEN") {
            self.listen_addr = listen_addr;
        }
        if let Ok(dir) = std::env::var("FILES_DIR") {
            self.directory = PathBuf::from(dir);
        }
        self
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            handler_timeout: Duration::from_millis(self.handler_timeout_ms),
            max_request_bytes: self.max_request_bytes,
        }
    }
}
