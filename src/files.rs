//! File storage used by the `/files` handlers.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Byte-level read/write access to named files.
pub trait FileStore: Send + Sync {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError>;
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), FileError>;
}

/// A [`FileStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `name` below the root. Names that could escape it are
    /// reported as missing.
    fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        let relative = Path::new(name);
        let inside = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !inside {
            return Err(FileError::NotFound(name.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileError::NotFound(name.to_string()),
            _ => FileError::Io(e),
        })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;
        std::fs::write(&path, bytes)?;
        Ok(())
    }
}
