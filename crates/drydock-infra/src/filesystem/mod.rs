//! Filesystem adapters for Drydock.
//!
//! Implements the `FileSystem` trait from `drydock-core` for real filesystem I/O
//! and knows where Drydock keeps its data on disk.

use std::path::{Path, PathBuf};

use drydock_core::service::fs::FileSystem;

/// Local filesystem implementation of the `FileSystem` trait.
///
/// All operations go through `tokio::fs` for async I/O.
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Create a new LocalFileSystem adapter.
    pub fn new() -> Self {
        Self
    }

    /// Default location of skill plan backups: `{data_dir}/plans/`.
    pub fn plans_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("plans")
    }

    /// Drop folder for character files imported over HTTP: `{data_dir}/imports/`.
    pub fn imports_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("imports")
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFileSystem {
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    async fn read_file(&self, path: &Path) -> Result<String, std::io::Error> {
        tokio::fs::read_to_string(path).await
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `DRYDOCK_DATA_DIR` environment variable
/// 2. `~/.drydock`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DRYDOCK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".drydock");
    }

    // Last resort: current directory
    PathBuf::from(".drydock")
}
