//! FileSystem trait for abstracting file I/O.
//!
//! Defined in drydock-core so the character service can read imports and
//! write plan backups without depending on any specific filesystem
//! implementation. The `LocalFileSystem` adapter lives in drydock-infra.

use std::path::Path;

/// Abstraction over the filesystem operations the service needs.
pub trait FileSystem: Send + Sync {
    /// Write bytes to a file, creating parent directories as needed.
    fn write_file(
        &self,
        path: &Path,
        content: &[u8],
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Read a file's content as a string.
    fn read_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String, std::io::Error>> + Send;
}
