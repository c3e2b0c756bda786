//! Filesystem access used by template resolution.
//!
//! Resolution only ever asks two questions of the disk: does a regular file
//! exist here, and what does it contain. Putting them behind [`Filesystem`]
//! lets search-path and extension configurations be exercised against an
//! in-memory stub.

use std::io;
use std::path::Path;

/// The filesystem operations the engine needs.
pub trait Filesystem: Send + Sync {
    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Reads the full contents of `path`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
