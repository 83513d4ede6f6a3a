//! Error types shared by the library modules.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal problems detected before any traversal starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no rules to apply: expected a rule file at {} or a --filter argument", .0.display())]
    MissingRules(PathBuf),

    #[error("failed to read rule file {}", .path.display())]
    UnreadableRules {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot expand '~' because HOME is not set")]
    NoHomeDirectory,

    #[error("root {} does not exist or cannot be resolved", .path.display())]
    BadRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
}

/// A directory the crawler could not list.
///
/// The crawl keeps going after yielding one of these; only the unreadable
/// subtree is lost.
#[derive(Debug, Error)]
#[error("cannot read {}: {source}", .path.display())]
pub struct CrawlError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl CrawlError {
    pub(crate) fn new(path: PathBuf, source: io::Error) -> Self {
        Self { path, source }
    }

    /// Directory that could not be read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
