//! Deletion of include matches.

use crate::rules::Match;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What happened to one purge candidate
#[derive(Debug)]
pub enum PurgeOutcome {
    Deleted,
    /// Symbolic links are never removed, nor is anything they point to
    SkippedSymlink,
    Failed(io::Error),
}

impl PurgeOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, PurgeOutcome::Deleted)
    }
}

/// Outcome of purging one path
#[derive(Debug)]
pub struct PurgeReport {
    pub path: PathBuf,
    pub outcome: PurgeOutcome,
}

/// Remove `path` and everything below it, unless it is a symbolic link.
pub fn purge_path(path: &Path) -> PurgeOutcome {
    // Use symlink_metadata so the link itself is inspected, not its target
    let metadata = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => return PurgeOutcome::Failed(err),
    };

    if metadata.file_type().is_symlink() {
        debug!(path = %path.display(), "skipping symlink");
        return PurgeOutcome::SkippedSymlink;
    }

    let removal = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removal {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            PurgeOutcome::Deleted
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to remove");
            PurgeOutcome::Failed(err)
        }
    }
}

/// Purge every include match, in the order given.
///
/// Exclude matches are passed over. The returned iterator is lazy: each path
/// is deleted only when its report is pulled, and a failure on one path has no
/// effect on the ones after it.
pub fn purge<'a, I>(matches: I) -> impl Iterator<Item = PurgeReport> + 'a
where
    I: IntoIterator<Item = &'a Match>,
    I::IntoIter: 'a,
{
    matches
        .into_iter()
        .filter(|found| found.is_include())
        .map(|found| PurgeReport {
            path: found.path.clone(),
            outcome: purge_path(&found.path),
        })
}

/// Running counts of purge outcomes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeTally {
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PurgeTally {
    pub fn record(&mut self, outcome: &PurgeOutcome) {
        match outcome {
            PurgeOutcome::Deleted => self.deleted += 1,
            PurgeOutcome::SkippedSymlink => self.skipped += 1,
            PurgeOutcome::Failed(_) => self.failed += 1,
        }
    }
}
