//! Byte size aggregation for matched paths.

use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Total size in bytes of `path`.
///
/// A file (or a link to one) reports its own length. A directory reports the
/// sum over every non-directory entry below it; directory entries themselves
/// count as zero, so a directory's size is always the sum of its children's
/// sizes.
///
/// Sizes are computed on a live filesystem: anything that cannot be read
/// (vanished entries, broken symlinks, permission errors) contributes zero
/// instead of failing the whole sum.
pub fn size_of(path: &Path) -> u64 {
    let metadata = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not stat path, counting as 0");
            return 0;
        }
    };

    if !metadata.is_dir() {
        return metadata.len();
    }

    // Every descendant is needed here, so nothing is pruned and order is irrelevant
    let mut total = 0u64;
    for item in WalkDir::new(path).min_depth(1).follow_links(false) {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry while sizing");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        total += entry_size(entry.path());
    }
    total
}

fn entry_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => 0,
        Ok(meta) => meta.len(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not stat entry, counting as 0");
            0
        }
    }
}
