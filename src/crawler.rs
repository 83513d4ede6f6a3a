//! Lazy depth-first traversal with caller-driven pruning.

use crate::error::CrawlError;
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

/// Predicate type used by [`Crawl::new`], which never prunes.
pub type Unpruned = fn(&Path) -> bool;

struct Entry {
    path: PathBuf,
    is_dir: bool,
}

/// Pre-order walk over every path below a root directory.
///
/// The root itself is not yielded. Entries inside each directory come out
/// sorted by file name, and symbolic links are reported but never followed.
///
/// A directory is only listed when the consumer asks for the path after it.
/// If a pruning predicate is attached it is consulted at that point, and when
/// it returns `true` the directory is never opened: the crawl moves on to its
/// siblings. A consumer can also call [`Crawl::prune_current`] itself.
///
/// Unreadable directories are yielded as [`CrawlError`] items and the walk
/// continues with the rest of the tree.
pub struct Crawl<P = Unpruned> {
    // Root directory, until the first call to `next` lists it
    root: Option<PathBuf>,
    // Sorted listings of the open directories, innermost last
    stack: Vec<vec::IntoIter<Entry>>,
    on_path: Option<P>,
    // Last yielded directory whose descent has not been decided yet
    pending_dir: Option<PathBuf>,
}

impl Crawl<Unpruned> {
    /// Exhaustive crawl, used where every descendant must be seen.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::build(root.as_ref(), None)
    }
}

impl<P> Crawl<P>
where
    P: FnMut(&Path) -> bool,
{
    /// Crawl that never opens a directory `on_path` accepts.
    pub fn pruned(root: impl AsRef<Path>, on_path: P) -> Self {
        Self::build(root.as_ref(), Some(on_path))
    }

    fn build(root: &Path, on_path: Option<P>) -> Self {
        Self {
            root: Some(root.to_path_buf()),
            stack: Vec::new(),
            on_path,
            pending_dir: None,
        }
    }

    /// Do not descend into the directory that was just yielded.
    ///
    /// Has no effect if the last item was not a directory.
    pub fn prune_current(&mut self) {
        self.pending_dir = None;
    }

    /// Decide what happens to the directory yielded last, listing it if the
    /// walk descends into it.
    fn settle_pending(&mut self) -> Result<(), CrawlError> {
        if let Some(root) = self.root.take() {
            return self.open(root);
        }
        let Some(dir) = self.pending_dir.take() else {
            return Ok(());
        };
        let prune = match self.on_path.as_mut() {
            Some(on_path) => on_path(&dir),
            None => false,
        };
        if prune {
            return Ok(());
        }
        self.open(dir)
    }

    fn open(&mut self, dir: PathBuf) -> Result<(), CrawlError> {
        let listing = match fs::read_dir(&dir) {
            Ok(listing) => listing,
            Err(err) => return Err(CrawlError::new(dir, err)),
        };

        let mut entries = Vec::new();
        for item in listing {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => return Err(CrawlError::new(dir, err)),
            };
            // file_type does not follow symlinks, so a link is never a directory here
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(Entry {
                path: entry.path(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        self.stack.push(entries.into_iter());
        Ok(())
    }
}

impl<P> Iterator for Crawl<P>
where
    P: FnMut(&Path) -> bool,
{
    type Item = Result<PathBuf, CrawlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.settle_pending() {
            return Some(Err(err));
        }

        while let Some(listing) = self.stack.last_mut() {
            match listing.next() {
                Some(entry) => {
                    if entry.is_dir {
                        self.pending_dir = Some(entry.path.clone());
                    }
                    return Some(Ok(entry.path));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
