//! Rule-driven scanning of a directory tree.

use crate::crawler::Crawl;
use crate::error::CrawlError;
use crate::rules::{Match, RuleSet};
use crate::size::size_of;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Options controlling scan behavior (runtime flags)
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Aggregate the byte size of every include match
    pub compute_sizes: bool,
}

/// Matches keyed by path, kept in discovery order
#[derive(Debug, Default)]
pub struct MatchSet {
    entries: Vec<Match>,
    index: HashMap<PathBuf, usize>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match. A path already present keeps its first match and
    /// `false` is returned.
    pub fn insert(&mut self, found: Match) -> bool {
        if self.index.contains_key(&found.path) {
            return false;
        }
        self.index.insert(found.path.clone(), self.entries.len());
        self.entries.push(found);
        true
    }

    pub fn get(&self, path: &Path) -> Option<&Match> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.entries.iter()
    }

    /// Purge candidates, in discovery order
    pub fn includes(&self) -> impl Iterator<Item = &Match> {
        self.entries.iter().filter(|found| found.is_include())
    }

    pub fn include_count(&self) -> usize {
        self.includes().count()
    }

    /// Sum of the sizes attached to include matches (unsized matches count 0)
    pub fn include_size(&self) -> u64 {
        self.includes().filter_map(|found| found.size).sum()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One step of a scan, for whatever is presenting progress
#[derive(Debug)]
pub enum ScanEvent {
    /// Path that no rule matched
    Visited(PathBuf),
    /// Path that matched a rule; its contents will not be visited
    Matched(Match),
    /// Directory that could not be read; the scan continues without it
    Unreadable(CrawlError),
}

impl ScanEvent {
    pub fn path(&self) -> &Path {
        match self {
            ScanEvent::Visited(path) => path,
            ScanEvent::Matched(found) => &found.path,
            ScanEvent::Unreadable(err) => err.path(),
        }
    }
}

/// Result of a completed scan
#[derive(Debug)]
pub struct ScanResult {
    pub matches: MatchSet,
    pub include_count: usize,
    /// Present only when sizes were computed
    pub total_bytes: Option<u64>,
    pub unreadable: usize,
    pub elapsed: Duration,
}

/// Pull-based scan of a root directory against a rule set.
///
/// Each call to `next` advances the crawl by one path, matches it, sizes it
/// when requested, and records it. A matched directory is never opened, so
/// nothing below it is evaluated or recorded.
pub struct Scan<'r> {
    rules: &'r RuleSet,
    crawl: Crawl,
    options: ScanOptions,
    matches: MatchSet,
    unreadable: usize,
    started: Instant,
}

impl<'r> Scan<'r> {
    pub fn new(root: &Path, rules: &'r RuleSet, options: ScanOptions) -> Self {
        Self {
            rules,
            crawl: Crawl::new(root),
            options,
            matches: MatchSet::new(),
            unreadable: 0,
            started: Instant::now(),
        }
    }

    /// Matches recorded so far
    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    /// Run any remaining steps and summarize the scan.
    pub fn finish(mut self) -> ScanResult {
        for _ in self.by_ref() {}

        let include_count = self.matches.include_count();
        let total_bytes = self
            .options
            .compute_sizes
            .then(|| self.matches.include_size());
        ScanResult {
            matches: self.matches,
            include_count,
            total_bytes,
            unreadable: self.unreadable,
            elapsed: self.started.elapsed(),
        }
    }

    fn record(&mut self, path: PathBuf) -> ScanEvent {
        debug!(path = %path.display(), "checking path");
        let Some(mut found) = self.rules.match_path(&path) else {
            return ScanEvent::Visited(path);
        };
        // Descent stops exactly where a path matched, whichever kind of rule it was
        self.crawl.prune_current();

        if self.options.compute_sizes && found.is_include() {
            let size = size_of(&found.path);
            found = found.with_size(size);
        }
        debug!(path = %found.path.display(), rule = %found.rule, "matched");
        self.matches.insert(found.clone());
        ScanEvent::Matched(found)
    }
}

impl Iterator for Scan<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.crawl.next()? {
            Ok(path) => Some(self.record(path)),
            Err(err) => {
                debug!(path = %err.path().display(), error = %err, "skipping unreadable directory");
                self.unreadable += 1;
                Some(ScanEvent::Unreadable(err))
            }
        }
    }
}

/// Scan `root` to completion without observing individual steps.
pub fn scan(root: &Path, rules: &RuleSet, options: ScanOptions) -> ScanResult {
    Scan::new(root, rules, options).finish()
}
