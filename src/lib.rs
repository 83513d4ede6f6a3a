//! ppurge - rule-driven path finder and purger
//!
//! ppurge walks a directory tree and checks every path against an ordered
//! list of include/exclude glob rules (first match wins). Matched paths are
//! reported, optionally sized, and on request include matches are deleted.
//!
//! ## Pruning
//!
//! Once a path matches any rule the walk does not descend into it: deleting a
//! directory deletes its contents, and keeping it keeps them. As a result an
//! exclude rule for something inside an included directory has no effect,
//! and no recorded match ever lies below another.

pub mod config;
pub mod crawler;
pub mod error;
pub mod purge;
pub mod rules;
pub mod scanner;
pub mod size;

// Re-export commonly used items
pub use config::{load_rules, resolve_root, ConfigWarning, LoadedRules, RuleSource};
pub use crawler::Crawl;
pub use error::{ConfigError, CrawlError};
pub use purge::{purge, purge_path, PurgeOutcome, PurgeReport, PurgeTally};
pub use rules::{parse_rules, Match, Rule, RuleKind, RuleSet};
pub use scanner::{scan, MatchSet, Scan, ScanEvent, ScanOptions, ScanResult};
pub use size::size_of;
