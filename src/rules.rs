//! Rule parsing and first-match path matching.

use globset::{GlobBuilder, GlobMatcher};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Whether a rule marks paths for purging or for keeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Include, // purge candidate
    Exclude, // explicitly kept
}

/// A single line of rule text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub pattern: String,
}

impl Rule {
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Include,
            pattern: pattern.into(),
        }
    }

    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Exclude,
            pattern: pattern.into(),
        }
    }

    /// Interpret one trimmed, non-comment line.
    /// Only the leading `!` is a marker; later `!` characters belong to the pattern.
    fn from_line(line: &str) -> Self {
        match line.strip_prefix('!') {
            Some(pattern) => Self::exclude(pattern),
            None => Self::include(line),
        }
    }

    pub fn is_include(&self) -> bool {
        self.kind == RuleKind::Include
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RuleKind::Include => write!(f, "{}", self.pattern),
            RuleKind::Exclude => write!(f, "!{}", self.pattern),
        }
    }
}

/// Parse rule text into an ordered list of rules.
///
/// Lines are trimmed, lines starting with `#` are dropped, and nothing is ever
/// rejected: a line that is not a usable glob simply never matches.
pub fn parse_rules(text: &str) -> Vec<Rule> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .map(Rule::from_line)
        .collect()
}

/// A path that satisfied a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub rule: Rule,
    pub path: PathBuf,
    /// Total bytes, only filled in for include matches when sizing is requested
    pub size: Option<u64>,
}

impl Match {
    pub fn new(rule: Rule, path: impl Into<PathBuf>) -> Self {
        Self {
            rule,
            path: path.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.rule.kind
    }

    pub fn is_include(&self) -> bool {
        self.rule.is_include()
    }
}

struct CompiledRule {
    rule: Rule,
    // None when the pattern failed to compile; such a rule never matches
    matcher: Option<GlobMatcher>,
}

/// Ordered rules compiled for matching. Order is never changed after parsing.
pub struct RuleSet {
    entries: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        let entries = rules
            .into_iter()
            .map(|rule| {
                let matcher = compile_pattern(&rule.pattern);
                CompiledRule { rule, matcher }
            })
            .collect();
        Self { entries }
    }

    /// Parse and compile rule text in one step
    pub fn parse(text: &str) -> Self {
        Self::new(parse_rules(text))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().map(|entry| &entry.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First rule whose pattern matches `path`, scanning in order.
    pub fn find(&self, path: &Path) -> Option<&Rule> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .matcher
                    .as_ref()
                    .is_some_and(|matcher| matcher.is_match(path))
            })
            .map(|entry| &entry.rule)
    }

    /// Like [`RuleSet::find`], but builds the [`Match`] record for `path`.
    pub fn match_path(&self, path: &Path) -> Option<Match> {
        self.find(path).map(|rule| Match::new(rule.clone(), path))
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules()).finish()
    }
}

/// Rewrite a user pattern into the glob actually compiled.
///
/// A trailing `/` is dropped, and patterns that are neither absolute nor start
/// with `**` are floated with a `**/` prefix so they match at any depth of the
/// absolute paths the crawler produces. The empty pattern stays empty.
pub fn glob_source(pattern: &str) -> String {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.is_empty() {
        return pattern.to_string();
    }
    if trimmed.starts_with('/') || trimmed.starts_with("**") {
        trimmed.to_string()
    } else {
        format!("**/{}", trimmed)
    }
}

fn compile_pattern(pattern: &str) -> Option<GlobMatcher> {
    let source = glob_source(pattern);
    match GlobBuilder::new(&source)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
    {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(err) => {
            warn!(pattern, error = %err, "rule is not a valid glob and will never match");
            None
        }
    }
}
