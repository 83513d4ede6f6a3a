//! Resolution of the scan root and of the rule text to apply.

use crate::error::ConfigError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Rule file looked up in the root when no explicit one is given
pub const DEFAULT_RULE_FILE: &str = ".ppurge";

/// Separator between rules in an inline filter
pub const FILTER_SEPARATOR: char = ';';

/// Where the rule text came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Filter,
    File(PathBuf),
}

/// Non-fatal observations made while resolving rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A rule file exists but an inline filter takes precedence
    RuleFileIgnored(PathBuf),
    /// An explicitly named rule file does not exist
    RuleFileNotFound(PathBuf),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::RuleFileIgnored(path) => write!(
                f,
                "ignoring the rule file found at {} because a --filter was provided",
                path.display()
            ),
            ConfigWarning::RuleFileNotFound(path) => {
                write!(f, "did not find a file at {}", path.display())
            }
        }
    }
}

/// Rule text ready to be parsed
#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub text: String,
    pub source: RuleSource,
    pub warnings: Vec<ConfigWarning>,
}

/// Turn a user-supplied root into an absolute directory path.
///
/// A leading `~` is replaced by `home`, relative paths are joined onto `cwd`,
/// and the result is canonicalized. Defaults to `cwd` when no root is given.
pub fn resolve_root(
    raw: Option<&str>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let expanded = match raw {
        None => cwd.to_path_buf(),
        Some(raw) => expand_home(raw, home)?,
    };
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    let root = joined
        .canonicalize()
        .map_err(|source| ConfigError::BadRoot {
            path: joined.clone(),
            source,
        })?;
    if !root.is_dir() {
        return Err(ConfigError::RootNotDirectory(root));
    }
    Ok(root)
}

fn expand_home(raw: &str, home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return Ok(PathBuf::from(raw)),
    };
    let home = home.ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join(rest.trim_start_matches('/')))
}

/// Pick the rule text for a run.
///
/// An inline filter wins over any rule file. Otherwise the rule file is read
/// from `config`, or from `<root>/.ppurge` when none is named. Having no rules
/// at all is fatal.
pub fn load_rules(
    root: &Path,
    config: Option<&Path>,
    filter: Option<&str>,
) -> Result<LoadedRules, ConfigError> {
    let rule_file = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_RULE_FILE));
    let mut warnings = Vec::new();

    if let Some(filter) = filter {
        if rule_file.is_file() {
            warnings.push(ConfigWarning::RuleFileIgnored(rule_file));
        } else if config.is_some() {
            warnings.push(ConfigWarning::RuleFileNotFound(rule_file));
        }
        return Ok(LoadedRules {
            text: filter_to_rules(filter),
            source: RuleSource::Filter,
            warnings,
        });
    }

    match fs::read_to_string(&rule_file) {
        Ok(text) => Ok(LoadedRules {
            text,
            source: RuleSource::File(rule_file),
            warnings,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if config.is_some() {
                warn!("{}", ConfigWarning::RuleFileNotFound(rule_file.clone()));
            }
            Err(ConfigError::MissingRules(rule_file))
        }
        Err(source) => Err(ConfigError::UnreadableRules {
            path: rule_file,
            source,
        }),
    }
}

/// Inline filters use `;` where a rule file would use a newline
pub fn filter_to_rules(filter: &str) -> String {
    filter.replace(FILTER_SEPARATOR, "\n")
}
