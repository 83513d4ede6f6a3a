use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use ppurge::{
    load_rules, purge, resolve_root, Match, MatchSet, PurgeOutcome, PurgeTally, RuleSet, Scan,
    ScanEvent, ScanOptions, ScanResult,
};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// Widest directory name shown next to the spinner
const STATUS_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find paths matching include/exclude glob rules and optionally purge them",
    long_about = None
)]
struct Args {
    /// Directory to search (defaults to the current directory)
    #[arg(long, short)]
    root: Option<String>,

    /// Rule file to read (defaults to <root>/.ppurge)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Semicolon separated rules used instead of a rule file
    #[arg(long, short)]
    filter: Option<String>,

    /// Delete the matched paths; without this flag nothing is removed
    #[arg(long, short)]
    purge: bool,

    /// Compute the size of matched paths while searching
    #[arg(long, short)]
    size: bool,

    /// Show debug diagnostics on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn spinner(verbose: bool) -> ProgressBar {
    // Debug output and a redrawing spinner don't mix
    if verbose {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Truncate a name with "..." suffix if it exceeds max_width characters
fn truncate_name_with_suffix(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        name.to_string()
    } else if max_width >= 3 {
        let kept: String = name.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    } else {
        "...".to_string()
    }
}

fn match_line(found: &Match) -> String {
    let path = found.path.display();
    if !found.is_include() {
        return format!("{} {}", "keep:".green(), path);
    }
    match found.size {
        Some(size) => format!("{} {} ({})", "purge:".red(), path, format_size(size, BINARY)),
        None => format!("{} {}", "purge:".red(), path),
    }
}

fn run_scan(
    root: &Path,
    rules: &RuleSet,
    options: ScanOptions,
    progress: &ProgressBar,
) -> ScanResult {
    progress.set_message("Searching files");
    let mut scan = Scan::new(root, rules, options);

    for event in scan.by_ref() {
        let dir = event.path().parent().unwrap_or(root).display().to_string();
        progress.set_message(format!(
            "Searching {}",
            truncate_name_with_suffix(&dir, STATUS_WIDTH)
        ));

        match event {
            ScanEvent::Visited(_) => {}
            ScanEvent::Matched(found) => {
                progress.suspend(|| println!("{}", match_line(&found)))
            }
            ScanEvent::Unreadable(err) => {
                progress.suspend(|| eprintln!("{} {}", "warning:".yellow(), err))
            }
        }
    }

    scan.finish()
}

fn print_summary(result: &ScanResult) {
    let elapsed = result.elapsed.as_millis();
    match result.total_bytes {
        Some(bytes) => println!(
            "found {} purgable locations ({}) in {}ms",
            result.include_count,
            format_size(bytes, BINARY).red(),
            elapsed
        ),
        None => println!(
            "found {} purgable locations in {}ms",
            result.include_count, elapsed
        ),
    }
    if result.unreadable > 0 {
        println!(
            "{}",
            format!("{} directories could not be read", result.unreadable).yellow()
        );
    }
}

fn run_purge(matches: &MatchSet, progress: &ProgressBar) -> PurgeTally {
    println!("{}", "PURGING".red().bold());

    let candidates = matches.includes().inspect(|found| {
        let path = found.path.display().to_string();
        progress.set_message(format!(
            "Deleting {}",
            truncate_name_with_suffix(&path, STATUS_WIDTH)
        ));
    });

    let mut tally = PurgeTally::default();
    for report in purge(candidates) {
        tally.record(&report.outcome);
        let path = report.path.display();
        progress.suspend(|| match &report.outcome {
            PurgeOutcome::Deleted => println!("{} {}", "purged:".red(), path),
            PurgeOutcome::SkippedSymlink => {
                println!("{} {}", "skipping symlink:".yellow(), path)
            }
            PurgeOutcome::Failed(err) => {
                println!("{} {} ({})", "failed:".red().bold(), path, err)
            }
        });
    }
    tally
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let home = env::var_os("HOME").map(PathBuf::from);
    let root = resolve_root(args.root.as_deref(), &cwd, home.as_deref())?;

    let loaded = load_rules(&root, args.config.as_deref(), args.filter.as_deref())?;
    for warning in &loaded.warnings {
        eprintln!("{} {}", "WARN:".yellow(), warning);
    }
    let rules = RuleSet::parse(&loaded.text);
    debug!(source = ?loaded.source, rules = rules.len(), "loaded rules");

    let options = ScanOptions {
        compute_sizes: args.size,
    };
    let progress = spinner(args.verbose);
    let result = run_scan(&root, &rules, options, &progress);
    progress.finish_and_clear();
    print_summary(&result);

    if !args.purge {
        return Ok(());
    }

    let progress = spinner(args.verbose);
    let tally = run_purge(&result.matches, &progress);
    progress.finish_and_clear();
    println!(
        "purged {} locations, skipped {} symlinks, {} failures",
        tally.deleted, tally.skipped, tally.failed
    );

    Ok(())
}
