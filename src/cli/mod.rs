//! # CLI Module
//!
//! Command-line front end for the history pager.
//!
//! ## Usage
//! ```bash
//! # First page of the current branch
//! history-pager log .
//!
//! # Rows 30..45 of commits touching src/, mentioning "parser"
//! history-pager log . --path src --search parser --offset 30
//!
//! # How many commits a tag has
//! history-pager count . --rev v1.0
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use commit_history_pager::core::history::{
    CommitInfo, FilterValue, HistoryPageProvider, RowBuffer, RowRange,
};
use commit_history_pager::core::GitHistoryBackend;
use commit_history_pager::error::{HistoryError, Result, ServerError};
use commit_history_pager::events::{Event, EventChannel, HistoryEvent, Notification};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// History Pager - browse commit history one page at a time
#[derive(Parser, Debug)]
#[command(name = "history-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show one page of commit history
    Log {
        /// Repository (or any path inside it)
        #[arg(default_value = ".")]
        repo: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// First row to show
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "15")]
        page_size: usize,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Count the commits matching the filters
    Count {
        /// Repository (or any path inside it)
        #[arg(default_value = ".")]
        repo: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Revision to start from (default: HEAD)
    #[arg(short, long, default_value = "")]
    rev: String,

    /// Only commits touching this path
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Only commits whose id, author or message contain this text
    #[arg(short, long, default_value = "")]
    search: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Commit ids only
    Minimal,
}

/// What one provider session produced
struct Session {
    display: RowBuffer,
    count: Option<usize>,
    count_error: Option<ServerError>,
    failures: Vec<Notification>,
}

impl Session {
    /// The row count, or why the backend could not provide one
    fn total(&self) -> Result<usize> {
        match (self.count, &self.count_error) {
            (Some(total), _) => Ok(total),
            (None, Some(error)) => Err(HistoryError::Server(error.clone())),
            (None, None) => Err(HistoryError::Server(ServerError::Unavailable(
                "the history count was not returned".to_string(),
            ))),
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Log {
            repo,
            filters,
            offset,
            page_size,
            output,
            verbose,
        } => {
            init_logging(verbose);
            run_log(repo, filters, RowRange::new(offset, page_size), output)
        }
        Commands::Count {
            repo,
            filters,
            verbose,
        } => {
            init_logging(verbose);
            run_count(repo, filters)
        }
    }
}

fn init_logging(verbose: bool) {
    commit_history_pager::init_tracing(if verbose { "debug" } else { "warn" });
}

fn run_log(repo: PathBuf, filters: FilterArgs, range: RowRange, output: OutputFormat) -> Result<()> {
    if range.is_empty() {
        return Err(HistoryError::Config(
            "page size must be at least 1".to_string(),
        ));
    }

    let pretty = matches!(output, OutputFormat::Pretty);
    let session = run_session(repo, filters, range, pretty)?;

    let total = session.total()?;
    if let Some(Notification::Error { caption, message }) = session.failures.into_iter().next() {
        return Err(HistoryError::Fetch { caption, message });
    }
    let rows = session.display.rows_in(range);

    match output {
        OutputFormat::Pretty => print_pretty_rows(&Term::stdout(), range, total, &rows),
        OutputFormat::Json => print_json_rows(range, total, &rows)?,
        OutputFormat::Minimal => {
            for commit in rows {
                println!("{}", commit.id);
            }
        }
    }

    Ok(())
}

fn run_count(repo: PathBuf, filters: FilterArgs) -> Result<()> {
    let session = run_session(repo, filters, RowRange::default(), false)?;
    println!("{}", session.total()?);
    Ok(())
}

/// Attach a row buffer showing `range` and wait for every request to finish
fn run_session(repo: PathBuf, filters: FilterArgs, range: RowRange, spinner: bool) -> Result<Session> {
    let backend = GitHistoryBackend::open(&repo)?;
    let (sender, receiver) = EventChannel::new();

    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::builder(Box::new(backend))
            .events(sender)
            .revision(filters.rev)
            .search_text(FilterValue::new(filters.search))
            .file_filter(FilterValue::new(filters.path))
            .build();

    let progress = if spinner {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message("Reading history");
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    provider.attach(RowBuffer::with_visible_range(range));
    provider.run_until_idle();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let mut count = None;
    let mut count_error = None;
    let mut failures = Vec::new();
    for event in receiver.drain() {
        match event {
            Event::History(HistoryEvent::CountUpdated { count: total }) => count = Some(total),
            Event::History(HistoryEvent::CountFailed { error, .. }) => count_error = Some(error),
            Event::Notification(notification) => failures.push(notification),
            _ => {}
        }
    }

    let display = provider.detach().unwrap_or_default();
    Ok(Session {
        display,
        count,
        count_error,
        failures,
    })
}

fn print_pretty_rows(term: &Term, range: RowRange, total: usize, rows: &[&CommitInfo]) {
    if rows.is_empty() {
        term.write_line(&format!(
            "{} (showing nothing of {} commits)",
            style("No commits in this range").yellow(),
            style(total).cyan()
        ))
        .ok();
        return;
    }

    for commit in rows {
        let mut labels: Vec<String> = commit
            .refs
            .iter()
            .map(|name| style(name).green().to_string())
            .collect();
        labels.extend(commit.tags.iter().map(|name| style(name).yellow().to_string()));
        let labels = if labels.is_empty() {
            String::new()
        } else {
            format!(" ({})", labels.join(", "))
        };

        term.write_line(&format!(
            "{} {} {}{} {}",
            style(commit.short_id()).yellow(),
            style(commit.date.format("%Y-%m-%d")).dim(),
            style(&commit.author).cyan(),
            labels,
            commit.subject
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!(
            "Rows {}-{} of {}",
            range.start + 1,
            range.start + rows.len(),
            total
        ))
        .dim()
    ))
    .ok();
}

fn print_json_rows(range: RowRange, total: usize, rows: &[&CommitInfo]) -> Result<()> {
    let output = serde_json::json!({
        "total": total,
        "start": range.start,
        "requested": range.length,
        "commits": rows,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
