//! The sync pipeline: fetch, diff, cite, summarize, write, persist.
//!
//! Runs strictly sequentially. Any error aborts the remaining work; files
//! written before the failure stay in place.

use crate::arxiv::{ArxivClient, FetchOptions};
use crate::bibliography::{format_entry, Bibliography};
use crate::content::{blog_post, news_entry, ContentWriter};
use crate::dedup::{plan, RecencyWindow};
use crate::error::Result;
use crate::seen::SeenSet;
use crate::summarizer::{Summarizer, TokenUsage};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Locations of the website files the pipeline reads and writes
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub bibliography: PathBuf,
    pub seen: PathBuf,
    pub news_dir: PathBuf,
    pub blog_dir: PathBuf,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            bibliography: PathBuf::from("_bibliography/papers.bib"),
            seen: PathBuf::from("_data/arxiv_seen.json"),
            news_dir: PathBuf::from("_news"),
            blog_dir: PathBuf::from("_posts"),
        }
    }
}

/// Options for a single run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub fetch: FetchOptions,
    pub window: RecencyWindow,
    /// Plan only: no file writes, no completion calls
    pub dry_run: bool,
    pub paths: SitePaths,
}

/// Outcome of a run, printed to stdout
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub fetched: usize,
    /// Entries appended (or, in a dry run, that would be appended)
    pub cited: Vec<String>,
    /// Papers announced (or, in a dry run, that would be announced)
    pub announced: Vec<String>,
    /// Papers due for announcement that were left for a later run
    pub deferred: Vec<String>,
    pub files_written: Vec<PathBuf>,
    pub seen_updated: bool,
    pub usage: TokenUsage,
    pub dry_run: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "[dry run] " } else { "" };
        writeln!(f, "{}Fetched {} papers from arXiv", prefix, self.fetched)?;
        writeln!(f, "{}New bibliography entries: {}", prefix, self.cited.len())?;
        for id in &self.cited {
            writeln!(f, "  + {}", id)?;
        }
        writeln!(f, "{}Papers announced: {}", prefix, self.announced.len())?;
        for id in &self.announced {
            writeln!(f, "  * {}", id)?;
        }
        if !self.deferred.is_empty() {
            writeln!(
                f,
                "Deferred (no LLM configured): {}",
                self.deferred.join(", ")
            )?;
        }
        for path in &self.files_written {
            writeln!(f, "  wrote {}", path.display())?;
        }
        if self.usage.total_tokens > 0 {
            writeln!(
                f,
                "Token usage: {} prompt + {} completion = {} total",
                self.usage.prompt_tokens, self.usage.completion_tokens, self.usage.total_tokens
            )?;
        }
        write!(
            f,
            "Seen set {}",
            if self.seen_updated { "updated" } else { "unchanged" }
        )
    }
}

/// Run the pipeline once.
///
/// With `summarizer = None` the announcement stage is skipped and the seen
/// set is left alone, so those papers are picked up by a later run.
pub async fn run(
    arxiv: &ArxivClient,
    summarizer: Option<&Summarizer>,
    options: &SyncOptions,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let papers = arxiv.fetch(&options.fetch).await?;

    let seen = SeenSet::load(&options.paths.seen)?;
    let mut bibliography = Bibliography::load(&options.paths.bibliography)?;

    let plan = plan(&papers, &bibliography, &seen, now, options.window);
    info!(
        fetched = papers.len(),
        bib_new = plan.bib_new.len(),
        news_new = plan.news_new.len(),
        dry_run = options.dry_run,
        "Sync plan ready"
    );

    let mut summary = RunSummary {
        fetched: papers.len(),
        cited: plan.bib_new.iter().map(|p| p.id().to_string()).collect(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    if options.dry_run {
        summary.announced = plan.news_new.iter().map(|p| p.id().to_string()).collect();
        return Ok(summary);
    }

    // Citations go out before any completion call.
    let entries: Vec<String> = plan.bib_new.iter().map(|p| format_entry(p)).collect();
    if bibliography.append(&entries)? > 0 {
        summary.files_written.push(bibliography.path().to_path_buf());
    }

    let mut updated_seen = seen.clone();
    match summarizer {
        Some(summarizer) => {
            let writer = ContentWriter::new(&options.paths.news_dir, &options.paths.blog_dir);
            for paper in &plan.news_new {
                updated_seen.insert(paper.id());

                let (generated, usage) = summarizer.summarize(paper).await?;
                summary.usage += usage;

                for file in [news_entry(paper, &generated), blog_post(paper, &generated)] {
                    summary.files_written.push(writer.write(&file)?);
                }
                summary.announced.push(paper.id().to_string());
            }
        }
        None if !plan.news_new.is_empty() => {
            warn!(
                count = plan.news_new.len(),
                "No LLM configured, skipping news and blog generation"
            );
            summary.deferred = plan.news_new.iter().map(|p| p.id().to_string()).collect();
        }
        None => {}
    }

    if updated_seen != seen {
        updated_seen.persist(&options.paths.seen)?;
        summary.seen_updated = true;
    }

    info!(
        cited = summary.cited.len(),
        announced = summary.announced.len(),
        files = summary.files_written.len(),
        "Sync complete"
    );
    Ok(summary)
}
