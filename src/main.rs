//! arxiv-sitebot - arXiv to personal website sync
//!
//! Polls arXiv for an author's papers, appends new citations to the site
//! bibliography and writes news/blog posts for recent papers.
//!
//! ## Usage
//!
//! ```bash
//! arxiv-sitebot sync --query 'au:Doe_J' --llm-key "$OPENAI_API_KEY"
//! arxiv-sitebot sync --query 'au:Doe_J' --dry-run
//! arxiv-sitebot seen list
//! ```

use anyhow::{Context, Result};
use arxiv_sitebot::{
    arxiv::{ArxivClient, FetchOptions},
    dedup::{RecencyWindow, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS},
    pipeline::{self, SitePaths, SyncOptions},
    seen::SeenSet,
    summarizer::{LlmConfig, Summarizer, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE},
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// arXiv to personal website sync
#[derive(Parser)]
#[command(name = "arxiv-sitebot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new papers and update bibliography, news and blog
    Sync {
        /// arXiv search expression (e.g. "au:Doe_J")
        #[arg(long, env = "ARXIV_QUERY")]
        query: String,

        /// Maximum number of papers to fetch
        #[arg(long, default_value_t = arxiv_sitebot::arxiv::DEFAULT_MAX_RESULTS)]
        max_results: usize,

        /// Announce papers published within this many days
        #[arg(
            long,
            default_value_t = DEFAULT_WINDOW_DAYS,
            value_parser = clap::value_parser!(i64).range(0..=MAX_WINDOW_DAYS)
        )]
        window_days: i64,

        /// Override the arXiv API endpoint
        #[arg(long, env = "ARXIV_API_URL")]
        arxiv_url: Option<String>,

        #[command(flatten)]
        paths: PathArgs,

        // === LLM Summaries ===
        /// LLM API base URL
        #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
        llm_base_url: String,

        /// LLM API key (news/blog generation is skipped without it)
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        llm_key: Option<String>,

        /// LLM model name
        #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
        llm_model: String,

        /// Sampling temperature
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect or extend the set of announced papers
    Seen {
        /// Seen-identifier file
        #[arg(long, env = "SITEBOT_SEEN", default_value = "_data/arxiv_seen.json")]
        seen: PathBuf,

        #[command(subcommand)]
        action: SeenAction,
    },
}

#[derive(clap::Args)]
struct PathArgs {
    /// Bibliography file
    #[arg(long, env = "SITEBOT_BIB", default_value = "_bibliography/papers.bib")]
    bib: PathBuf,

    /// Seen-identifier file
    #[arg(long, env = "SITEBOT_SEEN", default_value = "_data/arxiv_seen.json")]
    seen: PathBuf,

    /// Directory for news entries
    #[arg(long, env = "SITEBOT_NEWS_DIR", default_value = "_news")]
    news_dir: PathBuf,

    /// Directory for blog posts
    #[arg(long, env = "SITEBOT_BLOG_DIR", default_value = "_posts")]
    blog_dir: PathBuf,
}

impl From<PathArgs> for SitePaths {
    fn from(args: PathArgs) -> Self {
        Self {
            bibliography: args.bib,
            seen: args.seen,
            news_dir: args.news_dir,
            blog_dir: args.blog_dir,
        }
    }
}

#[derive(Subcommand)]
enum SeenAction {
    /// Print announced identifiers
    List,
    /// Mark identifiers as announced without generating content
    Add {
        /// arXiv identifiers (as they appear in the feed, e.g. 2501.01234v1)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sync {
            query,
            max_results,
            window_days,
            arxiv_url,
            paths,
            llm_base_url,
            llm_key,
            llm_model,
            temperature,
            dry_run,
        } => {
            let arxiv = match arxiv_url {
                Some(url) => ArxivClient::with_base(&url),
                None => ArxivClient::new(),
            }
            .context("Failed to create arXiv client")?;

            let window =
                RecencyWindow::new(window_days).context("Invalid --window-days")?;

            let summarizer = match llm_key {
                Some(api_key) if !dry_run => {
                    let config = LlmConfig {
                        base_url: llm_base_url,
                        api_key,
                        model: llm_model,
                        temperature,
                    };
                    Some(Summarizer::new(config).context("Failed to create LLM client")?)
                }
                _ => None,
            };

            let options = SyncOptions {
                fetch: FetchOptions { query, max_results },
                window,
                dry_run,
                paths: paths.into(),
            };

            run_sync(&arxiv, summarizer.as_ref(), &options).await
        }
        Commands::Seen { seen, action } => handle_seen(&seen, action),
    }
}

// ============================================================================
// Sync
// ============================================================================

async fn run_sync(
    arxiv: &ArxivClient,
    summarizer: Option<&Summarizer>,
    options: &SyncOptions,
) -> Result<()> {
    if let Some(s) = summarizer {
        info!(model = %s.model(), "LLM summaries enabled");
    }

    let summary = pipeline::run(arxiv, summarizer, options, Utc::now())
        .await
        .context("Sync failed")?;

    println!("{}", summary);
    Ok(())
}

// ============================================================================
// Seen-set Management
// ============================================================================

fn handle_seen(path: &std::path::Path, action: SeenAction) -> Result<()> {
    let mut seen = SeenSet::load(path)
        .with_context(|| format!("Failed to read seen file {}", path.display()))?;

    match action {
        SeenAction::List => {
            for id in seen.iter() {
                println!("{}", id);
            }
        }
        SeenAction::Add { ids } => {
            let added = ids.into_iter().filter(|id| seen.insert(id.trim())).count();
            if added > 0 {
                seen.persist(path).context("Failed to write seen file")?;
            }
            println!("Added {} identifiers ({} total)", added, seen.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_args(window: &str) -> Vec<&str> {
        vec!["arxiv-sitebot", "sync", "--query", "au:Doe_J", "--window-days", window]
    }

    #[test]
    fn test_window_days_parsing() {
        let cli = Cli::try_parse_from(sync_args("30")).expect("valid window parses");
        match cli.command {
            Commands::Sync { window_days, .. } => assert_eq!(window_days, 30),
            _ => panic!("Expected Sync command"),
        }

        assert!(Cli::try_parse_from(sync_args("-1")).is_err());
        assert!(Cli::try_parse_from(sync_args("200000000000000")).is_err());
        assert!(Cli::try_parse_from(sync_args("36501")).is_err());
    }
}
