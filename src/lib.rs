//! # arxiv-sitebot
//!
//! Keeps an academic website in sync with arXiv: new citations go into the
//! bibliography, recent papers get a news blurb and a blog post.
//!
//! ## Modules
//!
//! - [`arxiv`] - arXiv API client and Atom feed parsing
//! - [`bibliography`] - BibTeX entry generation and append-only updates
//! - [`dedup`] - Change detection against persisted state
//! - [`summarizer`] - LLM news/blog generation
//! - [`content`] - Front-matter rendering and content files
//! - [`seen`] - Persisted set of announced papers
//! - [`pipeline`] - The sequential sync run
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arxiv_sitebot::{arxiv, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = arxiv::ArxivClient::new()?;
//!     let options = pipeline::SyncOptions {
//!         fetch: arxiv::FetchOptions::new("au:Doe_J"),
//!         window: Default::default(),
//!         dry_run: true,
//!         paths: Default::default(),
//!     };
//!     let summary = pipeline::run(&client, None, &options, chrono::Utc::now()).await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod arxiv;
pub mod bibliography;
pub mod content;
pub mod dedup;
pub mod error;
pub mod paper;
pub mod pipeline;
pub mod prompts;
pub mod seen;
pub mod summarizer;

pub use error::{Result, SiteBotError};
pub use paper::Paper;
