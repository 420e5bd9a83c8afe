//! BibTeX bibliography maintenance.
//!
//! The bibliography is treated as an append-only text blob. Membership of a
//! paper is a raw substring search for its identifier; entries are never
//! parsed back.

use crate::error::Result;
use crate::paper::Paper;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Number of title words that go into a citation key
const KEY_TITLE_WORDS: usize = 3;

/// Surname placeholder for papers without authors
const ANONYMOUS_SURNAME: &str = "unknown";

static ALNUM_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("valid word regex"));

/// Bibliography file contents plus the path they came from
#[derive(Debug, Clone)]
pub struct Bibliography {
    path: PathBuf,
    text: String,
}

impl Bibliography {
    /// Read the bibliography at `path`; a missing file is an empty bibliography
    pub fn load(path: &Path) -> Result<Self> {
        let text = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            debug!(path = %path.display(), "Bibliography not found, starting empty");
            String::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Raw substring test for `id` anywhere in the file
    pub fn contains(&self, id: &str) -> bool {
        self.text.contains(id)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append all `entries` in one write, separated by blank lines.
    ///
    /// Creates the file and its parent directory if needed. Returns the
    /// number of entries written; an empty slice touches nothing.
    pub fn append(&mut self, entries: &[String]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut chunk = String::new();
        if !self.text.is_empty() {
            if !self.text.ends_with('\n') {
                chunk.push('\n');
            }
            chunk.push('\n');
        }
        chunk.push_str(&entries.join("\n\n"));
        chunk.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(chunk.as_bytes())?;

        self.text.push_str(&chunk);
        info!(
            count = entries.len(),
            path = %self.path.display(),
            "Appended bibliography entries"
        );
        Ok(entries.len())
    }
}

/// Citation key: first author's surname, year, first three title words.
///
/// `"Jane Q. Doe"`, 2025, `"Scalable Flow Matching for Graphs"` gives
/// `doe2025scalableflowmatching`. Two papers may produce the same key.
pub fn citation_key(paper: &Paper) -> String {
    let surname = paper
        .first_author()
        .and_then(|name| name.split_whitespace().last())
        .map(|last| {
            last.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ANONYMOUS_SURNAME.to_string());

    let title_words: String = ALNUM_WORD
        .find_iter(paper.title())
        .take(KEY_TITLE_WORDS)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    format!("{}{}{}", surname, paper.year(), title_words)
}

/// Render the fixed-field `@article` block for a paper
pub fn format_entry(paper: &Paper) -> String {
    format!(
        "@article{{{key},\n  title = {{{title}}},\n  author = {{{authors}}},\n  year = {{{year}}},\n  eprint = {{{id}}},\n  archivePrefix = {{arXiv}},\n  primaryClass = {{{category}}},\n  url = {{{url}}}\n}}",
        key = citation_key(paper),
        title = paper.title(),
        authors = paper.authors().join(" and "),
        year = paper.year(),
        id = paper.id(),
        category = paper.primary_category(),
        url = paper.url(),
    )
}
