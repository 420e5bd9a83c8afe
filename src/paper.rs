//! Paper record as fetched from arXiv.

use chrono::{DateTime, Datelike, Utc};

/// arXiv abstract page prefix used for identifier-derived URLs
pub const ARXIV_ABS_BASE: &str = "https://arxiv.org/abs/";

/// A single arXiv paper.
///
/// Created fresh from the feed on every run and never mutated afterwards;
/// fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    id: String,
    title: String,
    abstract_text: String,
    authors: Vec<String>,
    primary_category: String,
    published: DateTime<Utc>,
    url: String,
}

impl Paper {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        authors: Vec<String>,
        primary_category: impl Into<String>,
        published: DateTime<Utc>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            authors,
            primary_category: primary_category.into(),
            published,
            url: url.into(),
        }
    }

    /// Short arXiv identifier, e.g. `2301.12345v1`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Author names in feed order
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Primary subject category (e.g. `cs.LG`), empty when the feed omits it
    pub fn primary_category(&self) -> &str {
        &self.primary_category
    }

    pub fn published(&self) -> DateTime<Utc> {
        self.published
    }

    pub fn year(&self) -> i32 {
        self.published.year()
    }

    /// Canonical abstract page URL, `https://arxiv.org/abs/<id>`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL built from the identifier alone
    pub fn abs_url(&self) -> String {
        format!("{}{}", ARXIV_ABS_BASE, self.id)
    }
}
