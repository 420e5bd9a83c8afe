//! arXiv API Client
//!
//! Queries the arXiv export API for papers matching a search expression and
//! parses the Atom response into [`Paper`] records.
//!
//! API Details:
//! - Endpoint: GET https://export.arxiv.org/api/query
//! - Parameters: search_query, start, max_results, sortBy, sortOrder
//! - Response: Atom 1.0 with `arxiv:` namespaced extensions

use crate::error::{OptionExt, Result, SiteBotError};
use crate::paper::{Paper, ARXIV_ABS_BASE};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// arXiv export API endpoint
const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of results requested per run
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Query options for an arXiv fetch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// arXiv search expression, e.g. `au:Doe_J`
    pub query: String,
    /// Upper bound on returned entries
    pub max_results: usize,
}

impl FetchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// arXiv API client
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Client,
    base: String,
}

impl ArxivClient {
    /// Create a client for the public arXiv endpoint
    pub fn new() -> Result<Self> {
        Self::with_base(ARXIV_API_URL)
    }

    /// Create a client for an arbitrary endpoint (mirror or test server)
    pub fn with_base(base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("arxiv-sitebot/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SiteBotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: base.to_string(),
        })
    }

    /// Fetch the newest papers matching `options.query`.
    ///
    /// Any non-success status is returned as an error; there is no retry.
    pub async fn fetch(&self, options: &FetchOptions) -> Result<Vec<Paper>> {
        info!(
            query = %options.query,
            max_results = options.max_results,
            "Querying arXiv"
        );

        let max_results = options.max_results.to_string();
        let response = self
            .client
            .get(&self.base)
            .query(&[
                ("search_query", options.query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteBotError::Api {
                code: status.as_u16() as i32,
                message: format!("arXiv API error: {}", status),
            });
        }

        let body = response.text().await?;
        let papers = parse_feed(&body)?;

        info!(count = papers.len(), "Parsed arXiv feed");
        Ok(papers)
    }
}

/// Element whose text is currently being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Accumulates one `<entry>` while the reader walks through it
#[derive(Debug, Default)]
struct EntryBuilder {
    id_url: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    category: String,
}

impl EntryBuilder {
    fn build(self) -> Result<Paper> {
        let id_url = self.id_url.trim().to_string();
        let id = short_id(&id_url);

        let published = self.published.trim();
        let published: DateTime<Utc> = DateTime::parse_from_rfc3339(published)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_parse(&format!("Invalid published timestamp for {}: '{}'", id, published))?;

        let url = format!("{}{}", ARXIV_ABS_BASE, id);

        Ok(Paper::new(
            id,
            collapse_whitespace(&self.title),
            collapse_whitespace(&self.summary),
            self.authors,
            self.category.trim(),
            published,
            url,
        ))
    }

    fn push_text(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Id => &mut self.id_url,
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
            Field::AuthorName => match self.authors.last_mut() {
                Some(name) => name,
                None => return,
            },
        };
        target.push_str(text);
    }

    /// Handle attributes of `<arxiv:primary_category>`
    fn apply_attributes(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"primary_category" => {
                if let Some(term) = attribute(e, b"term") {
                    self.category = term;
                }
            }
            _ => {}
        }
    }
}

/// Parse an arXiv Atom feed into papers.
///
/// Namespace prefixes are ignored. Entries without authors or without a
/// primary category are accepted with an empty author list / category.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if let Some(current) = entry.as_mut() {
                    field = match e.local_name().as_ref() {
                        b"id" => Some(Field::Id),
                        b"title" => Some(Field::Title),
                        b"summary" => Some(Field::Summary),
                        b"published" => Some(Field::Published),
                        b"author" => {
                            current.authors.push(String::new());
                            None
                        }
                        b"name" => Some(Field::AuthorName),
                        _ => {
                            current.apply_attributes(&e);
                            None
                        }
                    };
                } else if e.local_name().as_ref() == b"entry" {
                    entry = Some(EntryBuilder::default());
                }
            }
            Event::Empty(e) => {
                if let Some(current) = entry.as_mut() {
                    current.apply_attributes(&e);
                }
            }
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| SiteBotError::Parse(format!("Bad text in feed: {}", e)))?;
                    current.push_text(f, &text);
                }
            }
            Event::CData(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    current.push_text(f, &String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                field = None;
                match e.local_name().as_ref() {
                    b"entry" => {
                        if let Some(done) = entry.take() {
                            let paper = done.build()?;
                            debug!(id = %paper.id(), title = %paper.title(), "Parsed entry");
                            papers.push(paper);
                        }
                    }
                    b"author" => {
                        if let Some(current) = entry.as_mut() {
                            let keep = current
                                .authors
                                .last()
                                .map(|name| !name.trim().is_empty())
                                .unwrap_or(false);
                            if keep {
                                if let Some(name) = current.authors.last_mut() {
                                    *name = collapse_whitespace(name);
                                }
                            } else {
                                current.authors.pop();
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(papers)
}

/// Trailing path segment of an arXiv id URL
fn short_id(id_url: &str) -> String {
    id_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(id_url)
        .to_string()
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
