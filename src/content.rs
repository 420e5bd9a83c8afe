//! Website content generation.
//!
//! Renders a [`Summary`] into a news entry and a blog post, each a text file
//! with a front-matter header followed by the body.

use crate::error::Result;
use crate::paper::Paper;
use crate::summarizer::Summary;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

/// Extension of generated files
const CONTENT_EXT: &str = "md";

/// Front-matter delimiter line
const FRONT_MATTER_MARKER: &str = "---";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid non-word regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Which site collection a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    News,
    Blog,
}

/// A rendered file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub kind: ContentKind,
    pub file_name: String,
    pub content: String,
}

/// Header value: quoted scalar or bracketed list
enum Value<'a> {
    Text(&'a str),
    List(&'a [&'a str]),
}

/// Lower-case, hyphenated, filename-safe form of a title.
///
/// `"A New Result: Fast & Simple!"` gives `a-new-result-fast-simple`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE_RUN
        .replace_all(stripped.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// News entry: short blurb linking the paper
pub fn news_entry(paper: &Paper, summary: &Summary) -> GeneratedFile {
    let date = iso_date(paper);
    let header = [
        ("layout", Value::Text("post")),
        ("title", Value::Text(&summary.news_title)),
        ("date", Value::Text(&date)),
        ("tags", Value::List(&["paper"])),
        ("category", Value::Text("news")),
        ("inline", Value::Text("true")),
        ("link", Value::Text(paper.url())),
    ];

    GeneratedFile {
        kind: ContentKind::News,
        file_name: file_name(&date, &summary.news_title),
        content: render(&header, &summary.news_body),
    }
}

/// Blog post: the long-form summary
pub fn blog_post(paper: &Paper, summary: &Summary) -> GeneratedFile {
    let date = iso_date(paper);
    let header = [
        ("layout", Value::Text("post")),
        ("title", Value::Text(&summary.blog_title)),
        ("date", Value::Text(&date)),
        ("tags", Value::List(&["paper"])),
        ("categories", Value::List(&["research"])),
    ];

    GeneratedFile {
        kind: ContentKind::Blog,
        file_name: file_name(&date, &summary.blog_title),
        content: render(&header, &summary.blog_body),
    }
}

fn iso_date(paper: &Paper) -> String {
    paper.published().format("%Y-%m-%d").to_string()
}

fn file_name(date: &str, title: &str) -> String {
    format!("{}-{}.{}", date, slugify(title), CONTENT_EXT)
}

fn render(header: &[(&str, Value<'_>)], body: &str) -> String {
    let mut out = String::new();
    out.push_str(FRONT_MATTER_MARKER);
    out.push('\n');
    for (key, value) in header {
        let rendered = match value {
            Value::Text(text) => format!("\"{}\"", escape(text)),
            Value::List(items) => format!("[{}]", items.join(", ")),
        };
        out.push_str(&format!("{}: {}\n", key, rendered));
    }
    out.push_str(FRONT_MATTER_MARKER);
    out.push_str("\n\n");
    out.push_str(body.trim_end());
    out.push('\n');
    out
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes generated files into the site's news and blog directories
#[derive(Debug, Clone)]
pub struct ContentWriter {
    news_dir: PathBuf,
    blog_dir: PathBuf,
}

impl ContentWriter {
    pub fn new(news_dir: impl Into<PathBuf>, blog_dir: impl Into<PathBuf>) -> Self {
        Self {
            news_dir: news_dir.into(),
            blog_dir: blog_dir.into(),
        }
    }

    /// Target path for a file of the given kind
    pub fn path_for(&self, file: &GeneratedFile) -> PathBuf {
        let dir: &Path = match file.kind {
            ContentKind::News => &self.news_dir,
            ContentKind::Blog => &self.blog_dir,
        };
        dir.join(&file.file_name)
    }

    /// Write `file`, replacing whatever is at the computed path
    pub fn write(&self, file: &GeneratedFile) -> Result<PathBuf> {
        let path = self.path_for(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.content)?;
        info!(kind = ?file.kind, path = %path.display(), "Wrote content file");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn fixture() -> (Paper, Summary) {
        let published = Utc
            .with_ymd_and_hms(2025, 5, 20, 17, 59, 0)
            .single()
            .expect("valid timestamp");
        let paper = Paper::new(
            "2505.01234v1",
            "Scalable Flow Matching for Graphs",
            "",
            vec!["Jane Q. Doe".to_string()],
            "cs.LG",
            published,
            "https://arxiv.org/abs/2505.01234v1",
        );
        let summary = Summary {
            news_title: "Flow matching \"scales\"!".to_string(),
            news_body: "Our paper is out.\n".to_string(),
            blog_title: "A New Result: Fast & Simple!".to_string(),
            blog_body: "Paragraph one.\n\nParagraph two.".to_string(),
        };
        (paper, summary)
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("A New Result: Fast & Simple!"), "a-new-result-fast-simple");
        assert_eq!(slugify("  Spaced\t\tout  title "), "spaced-out-title");
        assert_eq!(slugify("Already-hyphenated words"), "already-hyphenated-words");
        assert_eq!(slugify("- Intro -"), "intro");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_news_entry() {
        let (paper, summary) = fixture();
        let file = news_entry(&paper, &summary);
        assert_eq!(file.kind, ContentKind::News);
        assert_eq!(file.file_name, "2025-05-20-flow-matching-scales.md");
        assert_eq!(
            file.content,
            "---\n\
             layout: \"post\"\n\
             title: \"Flow matching \\\"scales\\\"!\"\n\
             date: \"2025-05-20\"\n\
             tags: [paper]\n\
             category: \"news\"\n\
             inline: \"true\"\n\
             link: \"https://arxiv.org/abs/2505.01234v1\"\n\
             ---\n\
             \n\
             Our paper is out.\n"
        );
    }

    #[test]
    fn test_blog_post() {
        let (paper, summary) = fixture();
        let file = blog_post(&paper, &summary);
        assert_eq!(file.kind, ContentKind::Blog);
        assert_eq!(file.file_name, "2025-05-20-a-new-result-fast-simple.md");
        assert!(file.content.contains("tags: [paper]\n"));
        assert!(file.content.contains("categories: [research]\n"));
        assert!(file.content.ends_with("---\n\nParagraph one.\n\nParagraph two.\n"));
    }

    #[test]
    fn test_writer_overwrites() -> Result<()> {
        let dir = TempDir::new()?;
        let writer = ContentWriter::new(dir.path().join("_news"), dir.path().join("_posts"));
        let (paper, summary) = fixture();

        let first = writer.write(&news_entry(&paper, &summary))?;
        let mut changed = summary.clone();
        changed.news_body = "Replaced.".to_string();
        let second = writer.write(&news_entry(&paper, &changed))?;

        assert_eq!(first, second);
        assert!(first.starts_with(dir.path().join("_news")));
        let raw = std::fs::read_to_string(&second)?;
        assert!(raw.ends_with("\n\nReplaced.\n"));

        let blog = writer.write(&blog_post(&paper, &summary))?;
        assert!(blog.starts_with(dir.path().join("_posts")));
        Ok(())
    }
}
