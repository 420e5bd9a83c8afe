//! Announcement prompts for turning a paper into website content.
//!
//! Contains the system prompt and user prompt template for generating a news
//! blurb and a blog post from a paper's metadata.

use crate::paper::Paper;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder regex"));

/// System prompt for news + blog generation
pub const SYSTEM_PROMPT: &str = r#"You write content for an academic's personal website. Given the metadata of a newly released paper, you produce two pieces of text about it.

Rules you MUST follow:
- Use ONLY the information in the provided title, authors and abstract. Do NOT invent results, numbers, datasets or collaborators.
- Write in the first person plural ("we"), in a friendly but precise tone.
- Output MUST be a single valid JSON object (no markdown, no extra text), for machine parsing.

Fields:
- news_title: a short headline announcing the paper (max 12 words).
- news_body: one or two sentences announcing the paper; may use Markdown, and should link the paper URL.
- blog_title: a title for a blog post about the paper.
- blog_body: a 3-5 paragraph blog post in Markdown explaining the problem, the idea and why it matters, for a technical but non-specialist reader.

Output format (strict JSON, no markdown code block):
{
  "news_title": "...",
  "news_body": "...",
  "blog_title": "...",
  "blog_body": "..."
}"#;

/// User prompt template for a single paper
/// Placeholders: {title}, {authors}, {url}, {abstract}
pub const USER_PROMPT_TEMPLATE: &str = r#"Write the news blurb and blog post for the following paper.

Title: {title}
Authors: {authors}
URL: {url}

Abstract:
{abstract}"#;

/// Build user prompt with paper data.
///
/// Placeholders are filled in a single pass, so braces inside the paper's
/// own text are never expanded.
pub fn build_user_prompt(paper: &Paper) -> String {
    let authors = paper.authors().join(", ");
    let url = paper.abs_url();
    PLACEHOLDER
        .replace_all(USER_PROMPT_TEMPLATE, |caps: &Captures<'_>| match &caps[1] {
            "title" => paper.title().to_string(),
            "authors" => authors.clone(),
            "url" => url.clone(),
            "abstract" => paper.abstract_text().to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
