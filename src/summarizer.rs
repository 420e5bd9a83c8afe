//! LLM-based news and blog generation for papers.
//!
//! Sends one OpenAI-compatible chat-completion request per paper and decodes
//! the JSON object in the reply into a [`Summary`].

use crate::error::{Result, SiteBotError};
use crate::paper::Paper;
use crate::prompts::announcement::{build_user_prompt, SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::time::Duration;
use tracing::{debug, info};

/// Request timeout in seconds (OpenAI SDK default)
const REQUEST_TIMEOUT_SECS: u64 = 600;

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Generated website text for one paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub news_title: String,
    pub news_body: String,
    pub blog_title: String,
    pub blog_body: String,
}

/// Token usage tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// OpenAI-compatible API response structures
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// Chat-completion client producing [`Summary`] values
pub struct Summarizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl Summarizer {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SiteBotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Summarize a single paper.
    ///
    /// No retry. A non-success status is an [`SiteBotError::Api`]; a reply
    /// that does not decode into all four non-empty fields is a
    /// [`SiteBotError::MalformedSummary`].
    pub async fn summarize(&self, paper: &Paper) -> Result<(Summary, TokenUsage)> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(paper)}
            ],
            "response_format": {"type": "json_object"},
            "temperature": self.config.temperature,
        });

        let api_url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        debug!(id = %paper.id(), model = %self.config.model, "Sending LLM request");

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(SiteBotError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SiteBotError::Api {
                code: status.as_u16() as i32,
                message: format!("LLM API error: {} - {}", status, error_text),
            });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SiteBotError::Parse(format!("Failed to parse LLM response: {}", e)))?;

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let summary = parse_summary(&content, paper.id())?;

        info!(
            id = %paper.id(),
            news_title = %summary.news_title,
            total_tokens = usage.total_tokens,
            "Paper summarized"
        );

        Ok((summary, usage))
    }
}

/// Decode and validate the model output
pub fn parse_summary(content: &str, id: &str) -> Result<Summary> {
    let malformed = |reason: String| SiteBotError::MalformedSummary {
        id: id.to_string(),
        reason,
    };

    let json_str = extract_json(content);
    let summary: Summary = serde_json::from_str(&json_str).map_err(|e| {
        let preview: String = content.chars().take(200).collect();
        debug!(error = %e, content_preview = %preview, "LLM output parse failed");
        malformed(e.to_string())
    })?;

    let fields = [
        ("news_title", &summary.news_title),
        ("news_body", &summary.news_body),
        ("blog_title", &summary.blog_title),
        ("blog_body", &summary.blog_body),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(malformed(format!("field `{}` is empty", name)));
    }

    Ok(summary)
}

/// Extract JSON from LLM response (handles markdown code blocks)
fn extract_json(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() >= 2 {
            let end = if lines.last().map(|l| l.trim()) == Some("```") {
                lines.len() - 1
            } else {
                lines.len()
            };
            return lines[1..end].join("\n");
        }
    }

    trimmed.to_string()
}
