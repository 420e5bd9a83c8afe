//! Custom error types for arxiv-sitebot.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, SiteBotError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for arxiv-sitebot operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum SiteBotError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response content could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Atom feed is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message from API
        message: String,
    },

    /// Completion endpoint answered, but not with a usable summary
    #[error("Malformed summary for {id}: {reason}")]
    MalformedSummary {
        /// arXiv identifier of the paper being summarized
        id: String,
        reason: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `SiteBotError`
pub type Result<T> = std::result::Result<T, SiteBotError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| SiteBotError::Parse(msg.to_string()))
    }
}
