//! Persistent set of already announced arXiv identifiers.
//!
//! Stored as a sorted JSON array of strings. Identifiers are only ever
//! added; the file is rewritten wholesale through a temp file + rename.

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Ordered set of identifiers that already produced news/blog output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    ids: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the set from `path`.
    ///
    /// A missing file yields an empty set. A file that is not a JSON array
    /// of strings is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Seen file not found, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let ids: Vec<String> = serde_json::from_str(&content)?;
        info!(count = ids.len(), path = %path.display(), "Loaded seen identifiers");

        Ok(Self {
            ids: ids.into_iter().collect(),
        })
    }

    /// Add an identifier, returning `true` if it was not present yet
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Write the full set to `path`, creating parent directories.
    ///
    /// Content is written to a sibling `.tmp` file and renamed over the target.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let ids: Vec<&str> = self.iter().collect();
        let mut content = serde_json::to_string_pretty(&ids)?;
        content.push('\n');

        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, path)?;

        info!(count = ids.len(), path = %path.display(), "Saved seen identifiers");
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
