//! Types shared by the provider, its displays and its backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// A shared, externally writable filter value
///
/// Clones share the same slot, so a UI input field can keep one clone and
/// write into it while the provider reads the current value at request time.
#[derive(Debug, Default)]
pub struct FilterValue<T> {
    inner: Arc<RwLock<T>>,
}

impl<T: Clone> FilterValue<T> {
    /// Create a holder with an initial value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Read the current value
    pub fn get(&self) -> T {
        match self.inner.read() {
            Ok(value) => value.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current value
    pub fn set(&self, value: T) {
        match self.inner.write() {
            Ok(mut slot) => *slot = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl<T> Clone for FilterValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Snapshot of the three history filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Revision to start from; empty means the current HEAD
    pub revision: String,
    /// Only commits touching this path; `None` means the whole tree
    pub file_filter: Option<PathBuf>,
    /// Free-text search; empty means no text filter
    pub search_text: String,
}

impl HistoryFilter {
    pub fn new(
        revision: impl Into<String>,
        file_filter: Option<PathBuf>,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            file_filter,
            search_text: search_text.into(),
        }
    }

    /// Case-insensitive substring match against id, author, subject and description
    pub fn matches_text(&self, commit: &CommitInfo) -> bool {
        let needle = self.search_text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            commit.id.as_str(),
            commit.author.as_str(),
            commit.subject.as_str(),
            commit.description.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Whether any of the touched paths falls under the file filter
    pub fn matches_paths<P: AsRef<Path>>(&self, touched: &[P]) -> bool {
        match &self.file_filter {
            None => true,
            Some(filter) => touched.iter().any(|path| path.as_ref().starts_with(filter)),
        }
    }
}

/// A commit as relayed to the history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    /// "Name <email>"
    pub author: String,
    pub subject: String,
    pub description: String,
    pub parents: Vec<String>,
    /// Branch names pointing at this commit
    pub refs: Vec<String>,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
}

impl CommitInfo {
    /// Abbreviated id for display
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// Result of a count request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitCount {
    pub count: usize,
}

/// A window of rows, as requested by a virtualized table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    pub start: usize,
    pub length: usize,
}

impl RowRange {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// One past the last row
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
