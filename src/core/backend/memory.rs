//! In-memory history backend for testing and demos.

use super::HistoryBackend;
use crate::core::history::{CommitCount, CommitInfo, HistoryFilter, Responder};
use crate::error::ServerError;
use std::path::PathBuf;
use std::sync::RwLock;

/// A commit together with the paths it touched
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub commit: CommitInfo,
    pub paths: Vec<PathBuf>,
}

impl HistoryRecord {
    pub fn new(commit: CommitInfo, paths: Vec<PathBuf>) -> Self {
        Self { commit, paths }
    }
}

/// In-memory history backend
///
/// Holds a linear history, newest first, and answers every request
/// before returning.
pub struct InMemoryHistory {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a history from records ordered newest first
    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Add a commit on top of the history
    pub fn push(&self, record: HistoryRecord) -> Result<(), ServerError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(0, record);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, ServerError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, ServerError> {
        Ok(self.len()? == 0)
    }

    fn matching(&self, filter: &HistoryFilter) -> Result<Vec<CommitInfo>, ServerError> {
        let records = self.records.read().map_err(|_| poisoned())?;

        let revision = filter.revision.trim();
        let start = if revision.is_empty() {
            0
        } else {
            records
                .iter()
                .position(|record| names_revision(&record.commit, revision))
                .ok_or_else(|| ServerError::RevisionNotFound {
                    revision: revision.to_string(),
                })?
        };

        Ok(records[start..]
            .iter()
            .filter(|record| filter.matches_paths(&record.paths))
            .filter(|record| filter.matches_text(&record.commit))
            .map(|record| record.commit.clone())
            .collect())
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn names_revision(commit: &CommitInfo, revision: &str) -> bool {
    commit.id.starts_with(revision)
        || commit.refs.iter().any(|name| name == revision)
        || commit.tags.iter().any(|name| name == revision)
}

fn poisoned() -> ServerError {
    ServerError::Backend("history store is poisoned".to_string())
}

impl HistoryBackend for InMemoryHistory {
    fn history_count(&self, filter: &HistoryFilter, responder: Responder<CommitCount>) {
        let result = self
            .matching(filter)
            .map(|commits| CommitCount {
                count: commits.len(),
            });
        responder.respond(result);
    }

    fn history_page(
        &self,
        filter: &HistoryFilter,
        skip: usize,
        max_entries: usize,
        responder: Responder<Vec<CommitInfo>>,
    ) {
        let result = self.matching(filter).map(|commits| {
            commits
                .into_iter()
                .skip(skip)
                .take(max_entries)
                .collect()
        });
        responder.respond(result);
    }
}
