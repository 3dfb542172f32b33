//! History backend trait definition.

use crate::core::history::{CommitCount, CommitInfo, HistoryFilter, Responder};

/// Trait for history backends
///
/// Both calls are asynchronous: an implementation may answer before
/// returning, from a worker thread, or from a transport callback. Each
/// responder must eventually be answered or dropped.
pub trait HistoryBackend: Send + Sync {
    /// Count the commits matching `filter`
    fn history_count(&self, filter: &HistoryFilter, responder: Responder<CommitCount>);

    /// Fetch up to `max_entries` matching commits after skipping `skip`,
    /// newest first
    fn history_page(
        &self,
        filter: &HistoryFilter,
        skip: usize,
        max_entries: usize,
        responder: Responder<Vec<CommitInfo>>,
    );
}
