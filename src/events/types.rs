//! Event type definitions for history paging.

use crate::core::history::{HistoryFilter, RowRange};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};

/// All events emitted by a history page provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Request and completion events
    History(HistoryEvent),
    /// Messages meant for the user
    Notification(Notification),
}

/// Events describing the traffic between provider and backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// A count request was issued
    CountRequested { token: u64, filter: HistoryFilter },
    /// A new total row count was pushed into the display
    CountUpdated { count: usize },
    /// The latest count request failed; the display keeps its row count
    CountFailed { token: u64, error: ServerError },
    /// A page request was issued
    PageRequested { token: u64, range: RowRange },
    /// Rows were written into the display
    PageLoaded { start: usize, rows: usize },
    /// A completion arrived for a superseded request and was dropped
    ResponseDiscarded { token: u64 },
}

/// User-visible notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// An error dialog with a fixed caption
    Error { caption: String, message: String },
}
