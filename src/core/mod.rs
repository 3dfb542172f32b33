//! # Core Module
//!
//! The GUI-agnostic history paging engine.
//!
//! ## Modules
//! - `history` - The page provider, its filters and the display contract
//! - `backend` - Where counts and pages come from

pub mod backend;
pub mod history;

// Re-export commonly used types
pub use backend::{GitHistoryBackend, HistoryBackend, InMemoryHistory};
pub use history::{
    CommitInfo, FilterValue, HistoryDisplay, HistoryFilter, HistoryPageProvider, RowBuffer,
    RowRange,
};
