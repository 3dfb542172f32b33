//! # Backend Module
//!
//! Sources of commit history for the page provider.
//!
//! ## Backends
//! - `GitHistoryBackend` - Reads a local repository on worker threads
//! - `InMemoryHistory` - A fixed linear history, for tests and demos
//!
//! ## Query semantics
//! An empty revision starts at HEAD. The file filter keeps commits that
//! touch the path or anything beneath it. Search text is matched without
//! regard to case against id, author, subject and description.

mod git;
mod memory;
mod traits;

pub use git::GitHistoryBackend;
pub use memory::{HistoryRecord, InMemoryHistory};
pub use traits::HistoryBackend;
