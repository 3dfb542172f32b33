//! # Commit History Pager
//!
//! A paginated, filterable source of commit history for virtualized tables.
//!
//! ## How it works
//! - A table asks for the rows it can see
//! - The provider asks a backend how many commits match and fetches the visible page
//! - Results are written back into the table at the requested offset
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - The page provider and its backends
//! - `events` - Event-driven reporting and user notifications (GUI-ready)
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{HistoryError, Result, ServerError};

/// Initialize tracing for the library
///
/// Reads `RUST_LOG`; `default_filter` applies when it is unset.
/// Calling this more than once keeps the first subscriber.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
