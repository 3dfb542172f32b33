//! # History Module
//!
//! Pages commit history into a virtualized table.
//!
//! ## Flow
//! 1. A display is attached and the provider asks the backend for a count
//! 2. The count is pushed into the display, which then needs its visible range
//! 3. The provider fetches that range and writes the rows at its offset
//!
//! ## Filters
//! Revision, file path and search text are read when a request is issued.
//! Count failures are only logged; page failures raise a notification.

mod display;
mod provider;
mod request;
mod types;

pub use display::{HistoryDisplay, RowBuffer};
pub use provider::{
    HistoryPageProvider, ProviderBuilder, ProviderConfig, StaleResponsePolicy,
    DEFAULT_ERROR_CAPTION,
};
pub use request::Responder;
pub use types::{CommitCount, CommitInfo, FilterValue, HistoryFilter, RowRange};
