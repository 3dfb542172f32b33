//! # Events Module
//!
//! Event-driven reporting for GUI layers.
//!
//! ## Design
//! The provider emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe, show error dialogs and trace traffic.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut provider = HistoryPageProvider::builder(backend).events(sender).build();
//!
//! provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 15)));
//! provider.run_until_idle();
//!
//! for event in receiver.drain() {
//!     if let Event::Notification(Notification::Error { caption, message }) = event {
//!         eprintln!("{}: {}", caption, message);
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
