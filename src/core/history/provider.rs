//! The history page provider.

use super::display::HistoryDisplay;
use super::request::{Completion, Responder, Ticket};
use super::types::{CommitCount, CommitInfo, FilterValue, HistoryFilter, RowRange};
use crate::core::backend::HistoryBackend;
use crate::events::{null_sender, Event, EventSender, HistoryEvent, Notification};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Caption of the dialog shown when a page cannot be fetched
pub const DEFAULT_ERROR_CAPTION: &str = "Error Fetching History";

/// What to do with a completion whose request has been superseded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleResponsePolicy {
    /// Apply only the latest request of each kind, dropping pages that
    /// predate the last applied count
    #[default]
    DiscardStale,
    /// Apply every completion in arrival order
    LastWriteWins,
}

/// Configuration for the provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub stale_responses: StaleResponsePolicy,
    /// Caption for page fetch error notifications
    pub error_caption: String,
    /// Whether pushed row counts are reported as exact
    pub exact_counts: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            stale_responses: StaleResponsePolicy::default(),
            error_caption: DEFAULT_ERROR_CAPTION.to_string(),
            exact_counts: true,
        }
    }
}

/// Builder for a history page provider
pub struct ProviderBuilder<D> {
    backend: Box<dyn HistoryBackend>,
    config: ProviderConfig,
    events: Option<EventSender>,
    revision: String,
    search_text: FilterValue<String>,
    file_filter: FilterValue<Option<PathBuf>>,
    display: PhantomData<fn() -> D>,
}

impl<D: HistoryDisplay> ProviderBuilder<D> {
    /// Create a builder around a backend
    pub fn new(backend: Box<dyn HistoryBackend>) -> Self {
        Self {
            backend,
            config: ProviderConfig::default(),
            events: None,
            revision: String::new(),
            search_text: FilterValue::new(String::new()),
            file_filter: FilterValue::new(None),
            display: PhantomData,
        }
    }

    /// Report requests, completions and notifications to `events`
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn stale_responses(mut self, policy: StaleResponsePolicy) -> Self {
        self.config.stale_responses = policy;
        self
    }

    pub fn error_caption(mut self, caption: impl Into<String>) -> Self {
        self.config.error_caption = caption.into();
        self
    }

    pub fn exact_counts(mut self, exact: bool) -> Self {
        self.config.exact_counts = exact;
        self
    }

    /// Initial revision
    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Bind the search text to an existing holder
    pub fn search_text(mut self, holder: FilterValue<String>) -> Self {
        self.search_text = holder;
        self
    }

    /// Bind the file filter to an existing holder
    pub fn file_filter(mut self, holder: FilterValue<Option<PathBuf>>) -> Self {
        self.file_filter = holder;
        self
    }

    /// Build the provider
    pub fn build(self) -> HistoryPageProvider<D> {
        let (tx, rx) = unbounded();
        HistoryPageProvider {
            backend: self.backend,
            config: self.config,
            events: self.events.unwrap_or_else(null_sender),
            revision: self.revision,
            search_text: self.search_text,
            file_filter: self.file_filter,
            display: None,
            tx,
            rx,
            next_token: 1,
            generation: 0,
            latest_count: None,
            latest_page: None,
            in_flight: 0,
        }
    }
}

/// Feeds a virtualized history table from a [`HistoryBackend`]
///
/// Owned by one thread. Requests are issued immediately; their outcomes
/// are applied when the owner calls [`process_pending`](Self::process_pending),
/// [`process_next`](Self::process_next) or
/// [`run_until_idle`](Self::run_until_idle).
pub struct HistoryPageProvider<D: HistoryDisplay> {
    backend: Box<dyn HistoryBackend>,
    config: ProviderConfig,
    events: EventSender,
    revision: String,
    search_text: FilterValue<String>,
    file_filter: FilterValue<Option<PathBuf>>,
    display: Option<D>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_token: u64,
    /// Number of counts applied so far
    generation: u64,
    latest_count: Option<u64>,
    latest_page: Option<u64>,
    in_flight: usize,
}

impl<D: HistoryDisplay> HistoryPageProvider<D> {
    /// Create a provider with default configuration
    pub fn new(backend: Box<dyn HistoryBackend>) -> Self {
        ProviderBuilder::new(backend).build()
    }

    pub fn builder(backend: Box<dyn HistoryBackend>) -> ProviderBuilder<D> {
        ProviderBuilder::new(backend)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Make `display` the active table and request its row count
    ///
    /// A previously attached display is dropped.
    pub fn attach(&mut self, display: D) {
        if self.display.replace(display).is_some() {
            debug!("replacing the attached history display");
        }
        self.refresh_count();
    }

    /// Remove the active table; later completions have nowhere to go
    pub fn detach(&mut self) -> Option<D> {
        self.display.take()
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    pub fn display_mut(&mut self) -> Option<&mut D> {
        self.display.as_mut()
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// The holder the search text is read from
    pub fn search_text(&self) -> &FilterValue<String> {
        &self.search_text
    }

    /// The holder the file filter is read from
    pub fn file_filter(&self) -> &FilterValue<Option<PathBuf>> {
        &self.file_filter
    }

    /// Follow with [`refresh_count`](Self::refresh_count) to reload.
    pub fn set_revision(&mut self, revision: impl Into<String>) {
        self.revision = revision.into();
    }

    /// Follow with [`refresh_count`](Self::refresh_count) to reload.
    pub fn set_search_text(&mut self, holder: FilterValue<String>) {
        self.search_text = holder;
    }

    /// Follow with [`refresh_count`](Self::refresh_count) to reload.
    pub fn set_file_filter(&mut self, holder: FilterValue<Option<PathBuf>>) {
        self.file_filter = holder;
    }

    /// Current filter values, read now
    pub fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            revision: self.revision.clone(),
            file_filter: self.file_filter.get(),
            search_text: self.search_text.get(),
        }
    }

    /// Write all three filters and reload the count
    pub fn apply_filter(&mut self, filter: HistoryFilter) {
        self.revision = filter.revision;
        self.search_text.set(filter.search_text);
        self.file_filter.set(filter.file_filter);
        self.refresh_count();
    }

    /// Ask the backend for the number of matching commits
    ///
    /// Pages requested before this count is applied are treated as stale
    /// once it lands. A failed count leaves them alone.
    pub fn refresh_count(&mut self) {
        let filter = self.filter();
        let ticket = self.issue();
        self.latest_count = Some(ticket.token);

        debug!(
            token = ticket.token,
            revision = %filter.revision,
            search = %filter.search_text,
            "requesting history count"
        );
        self.events.send(Event::History(HistoryEvent::CountRequested {
            token: ticket.token,
            filter: filter.clone(),
        }));

        let responder = Responder::for_count(self.tx.clone(), ticket);
        self.backend.history_count(&filter, responder);
    }

    /// Fetch the rows the attached display currently shows
    pub fn on_range_changed(&mut self) {
        let Some(display) = self.display.as_ref() else {
            debug!("range change without an attached display");
            return;
        };
        let range = display.visible_range();
        let filter = self.filter();
        let ticket = self.issue();
        self.latest_page = Some(ticket.token);

        debug!(
            token = ticket.token,
            start = range.start,
            length = range.length,
            "requesting history page"
        );
        self.events.send(Event::History(HistoryEvent::PageRequested {
            token: ticket.token,
            range,
        }));

        let responder = Responder::for_page(self.tx.clone(), ticket, range);
        self.backend
            .history_page(&filter, range.start, range.length, responder);
    }

    /// Move the display's window and fetch it
    pub fn scroll_to(&mut self, range: RowRange) {
        if let Some(display) = self.display.as_mut() {
            display.set_visible_range(range);
        }
        self.on_range_changed();
    }

    /// Requests issued but not yet processed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply every completion that has already arrived
    ///
    /// Returns the number of completions processed.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            processed += 1;
        }
        processed
    }

    /// Wait for one completion and apply it
    ///
    /// Returns `false` without blocking when nothing is in flight.
    pub fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv() {
            Ok(completion) => {
                self.apply(completion);
                true
            }
            Err(_) => false,
        }
    }

    /// Process completions until nothing is in flight
    ///
    /// Completions may issue follow-up requests (a new count requests the
    /// visible range); those are waited for too.
    pub fn run_until_idle(&mut self) {
        while self.process_next() {}
    }

    fn issue(&mut self) -> Ticket {
        let ticket = Ticket {
            token: self.next_token,
            generation: self.generation,
        };
        self.next_token += 1;
        self.in_flight += 1;
        ticket
    }

    fn is_stale(&self, ticket: Ticket, latest: Option<u64>) -> bool {
        match self.config.stale_responses {
            StaleResponsePolicy::LastWriteWins => false,
            StaleResponsePolicy::DiscardStale => {
                latest != Some(ticket.token) || ticket.generation < self.generation
            }
        }
    }

    fn discard(&self, ticket: Ticket) {
        debug!(token = ticket.token, "discarding stale history response");
        self.events.send(Event::History(HistoryEvent::ResponseDiscarded {
            token: ticket.token,
        }));
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Count { ticket, result } => {
                if self.is_stale(ticket, self.latest_count) {
                    self.discard(ticket);
                    return;
                }
                match result {
                    Ok(CommitCount { count }) => self.update_row_count(count),
                    Err(e) => {
                        error!(token = ticket.token, error = %e, "failed to fetch history count");
                        self.events.send(Event::History(HistoryEvent::CountFailed {
                            token: ticket.token,
                            error: e,
                        }));
                    }
                }
            }
            Completion::Page {
                ticket,
                range,
                result,
            } => {
                if self.is_stale(ticket, self.latest_page) {
                    self.discard(ticket);
                    return;
                }
                match result {
                    Ok(rows) => self.update_row_data(range.start, rows),
                    Err(e) => {
                        warn!(
                            token = ticket.token,
                            start = range.start,
                            error = %e,
                            "failed to fetch history page"
                        );
                        self.events.send(Event::Notification(Notification::Error {
                            caption: self.config.error_caption.clone(),
                            message: e.user_message(),
                        }));
                    }
                }
            }
        }
    }

    fn update_row_count(&mut self, count: usize) {
        let Some(display) = self.display.as_mut() else {
            debug!(count, "no display attached, dropping row count");
            return;
        };
        display.set_row_count(count, self.config.exact_counts);
        let range = display.visible_range();
        self.generation += 1;
        self.events
            .send(Event::History(HistoryEvent::CountUpdated { count }));

        // The table re-requests its window once it knows the new size.
        if !range.is_empty() && range.start < count {
            self.on_range_changed();
        }
    }

    fn update_row_data(&mut self, start: usize, rows: Vec<CommitInfo>) {
        let Some(display) = self.display.as_mut() else {
            debug!(start, "no display attached, dropping rows");
            return;
        };
        let loaded = rows.len();
        display.set_row_data(start, rows);
        self.events.send(Event::History(HistoryEvent::PageLoaded {
            start,
            rows: loaded,
        }));
    }
}
