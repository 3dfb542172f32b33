//! Integration tests for the history page provider.
//!
//! These tests drive the provider through its public API only:
//! - The attach → count → page round trip
//! - Backends answering from other threads
//! - Filter changes coming from shared input fields

use chrono::DateTime;
use commit_history_pager::core::backend::{HistoryBackend, HistoryRecord, InMemoryHistory};
use commit_history_pager::core::history::{
    CommitCount, CommitInfo, FilterValue, HistoryFilter, HistoryPageProvider, Responder,
    RowBuffer, RowRange,
};
use commit_history_pager::events::{Event, EventChannel, HistoryEvent, Notification};
use commit_history_pager::ServerError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn commit(index: usize) -> CommitInfo {
    CommitInfo {
        id: format!("{:040x}", index),
        author: "Ann <ann@example.com>".to_string(),
        subject: format!("Change number {}", index),
        description: String::new(),
        parents: Vec::new(),
        refs: Vec::new(),
        tags: Vec::new(),
        date: DateTime::from_timestamp(1_700_000_000 - index as i64 * 60, 0).unwrap(),
    }
}

/// Answers from a worker thread after a short delay, like a remote server
#[derive(Clone)]
struct RemoteBackend {
    total: usize,
    fail_pages: bool,
    seen: Arc<Mutex<Vec<String>>>,
}

impl RemoteBackend {
    fn new(total: usize) -> Self {
        Self {
            total,
            fail_pages: false,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl HistoryBackend for RemoteBackend {
    fn history_count(&self, filter: &HistoryFilter, responder: Responder<CommitCount>) {
        self.seen
            .lock()
            .unwrap()
            .push(format!("count rev={}", filter.revision));
        let total = self.total;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            responder.respond(Ok(CommitCount { count: total }));
        });
    }

    fn history_page(
        &self,
        filter: &HistoryFilter,
        skip: usize,
        max_entries: usize,
        responder: Responder<Vec<CommitInfo>>,
    ) {
        self.seen.lock().unwrap().push(format!(
            "page rev={} skip={} max={}",
            filter.revision, skip, max_entries
        ));
        let total = self.total;
        let fail = self.fail_pages;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            if fail {
                responder.respond(Err(ServerError::Backend("object store offline".to_string())));
            } else {
                let end = (skip + max_entries).min(total);
                responder.respond(Ok((skip..end).map(commit).collect()));
            }
        });
    }
}

#[test]
fn attach_count_then_page_end_to_end() {
    let backend = RemoteBackend::new(137);
    let (sender, receiver) = EventChannel::new();
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::builder(Box::new(backend.clone()))
            .events(sender)
            .build();

    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 15)));
    provider.run_until_idle();

    let display = provider.display().unwrap();
    assert_eq!(display.row_count(), 137);
    assert_eq!(display.loaded_rows(), 15);
    for index in 0..15 {
        assert_eq!(display.row(index).unwrap(), &commit(index));
    }
    assert!(display.row(15).is_none());

    assert_eq!(
        *backend.seen.lock().unwrap(),
        vec!["count rev=".to_string(), "page rev= skip=0 max=15".to_string()]
    );

    let counts: Vec<usize> = receiver
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::History(HistoryEvent::CountUpdated { count }) => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![137]);
}

#[test]
fn entry_points_return_before_responses_arrive() {
    let backend = RemoteBackend::new(40);
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::new(Box::new(backend));

    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 10)));

    assert_eq!(provider.display().unwrap().row_count(), 0);
    assert_eq!(provider.in_flight(), 1);

    provider.run_until_idle();
    assert_eq!(provider.in_flight(), 0);
    assert_eq!(provider.display().unwrap().loaded_rows(), 10);
}

#[test]
fn scrolling_fetches_the_new_window() {
    let backend = RemoteBackend::new(137);
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::new(Box::new(backend.clone()));
    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 15)));
    provider.run_until_idle();

    provider.scroll_to(RowRange::new(50, 20));
    provider.run_until_idle();

    let display = provider.display().unwrap();
    assert_eq!(display.row(50).unwrap(), &commit(50));
    assert_eq!(display.row(69).unwrap(), &commit(69));
    assert!(display.row(70).is_none());
    assert_eq!(display.loaded_rows(), 35);
    assert_eq!(
        backend.seen.lock().unwrap().last().unwrap(),
        "page rev= skip=50 max=20"
    );
}

#[test]
fn page_failure_reaches_the_user() {
    let mut backend = RemoteBackend::new(20);
    backend.fail_pages = true;
    let (sender, receiver) = EventChannel::new();
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::builder(Box::new(backend))
            .events(sender)
            .build();

    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 15)));
    provider.run_until_idle();

    let notifications: Vec<Notification> = receiver
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Notification(n) => Some(n),
            _ => None,
        })
        .collect();

    assert_eq!(
        notifications,
        vec![Notification::Error {
            caption: "Error Fetching History".to_string(),
            message: "object store offline".to_string(),
        }]
    );
    assert_eq!(provider.display().unwrap().row_count(), 20);
    assert_eq!(provider.display().unwrap().loaded_rows(), 0);
}

#[test]
fn shared_search_field_drives_memory_history() {
    let records = (0..30)
        .map(|index| {
            let mut info = commit(index);
            if index % 3 == 0 {
                info.subject = format!("Fix bug {}", index);
            }
            HistoryRecord::new(info, vec![PathBuf::from(format!("src/file{}.rs", index % 2))])
        })
        .collect();
    let search_field = FilterValue::new(String::new());
    let path_field = FilterValue::new(None);
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::builder(Box::new(InMemoryHistory::from_records(records)))
            .search_text(search_field.clone())
            .file_filter(path_field.clone())
            .build();

    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 50)));
    provider.run_until_idle();
    assert_eq!(provider.display().unwrap().row_count(), 30);

    search_field.set("fix".to_string());
    provider.refresh_count();
    provider.run_until_idle();
    assert_eq!(provider.display().unwrap().row_count(), 10);

    path_field.set(Some(PathBuf::from("src/file0.rs")));
    provider.refresh_count();
    provider.run_until_idle();

    let display = provider.display().unwrap();
    // Multiples of 6 below 30
    assert_eq!(display.row_count(), 5);
    assert_eq!(display.row(0).unwrap().subject, "Fix bug 0");
    assert_eq!(display.row(4).unwrap().subject, "Fix bug 24");
}

#[test]
fn unknown_revision_leaves_count_untouched() {
    let records = (0..5).map(|index| HistoryRecord::new(commit(index), Vec::new())).collect();
    let (sender, receiver) = EventChannel::new();
    let mut provider: HistoryPageProvider<RowBuffer> =
        HistoryPageProvider::builder(Box::new(InMemoryHistory::from_records(records)))
            .events(sender)
            .build();
    provider.attach(RowBuffer::with_visible_range(RowRange::new(0, 5)));
    provider.run_until_idle();
    receiver.drain();

    provider.apply_filter(HistoryFilter::new("no-such-branch", None, ""));
    provider.run_until_idle();

    assert_eq!(provider.display().unwrap().row_count(), 5);
    assert!(receiver
        .drain()
        .iter()
        .all(|event| !matches!(event, Event::Notification(_))));
}
