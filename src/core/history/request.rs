//! Request tickets and the responders handed to backends.

use super::types::{CommitCount, CommitInfo, RowRange};
use crate::error::ServerError;
use crossbeam_channel::Sender;

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    /// Monotonic per provider
    pub token: u64,
    /// Applied-count generation at issue time
    pub generation: u64,
}

/// A backend answer on its way back to the provider's thread
#[derive(Debug)]
pub(crate) enum Completion {
    Count {
        ticket: Ticket,
        result: Result<CommitCount, ServerError>,
    },
    Page {
        ticket: Ticket,
        range: RowRange,
        result: Result<Vec<CommitInfo>, ServerError>,
    },
}

type Complete<T> = Box<dyn FnOnce(Result<T, ServerError>) -> Completion + Send>;

/// One-shot reply handle for a backend request
///
/// May be moved to any thread. Dropping it without calling
/// [`Responder::respond`] completes the request with
/// [`ServerError::Abandoned`].
pub struct Responder<T> {
    tx: Sender<Completion>,
    complete: Option<Complete<T>>,
}

impl<T> Responder<T> {
    /// Deliver the outcome of the request
    pub fn respond(mut self, result: Result<T, ServerError>) {
        self.finish(result);
    }

    fn finish(&mut self, result: Result<T, ServerError>) {
        if let Some(complete) = self.complete.take() {
            // The provider may already be gone; nobody is left to tell.
            let _ = self.tx.send(complete(result));
        }
    }
}

impl Responder<CommitCount> {
    pub(crate) fn for_count(tx: Sender<Completion>, ticket: Ticket) -> Self {
        Self {
            tx,
            complete: Some(Box::new(move |result| Completion::Count { ticket, result })),
        }
    }
}

impl Responder<Vec<CommitInfo>> {
    pub(crate) fn for_page(tx: Sender<Completion>, ticket: Ticket, range: RowRange) -> Self {
        Self {
            tx,
            complete: Some(Box::new(move |result| Completion::Page {
                ticket,
                range,
                result,
            })),
        }
    }
}

impl<T> Drop for Responder<T> {
    fn drop(&mut self) {
        self.finish(Err(ServerError::Abandoned));
    }
}

impl<T> std::fmt::Debug for Responder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("answered", &self.complete.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::thread;

    const TICKET: Ticket = Ticket {
        token: 3,
        generation: 1,
    };

    #[test]
    fn respond_posts_completion() {
        let (tx, rx) = unbounded();
        let responder = Responder::for_count(tx, TICKET);

        responder.respond(Ok(CommitCount { count: 12 }));

        match rx.try_recv().unwrap() {
            Completion::Count { ticket, result } => {
                assert_eq!(ticket, TICKET);
                assert_eq!(result, Ok(CommitCount { count: 12 }));
            }
            other => panic!("unexpected completion {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_responder_reports_abandoned() {
        let (tx, rx) = unbounded();
        let responder = Responder::for_page(tx, TICKET, RowRange::new(5, 5));

        drop(responder);

        match rx.try_recv().unwrap() {
            Completion::Page { range, result, .. } => {
                assert_eq!(range, RowRange::new(5, 5));
                assert_eq!(result, Err(ServerError::Abandoned));
            }
            other => panic!("unexpected completion {:?}", other),
        }
    }

    #[test]
    fn responder_can_answer_from_another_thread() {
        let (tx, rx) = unbounded();
        let responder = Responder::for_page(tx, TICKET, RowRange::new(0, 2));

        thread::spawn(move || responder.respond(Ok(Vec::new())))
            .join()
            .unwrap();

        assert!(matches!(
            rx.recv().unwrap(),
            Completion::Page { result: Ok(rows), .. } if rows.is_empty()
        ));
    }
}
