use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marks one fetch in initiation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Drops results of fetches that were superseded by a newer one.
///
/// Every fetch takes a ticket before it starts; when it finishes, its result
/// is applied only if no other fetch was started in the meantime. Ordering is
/// by start, not by completion. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct LatestOnly {
    issued: Arc<AtomicU64>,
}

impl LatestOnly {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// `Some(value)` if `ticket` is still the newest, otherwise `None`.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_latest(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding superseded result");
            None
        }
    }
}
