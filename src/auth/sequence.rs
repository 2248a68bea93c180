use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one auth state change cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out tickets in arrival order. Only the most recent ticket is
/// current; results carried by older tickets are stale.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    latest: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate every ticket handed out so far.
    pub fn supersede(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
