use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued query. Only the most recent token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken(u64);

/// Monotonic query counter: a response is applied only if its token is still
/// the latest issued.
#[derive(Debug, Default)]
pub struct QueryGate {
    latest: AtomicU64,
}

impl QueryGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query, superseding every earlier token.
    pub fn issue(&self) -> QueryToken {
        QueryToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Invalidate any outstanding query without starting a new one.
    pub fn cancel(&self) {
        self.issue();
    }
}
