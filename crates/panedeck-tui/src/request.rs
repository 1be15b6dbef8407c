//! Latest-wins request tokens.
//!
//! Nothing in flight is ever cancelled.  Each request gets a fresh token and
//! a result is applied only if its token is still the newest one issued.

use tracing::trace;

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
    pending: bool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for a new request; every older token becomes stale.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.pending = true;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.pending && token == self.latest
    }

    /// Accept a result.  False (and the result should be dropped) when a
    /// newer request was issued or this one was already accepted.
    pub fn accept(&mut self, token: u64) -> bool {
        if self.is_current(token) {
            self.pending = false;
            true
        } else {
            trace!(token, latest = self.latest, "dropping stale result");
            false
        }
    }

    /// Forget the outstanding request (e.g. the modal closed).
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
