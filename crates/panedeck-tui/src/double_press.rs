//! Double-press detection ("hold to disambiguate").
//!
//! ```text
//!  Idle ──press──▶ Armed(token) ──press within window──▶ Double  → Idle
//!                       │
//!                       └──timer fires with token──▶ single press → Idle
//! ```
//!
//! The caller owns the timer: on [`Press::Armed`] it schedules a wake-up after
//! `delay` carrying `token` and calls [`DoublePress::fire`] when it arrives.
//! Every transition bumps a generation, so a wake-up for a press that was
//! already coalesced or flushed finds a stale token and does nothing.
//! Instants are passed in, which keeps the machine deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Second press inside the window: act on both at once.
    Double,
    /// First press: wait `delay`, then `fire(token)`.
    Armed {
        token: u64,
        delay: Duration,
        /// An earlier press was still pending but its window had passed;
        /// forward it as a single before this one.
        flush_previous: bool,
    },
}

#[derive(Debug)]
pub struct DoublePress {
    window: Duration,
    pending: Option<(u64, Instant)>,
    generation: u64,
}

impl DoublePress {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            generation: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn press(&mut self, now: Instant) -> Press {
        self.generation += 1;
        match self.pending.take() {
            Some((_, at)) if now.saturating_duration_since(at) < self.window => Press::Double,
            previous => {
                self.pending = Some((self.generation, now));
                Press::Armed {
                    token: self.generation,
                    delay: self.window,
                    flush_previous: previous.is_some(),
                }
            }
        }
    }

    /// Timer wake-up.  True when the pending single press should be forwarded.
    pub fn fire(&mut self, token: u64) -> bool {
        match self.pending {
            Some((pending, _)) if pending == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Another key arrived.  True when a pending press must be forwarded
    /// first so ordering is preserved.
    pub fn interrupt(&mut self) -> bool {
        self.generation += 1;
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
    }
}
