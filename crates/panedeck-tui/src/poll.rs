//! Adaptive, self re-arming polling.
//!
//! A poll chain never runs on a fixed interval.  Each completed poll asks for
//! the next one, and the delay depends on how long the user has been idle:
//! fast right after input, slower as the pane goes quiet.  Every wake-up
//! carries the chain's generation; `stop` (or a restart) bumps it so wake-ups
//! already in flight are ignored and the chain dies out on its own.

use std::time::{Duration, Instant};

use panedeck_proto::config::PollingConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub fast: Duration,
    pub medium: Duration,
    pub slow: Duration,
    pub medium_after: Duration,
    pub slow_after: Duration,
}

impl PollPolicy {
    pub fn delay_for(&self, idle: Duration) -> Duration {
        if idle >= self.slow_after {
            self.slow
        } else if idle >= self.medium_after {
            self.medium
        } else {
            self.fast
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(c: &PollingConfig) -> Self {
        Self {
            fast: Duration::from_millis(c.fast_ms),
            medium: Duration::from_millis(c.medium_ms),
            slow: Duration::from_millis(c.slow_ms),
            medium_after: Duration::from_secs(c.medium_after_secs),
            slow_after: Duration::from_secs(c.slow_after_secs),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

#[derive(Debug)]
pub struct PollChain {
    policy: PollPolicy,
    generation: u64,
    running: bool,
    last_activity: Instant,
}

impl PollChain {
    pub fn new(policy: PollPolicy, now: Instant) -> Self {
        Self {
            policy,
            generation: 0,
            running: false,
            last_activity: now,
        }
    }

    /// Start (or restart) the chain.  Returns the generation the first
    /// wake-up must carry.
    pub fn start(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.running = true;
        self.last_activity = now;
        self.generation
    }

    pub fn stop(&mut self) {
        self.generation += 1;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.running && generation == self.generation
    }

    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn next_delay(&self, now: Instant) -> Duration {
        self.policy.delay_for(self.idle(now))
    }
}

/// Deliver `msg` on `tx` after `delay`.  A closed channel is not an error;
/// the receiver is simply gone.
pub fn schedule<M: Send + 'static>(
    tx: mpsc::UnboundedSender<M>,
    delay: Duration,
    msg: M,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(msg);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PollPolicy {
        PollPolicy::default()
    }

    #[test]
    fn test_delay_steps_with_idle_time() {
        let p = policy();
        assert_eq!(p.delay_for(Duration::ZERO), Duration::from_millis(50));
        assert_eq!(p.delay_for(Duration::from_millis(1999)), Duration::from_millis(50));
        assert_eq!(p.delay_for(Duration::from_secs(2)), Duration::from_millis(200));
        assert_eq!(p.delay_for(Duration::from_secs(9)), Duration::from_millis(200));
        assert_eq!(p.delay_for(Duration::from_secs(10)), Duration::from_millis(500));
    }

    #[test]
    fn test_restart_resets_to_fast() {
        let t0 = Instant::now();
        let mut chain = PollChain::new(policy(), t0);
        chain.start(t0);
        let later = t0 + Duration::from_secs(30);
        assert_eq!(chain.next_delay(later), Duration::from_millis(500));
        chain.start(later);
        assert_eq!(chain.next_delay(later), Duration::from_millis(50));
    }

    #[test]
    fn test_stop_and_restart_invalidate_old_wakeups() {
        let t0 = Instant::now();
        let mut chain = PollChain::new(policy(), t0);
        let g1 = chain.start(t0);
        assert!(chain.is_current(g1));
        chain.stop();
        assert!(!chain.is_current(g1));
        let g2 = chain.start(t0);
        assert!(!chain.is_current(g1));
        assert!(chain.is_current(g2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_dies_after_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let t0 = Instant::now();
        let mut chain = PollChain::new(policy(), t0);
        let generation = chain.start(t0);

        let mut polls = 0;
        schedule(tx.clone(), chain.next_delay(t0), generation);
        while let Some(g) = rx.recv().await {
            if !chain.is_current(g) {
                continue;
            }
            polls += 1;
            if polls == 3 {
                // Switching views: the wake-up already scheduled must be ignored.
                schedule(tx.clone(), chain.next_delay(t0), g);
                chain.stop();
                drop(tx);
                break;
            }
            schedule(tx.clone(), chain.next_delay(t0), g);
        }
        assert_eq!(polls, 3);
        let late = rx.recv().await;
        assert_eq!(late, Some(generation));
        assert!(!chain.is_current(generation));
        assert_eq!(rx.recv().await, None);
    }
}
