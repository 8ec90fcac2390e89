use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks the state of one network authority during crawling
///
/// Holds the FIFO of URLs waiting for this authority and the time of the
/// last request handed out for it. The clock outlives the queue: an
/// authority whose queue drains and later refills still honours the
/// politeness delay from its previous request.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// URLs waiting to be fetched, served front to back
    pub queue: VecDeque<String>,

    /// Timestamp of the last request to this authority
    pub last_access: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with an empty queue and no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the politeness delay has elapsed since the last request
    ///
    /// An authority that has never been requested is always ready.
    pub fn is_ready(&self, delay: Duration, now: Instant) -> bool {
        match self.last_access {
            Some(last) => now.saturating_duration_since(last) >= delay,
            None => true,
        }
    }

    /// Pops the next URL and stamps the access time
    ///
    /// Returns `None` without touching the clock when the queue is empty.
    pub fn take_next(&mut self, now: Instant) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.last_access = Some(now);
        Some(url)
    }
}
