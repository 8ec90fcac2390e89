//! Crawl worker loop
//!
//! Each worker runs on its own OS thread and repeats:
//! 1. Request a URL from the frontier (sleep and retry while every domain
//!    is cooling down, stop once there is no pending work at all)
//! 2. Fetch it
//! 3. Extract links and feed the page to analytics
//! 4. Add every link that passes the trap detector
//! 5. Mark the URL complete
//!
//! Every URL handed out is marked complete, whatever happened while
//! processing it, so one bad page never stalls termination. A failed fetch
//! is logged and the worker moves on. Store errors and panics end the
//! worker after its URL has been completed.

use crate::analytics::Analytics;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, FrontierError};
use crate::traps::{TrapDetector, Verdict};
use crate::CrawlerError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long a worker waits when all pending domains are in cooldown
pub const COOLDOWN_RETRY: Duration = Duration::from_millis(100);

/// One crawl worker
pub struct Worker {
    id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    detector: Arc<TrapDetector>,
    analytics: Option<Arc<Analytics>>,
}

impl Worker {
    pub fn new(
        id: usize,
        frontier: Arc<Frontier>,
        fetcher: Arc<dyn Fetcher>,
        detector: Arc<TrapDetector>,
        analytics: Option<Arc<Analytics>>,
    ) -> Self {
        Self {
            id,
            frontier,
            fetcher,
            detector,
            analytics,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs until the frontier has no pending work
    ///
    /// # Errors
    ///
    /// Returns a `CrawlerError::Storage` if the frontier store cannot be
    /// written, or `CrawlerError::WorkerPanic` if processing a page panicked.
    /// The page is marked complete before either is reported.
    pub fn run(&self) -> Result<(), CrawlerError> {
        loop {
            let url = match self.frontier.get_next_url() {
                Some(url) => url,
                None if self.frontier.has_pending_work() => {
                    thread::sleep(COOLDOWN_RETRY);
                    continue;
                }
                None => {
                    info!("Frontier is empty. Stopping crawler.");
                    return Ok(());
                }
            };

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.process(&url))) {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!("Worker {} panicked while processing {}", self.id, url);
                    Err(CrawlerError::WorkerPanic { id: self.id })
                }
            };

            // an uncompleted url would keep the other workers waiting forever
            let completed = self.frontier.mark_complete(&url);
            if let Err(e) = &outcome {
                error!("Worker {} stopping after {}: {}", self.id, url, e);
            }
            outcome?;
            completed?;
        }
    }

    fn process(&self, url: &str) -> Result<(), CrawlerError> {
        let links = match self.fetcher.fetch(url) {
            Ok(response) => {
                info!("Downloaded {}, status <{}>", url, response.status);
                extract(&response, url, self.analytics.as_deref())
            }
            Err(e) => {
                warn!("Failed to download {}: {}", url, e);
                Vec::new()
            }
        };

        let mut added = 0;
        for link in &links {
            if self.dispatch(link)? {
                added += 1;
            }
        }
        if !links.is_empty() {
            debug!("{} of {} links from {} were new", added, links.len(), url);
        }
        Ok(())
    }

    /// Adds one discovered link if the trap detector lets it through
    ///
    /// Returns whether the link was new to the frontier. Malformed links are
    /// logged and dropped.
    fn dispatch(&self, link: &str) -> Result<bool, CrawlerError> {
        match self.detector.classify(link) {
            Ok(Verdict::Crawlable) => {}
            Ok(Verdict::Rejected(reason)) => {
                debug!("Rejected {}: {}", link, reason);
                return Ok(false);
            }
            Err(e) => {
                warn!("Dropping malformed link {}: {}", link, e);
                return Ok(false);
            }
        }

        match self.frontier.add_url(link) {
            Ok(added) => Ok(added),
            Err(FrontierError::Url(e)) => {
                warn!("Dropping malformed link {}: {}", link, e);
                Ok(false)
            }
            Err(FrontierError::Storage(e)) => Err(e.into()),
        }
    }
}
