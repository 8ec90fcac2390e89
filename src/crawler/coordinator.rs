//! Crawl orchestration
//!
//! The `Crawler` owns the shared pieces of a crawl (frontier, fetcher, trap
//! detector and analytics), spawns a fixed pool of worker threads over them
//! and blocks until every worker has stopped.

use crate::analytics::Analytics;
use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::Worker;
use crate::traps::TrapDetector;
use crate::{CrawlerError, Result};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Main crawler structure
pub struct Crawler {
    threads: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    detector: Arc<TrapDetector>,
    analytics: Option<Arc<Analytics>>,
}

impl Crawler {
    /// Creates a crawler over an existing frontier
    pub fn new(
        threads: usize,
        frontier: Arc<Frontier>,
        fetcher: Arc<dyn Fetcher>,
        detector: Arc<TrapDetector>,
        analytics: Option<Arc<Analytics>>,
    ) -> Self {
        Self {
            threads: threads.max(1),
            frontier,
            fetcher,
            detector,
            analytics,
        }
    }

    /// Builds the trap detector and frontier described by `config`
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `restart` - Discard the saved frontier and start from the seeds
    /// * `fetcher` - Downloads pages for every worker
    /// * `analytics` - Receives every downloaded HTML page, if present
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to start
    /// * `Err(CrawlerError)` - The frontier store could not be opened or seeded
    pub fn from_config(
        config: &Config,
        restart: bool,
        fetcher: Arc<dyn Fetcher>,
        analytics: Option<Arc<Analytics>>,
    ) -> Result<Self> {
        let detector = TrapDetector::new(
            config.crawler.allowed_domains.clone(),
            config.traps.clone(),
        );

        let frontier = Frontier::initialize(
            &config.crawler.seed_urls,
            Path::new(&config.storage.save_file),
            restart,
            config.crawler.politeness(),
            &detector,
        )?;

        Ok(Self::new(
            config.crawler.threads_count,
            Arc::new(frontier),
            fetcher,
            Arc::new(detector),
            analytics,
        ))
    }

    /// The frontier shared by the workers
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Runs the worker pool to completion
    ///
    /// Every worker is joined even if another one fails.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every worker found the frontier empty
    /// * `Err(CrawlerError)` - The first worker failure, in worker order: a
    ///   store error, or `WorkerPanic` if a worker thread panicked
    pub fn start(&self) -> Result<()> {
        let started = Instant::now();
        tracing::info!("Starting crawl with {} workers", self.threads);

        let mut handles = Vec::with_capacity(self.threads);
        for id in 0..self.threads {
            let worker = Worker::new(
                id,
                Arc::clone(&self.frontier),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.detector),
                self.analytics.clone(),
            );

            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker.run())?;
            handles.push((id, handle));
        }

        let mut first_error = None;
        for (id, handle) in handles {
            let outcome = match handle.join() {
                Ok(outcome) => outcome,
                Err(_) => Err(CrawlerError::WorkerPanic { id }),
            };

            if let Err(e) = outcome {
                tracing::error!("Worker {} stopped with an error: {}", id, e);
                first_error.get_or_insert(e);
            }
        }

        tracing::info!(
            "Crawl finished in {:?}: {} of {} discovered urls completed",
            started.elapsed(),
            self.frontier.completed_count()?,
            self.frontier.discovered_count()?
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
