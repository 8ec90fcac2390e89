//! Thread-safe, persistent URL frontier with per-domain politeness
//!
//! This module handles:
//! - Deduplication of discovered URLs by normalized-URL hash
//! - Per-authority FIFO queues served in discovery order
//! - Enforcing the politeness delay between requests to one authority
//! - Tracking in-flight downloads for the termination protocol
//! - Persisting every URL and its completion flag for resumption

use crate::state::{DomainState, UrlRecord};
use crate::storage::{open_store, remove_store, FrontierStore, StorageError, StorageResult};
use crate::traps::TrapDetector;
use crate::url::{extract_authority, normalize_url, url_hash};
use crate::UrlError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// Errors surfaced by frontier operations
#[derive(Debug, thiserror::Error)]
pub enum FrontierError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}

/// Everything guarded by the frontier lock
struct FrontierState {
    /// Per-authority queues and clocks; entries are never removed
    domains: HashMap<String, DomainState>,

    /// Authorities with a non-empty queue, in the order they first gained one
    scan_order: Vec<String>,

    /// Hashes of URLs handed out and not yet marked complete
    in_flight: HashSet<String>,

    store: Box<dyn FrontierStore>,
}

impl FrontierState {
    /// Appends a URL to its authority's queue, registering the authority
    /// in the scan order if its queue was empty
    fn enqueue(&mut self, authority: String, url: String) {
        let state = self.domains.entry(authority.clone()).or_default();
        if state.queue.is_empty() && !self.scan_order.contains(&authority) {
            self.scan_order.push(authority);
        }
        state.queue.push_back(url);
    }

    fn pending(&self) -> usize {
        self.domains.values().map(|d| d.queue.len()).sum()
    }
}

/// The crawl frontier shared by all workers
///
/// All operations take a single internal lock; the readiness check and
/// the pop in [`get_next_url`](Self::get_next_url) happen under it
/// atomically, so two workers can never be handed URLs from the same
/// authority within one politeness delay.
pub struct Frontier {
    state: Mutex<FrontierState>,
    politeness_delay: Duration,
}

impl Frontier {
    /// Opens the frontier store at `store_path` and loads or seeds it
    ///
    /// # Arguments
    ///
    /// * `seed_urls` - URLs added when starting fresh or when the store is empty
    /// * `store_path` - Path of the SQLite frontier store
    /// * `restart` - Delete any existing store and start from the seeds
    /// * `politeness_delay` - Minimum time between requests to one authority
    /// * `detector` - Re-validates persisted URLs on resume
    pub fn initialize(
        seed_urls: &[String],
        store_path: &Path,
        restart: bool,
        politeness_delay: Duration,
        detector: &TrapDetector,
    ) -> Result<Self, FrontierError> {
        if restart {
            remove_store(store_path)?;
        } else if !store_path.exists() {
            info!(
                "Did not find save file {}, starting from seed.",
                store_path.display()
            );
        }

        let store = match open_store(store_path) {
            Ok(store) => store,
            Err(e) if !restart => {
                warn!(
                    "Save file {} is unreadable ({}), starting from seed.",
                    store_path.display(),
                    e
                );
                remove_store(store_path)?;
                open_store(store_path)?
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_store(Box::new(store), seed_urls, restart, politeness_delay, detector)
    }

    /// Builds a frontier over an already opened store
    ///
    /// Unless `restart` is set, every incomplete record that still passes
    /// the trap detector is queued again in discovery order. Corrupt records
    /// are skipped. Seeds are added when restarting or when no readable
    /// record was found.
    pub fn from_store(
        store: Box<dyn FrontierStore>,
        seed_urls: &[String],
        restart: bool,
        politeness_delay: Duration,
        detector: &TrapDetector,
    ) -> Result<Self, FrontierError> {
        let frontier = Self {
            state: Mutex::new(FrontierState {
                domains: HashMap::new(),
                scan_order: Vec::new(),
                in_flight: HashSet::new(),
                store,
            }),
            politeness_delay,
        };

        let needs_seed = if restart {
            true
        } else {
            frontier.reload(detector)? == 0
        };

        if needs_seed {
            for url in seed_urls {
                frontier.add_url(url)?;
            }
        }

        Ok(frontier)
    }

    /// Queues persisted incomplete URLs and returns how many records were read
    fn reload(&self, detector: &TrapDetector) -> Result<usize, FrontierError> {
        let mut state = self.lock();
        let records = state.store.iter_all()?;
        let total = records.len();
        let mut to_download = 0;

        for (hash, record) in records {
            if record.completed {
                continue;
            }

            match detector.is_crawlable(&record.url) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Skipping persisted url {}: no longer crawlable", record.url);
                    continue;
                }
                Err(e) => {
                    warn!("Skipping persisted record {}: {}", hash, e);
                    continue;
                }
            }

            let authority = match authority_of(&record.url) {
                Ok(authority) => authority,
                Err(e) => {
                    warn!("Skipping persisted record {}: {}", hash, e);
                    continue;
                }
            };
            state.enqueue(authority, record.url);
            to_download += 1;
        }

        info!(
            "Found {} urls to be downloaded from {} total urls discovered.",
            to_download, total
        );
        Ok(total)
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // every mutation is a single step, so a poisoned guard is still valid
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands out the next URL whose authority is out of cooldown
    ///
    /// Scans authorities in the order they were discovered. Authorities
    /// whose queue has drained are dropped from the scan. Returns `None`
    /// when every authority with work is still cooling down, or when
    /// nothing is queued.
    pub fn get_next_url(&self) -> Option<String> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Instant::now();
        let delay = self.politeness_delay;

        let domains = &state.domains;
        state
            .scan_order
            .retain(|authority| domains.get(authority).map_or(false, |d| !d.queue.is_empty()));

        let url = state.scan_order.iter().find_map(|authority| {
            let domain = state.domains.get_mut(authority)?;
            if domain.is_ready(delay, now) {
                domain.take_next(now)
            } else {
                None
            }
        })?;

        state.in_flight.insert(url_hash(&url));
        Some(url)
    }

    /// Adds a discovered URL to the frontier
    ///
    /// Returns `Ok(true)` if the URL was new and has been persisted and
    /// queued, `Ok(false)` if its normalized form was already known.
    pub fn add_url(&self, raw_url: &str) -> Result<bool, FrontierError> {
        let url = normalize_url(raw_url)?;
        let authority = authority_of(&url)?;
        let hash = url_hash(&url);

        let mut state = self.lock();
        match state.store.get(&hash) {
            Ok(Some(_)) => return Ok(false),
            Ok(None) => {}
            Err(StorageError::CorruptRecord { reason, .. }) => {
                warn!("Overwriting corrupt record for {}: {}", url, reason);
            }
            Err(e) => return Err(e.into()),
        }

        state.store.put(&hash, &UrlRecord::pending(url.clone()))?;
        // persisted records are queued even if the sync below fails
        state.enqueue(authority, url);
        state.store.sync()?;
        Ok(true)
    }

    /// Records that a URL handed out by [`get_next_url`](Self::get_next_url)
    /// has been processed
    ///
    /// The URL's in-flight slot is released before anything is written, so
    /// a store error never leaves it counted as pending. Only a URL that was
    /// actually handed out releases a slot. A URL the frontier has never seen
    /// is logged as an inconsistency and still recorded as completed.
    pub fn mark_complete(&self, url: &str) -> StorageResult<()> {
        let url = normalize_url(url).unwrap_or_else(|_| url.to_string());
        let hash = url_hash(&url);

        let mut state = self.lock();
        state.in_flight.remove(&hash);

        match state.store.get(&hash) {
            Ok(None) => error!("Completed url {}, but have not seen it before.", url),
            Ok(Some(_)) => {}
            Err(StorageError::CorruptRecord { reason, .. }) => {
                warn!("Overwriting corrupt record for {}: {}", url, reason);
            }
            Err(e) => return Err(e),
        }

        state.store.put(&hash, &UrlRecord::completed(url))?;
        state.store.sync()
    }

    /// True while any URL is queued or any download is in flight
    ///
    /// In-flight downloads can still discover new URLs, so an empty set of
    /// queues alone does not mean the crawl is over.
    pub fn has_pending_work(&self) -> bool {
        let state = self.lock();
        !state.in_flight.is_empty() || state.domains.values().any(|d| !d.queue.is_empty())
    }

    /// Number of queued URLs across all authorities
    pub fn pending_count(&self) -> usize {
        self.lock().pending()
    }

    /// Number of URLs handed out and not yet completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Number of distinct URLs ever recorded
    pub fn discovered_count(&self) -> StorageResult<usize> {
        self.lock().store.len()
    }

    /// Number of URLs recorded as completed
    pub fn completed_count(&self) -> StorageResult<usize> {
        self.lock().store.count_completed()
    }

    /// Checks whether a URL (in any equivalent form) has been completed
    pub fn is_completed(&self, url: &str) -> Result<bool, FrontierError> {
        let hash = url_hash(&normalize_url(url)?);
        let record = self.lock().store.get(&hash)?;
        Ok(record.map_or(false, |r| r.completed))
    }

    /// Checks whether a URL (in any equivalent form) has ever been recorded
    pub fn contains(&self, url: &str) -> Result<bool, FrontierError> {
        let hash = url_hash(&normalize_url(url)?);
        Ok(self.lock().store.get(&hash)?.is_some())
    }
}

fn authority_of(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    extract_authority(&parsed).ok_or_else(|| UrlError::MissingHost(url.to_string()))
}
