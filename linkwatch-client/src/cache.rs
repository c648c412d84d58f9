//! Process-wide cache of link status snapshots.
//!
//! Each entry tracks the last fetched snapshot, the last fetch error, a
//! staleness deadline, and an expiry deadline that starts once the entry
//! has no subscribers. The cache also carries the in-flight marker used to
//! coalesce concurrent fetches for the same link: the first caller claims
//! a lease and performs the network call, later callers attach to the
//! lease's completion channel and observe the same outcome.
//!
//! The cache is an explicitly constructed object, never a global. All
//! operations lock briefly and never hold the lock across an await, so an
//! entry is always observed either before or after a mutation, never in
//! between.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use linkwatch_types::{LinkId, LinkStatus, LinkView};

use crate::error::FetchError;

/// Outcome of one fetch, shared between coalesced callers.
pub(crate) type FetchOutcome = Result<LinkStatus, FetchError>;

/// Timing configuration for cache entries.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched snapshot is served without refetching.
    pub stale_after: Duration,
    /// How long an entry survives after its last subscriber departs.
    pub expire_after: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(10),
            expire_after: Duration::from_secs(5),
        }
    }
}

/// The cached state of one link as observed by callers.
///
/// A failed fetch keeps the previous snapshot, so `status` and `error` can
/// both be set at once: the link is stale-but-available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkSample {
    /// Last successfully fetched snapshot, if any.
    pub status: Option<LinkStatus>,
    /// Error from the most recent fetch, cleared by the next success.
    pub error: Option<FetchError>,
    /// When the snapshot was fetched, if ever.
    pub fetched_at: Option<Instant>,
}

impl LinkSample {
    /// Whether nothing has been fetched or recorded yet.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.error.is_none()
    }

    /// Derived view of the last known snapshot, if any.
    pub fn view(&self) -> Option<LinkView> {
        self.status.as_ref().map(LinkStatus::view)
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    status: Option<LinkStatus>,
    last_error: Option<FetchError>,
    fetched_at: Option<Instant>,
    stale_at: Option<Instant>,
    /// Set while the entry has no subscribers; expiry makes it evictable.
    expire_at: Option<Instant>,
    in_flight: Option<watch::Receiver<Option<FetchOutcome>>>,
    subscribers: usize,
    /// Set when the last subscriber departs; a refresh-task fetch that
    /// completes while draining is delivered to waiters but not stored.
    draining: bool,
}

impl CacheEntry {
    fn unused(expire_at: Instant) -> Self {
        Self {
            expire_at: Some(expire_at),
            ..Default::default()
        }
    }

    fn fresh_status(&self, now: Instant) -> Option<LinkStatus> {
        match (&self.status, self.stale_at) {
            (Some(status), Some(stale_at)) if now < stale_at => Some(status.clone()),
            _ => None,
        }
    }

    fn record_success(&mut self, status: LinkStatus, now: Instant, config: &CacheConfig) {
        self.status = Some(status);
        self.last_error = None;
        self.fetched_at = Some(now);
        self.stale_at = Some(now + config.stale_after);
        if self.subscribers == 0 {
            self.expire_at = Some(now + config.expire_after);
        }
    }

    fn record_failure(&mut self, error: FetchError) {
        // The previous snapshot is kept: stale-but-available.
        self.last_error = Some(error);
    }

    fn sample(&self) -> LinkSample {
        LinkSample {
            status: self.status.clone(),
            error: self.last_error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

#[derive(Debug)]
struct CacheInner {
    config: CacheConfig,
    entries: Mutex<HashMap<LinkId, CacheEntry>>,
}

/// Keyed store of link status snapshots with staleness and expiry
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct StatusCache {
    inner: Arc<CacheInner>,
}

/// How a caller should obtain a status: serve the cached value, attach to
/// the fetch already in flight, or perform the fetch itself.
pub(crate) enum FetchPlan {
    Fresh(LinkStatus),
    Join(watch::Receiver<Option<FetchOutcome>>),
    Lead(FetchLease),
}

impl StatusCache {
    /// Create a cache with the given timing configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current cached sample for a link, without fetching.
    pub fn get(&self, link: &LinkId) -> Option<LinkSample> {
        let entries = self.inner.entries.lock();
        entries.get(link).map(CacheEntry::sample)
    }

    /// Store a snapshot, resetting the staleness clock.
    pub fn put(&self, link: &LinkId, status: LinkStatus) {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock();
        let entry = entries
            .entry(link.clone())
            .or_insert_with(|| CacheEntry::unused(now + self.inner.config.expire_after));
        entry.record_success(status, now, &self.inner.config);
    }

    /// Mark an entry as immediately stale without deleting its value.
    ///
    /// The next request for the link fetches instead of serving the cached
    /// snapshot.
    pub fn invalidate(&self, link: &LinkId) {
        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get_mut(link) {
            entry.stale_at = Some(Instant::now());
        }
    }

    /// Remove entries with no subscribers whose expiry has passed.
    ///
    /// Runs opportunistically from the watcher's entry points; entries
    /// with a fetch in flight are left for the lease to finish first.
    pub fn evict_if_unused(&self) {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock();
        entries.retain(|link, entry| {
            let keep = entry.subscribers > 0
                || entry.in_flight.is_some()
                || entry.expire_at.map_or(true, |at| now < at);
            if !keep {
                debug!(link = %link, "evicting unused cache entry");
            }
            keep
        });
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a fetch failure, keeping any previously cached snapshot.
    pub fn record_failure(&self, link: &LinkId, error: FetchError) {
        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get_mut(link) {
            entry.record_failure(error);
        }
    }

    /// Register one more subscriber for a link, reviving a parked entry.
    pub(crate) fn add_subscriber(&self, link: &LinkId) -> usize {
        let mut entries = self.inner.entries.lock();
        let entry = entries.entry(link.clone()).or_default();
        entry.subscribers += 1;
        entry.expire_at = None;
        entry.draining = false;
        entry.subscribers
    }

    /// Drop one subscriber; the last departure parks the entry for expiry.
    pub(crate) fn remove_subscriber(&self, link: &LinkId) -> usize {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(link) else {
            return 0;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 {
            entry.draining = true;
            entry.expire_at = Some(Instant::now() + self.inner.config.expire_after);
        }
        entry.subscribers
    }

    /// Decide how a caller obtains the status for a link.
    ///
    /// Exactly one caller receives a [`FetchPlan::Lead`] lease at a time;
    /// everyone else either gets the fresh value or joins the in-flight
    /// fetch.
    pub(crate) fn claim_fetch(&self, link: &LinkId, bypass_staleness: bool) -> FetchPlan {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock();
        let entry = entries
            .entry(link.clone())
            .or_insert_with(|| CacheEntry::unused(now + self.inner.config.expire_after));

        if !bypass_staleness {
            if let Some(status) = entry.fresh_status(now) {
                return FetchPlan::Fresh(status);
            }
        }

        if let Some(rx) = &entry.in_flight {
            return FetchPlan::Join(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        entry.in_flight = Some(rx);
        FetchPlan::Lead(FetchLease {
            cache: self.inner.clone(),
            link: link.clone(),
            tx,
            done: false,
        })
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Exclusive right to perform the one in-flight fetch for a link.
///
/// Dropping the lease without completing it releases the in-flight marker
/// and closes the completion channel, so attached waiters fail instead of
/// hanging.
pub(crate) struct FetchLease {
    cache: Arc<CacheInner>,
    link: LinkId,
    tx: watch::Sender<Option<FetchOutcome>>,
    done: bool,
}

impl FetchLease {
    /// Record the outcome, release the in-flight marker, and wake waiters.
    ///
    /// With `discard_if_draining` set (refresh-task fetches), an outcome
    /// arriving after the last subscriber departed is delivered to waiters
    /// but not stored.
    pub(crate) fn complete(mut self, outcome: FetchOutcome, discard_if_draining: bool) -> FetchOutcome {
        {
            let now = Instant::now();
            let mut entries = self.cache.entries.lock();
            if let Some(entry) = entries.get_mut(&self.link) {
                entry.in_flight = None;
                if !(discard_if_draining && entry.draining) {
                    match &outcome {
                        Ok(status) => {
                            entry.record_success(status.clone(), now, &self.cache.config)
                        }
                        Err(error) => entry.record_failure(error.clone()),
                    }
                }
            }
        }
        self.done = true;
        let _ = self.tx.send(Some(outcome.clone()));
        outcome
    }
}

impl Drop for FetchLease {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut entries = self.cache.entries.lock();
        if let Some(entry) = entries.get_mut(&self.link) {
            entry.in_flight = None;
        }
        // The sender drops with the lease; waiters observe the closed
        // channel as a canceled fetch.
    }
}
