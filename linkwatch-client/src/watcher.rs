//! The link watcher: coalesced fetching and interval refresh.
//!
//! A [`LinkWatcher`] answers one-shot [`request`](LinkWatcher::request)
//! calls from the cache when it can and fetches otherwise, with at most
//! one network call in flight per link. Subscribing to a link starts a
//! per-link refresh task that re-fetches on a fixed interval and publishes
//! each result to every subscriber; dropping the last subscription stops
//! the schedule and lets the cache entry expire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tracing::{debug, warn};

use linkwatch_types::{LinkId, LinkStatus};

use crate::api::StatusTransport;
use crate::cache::{CacheConfig, FetchPlan, LinkSample, StatusCache};
use crate::error::FetchError;

/// Watches the health of relay links through a status transport.
///
/// Cloning is cheap; clones share the same cache and refresh schedules.
///
/// # Example
///
/// ```rust,no_run
/// use linkwatch_client::{LinkWatcher, MonitorApi};
/// use linkwatch_types::LinkId;
///
/// #[tokio::main]
/// async fn main() {
///     let api = MonitorApi::builder()
///         .endpoint("http://localhost:8000")
///         .build();
///     let watcher = LinkWatcher::new(api);
///
///     let link = LinkId::new("0x1.icon-cx01", "0x2.bsc-0xab");
///     let mut sub = watcher.subscribe(&link);
///
///     loop {
///         let sample = sub.next().await;
///         if let Some(view) = sample.view() {
///             println!("{}: {} ({})", link, view.color.as_str(), view.delay_text);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LinkWatcher {
    shared: Arc<Shared>,
}

impl LinkWatcher {
    /// Create a watcher with default timing over the given transport.
    pub fn new<T: StatusTransport + 'static>(transport: T) -> Self {
        Self::builder().build(transport)
    }

    /// Create a builder for configuring the watcher.
    pub fn builder() -> WatcherBuilder {
        WatcherBuilder::default()
    }

    /// The underlying status cache.
    pub fn cache(&self) -> &StatusCache {
        &self.shared.cache
    }

    /// Return the status for a link, fetching if the cache is stale.
    ///
    /// A fresh cached snapshot is returned immediately. Otherwise exactly
    /// one network call is issued per link no matter how many callers ask
    /// concurrently; late callers attach to the in-flight fetch and
    /// observe the same outcome. A failure leaves any previously cached
    /// snapshot in place (see [`sample`](Self::sample)).
    pub async fn request(&self, link: &LinkId) -> Result<LinkStatus, FetchError> {
        self.shared.cache.evict_if_unused();
        self.shared.fetch(link, false, false).await
    }

    /// Current cached sample for a link, without fetching.
    pub fn sample(&self, link: &LinkId) -> Option<LinkSample> {
        self.shared.cache.get(link)
    }

    /// Force an immediate refresh, bypassing the staleness check.
    ///
    /// If a fetch for the link is already in flight the trigger is
    /// absorbed into it. On completion the staleness clock resets and any
    /// background schedule restarts its interval, as after a normal
    /// refresh.
    pub async fn invalidate(&self, link: &LinkId) -> Result<LinkStatus, FetchError> {
        self.shared.cache.evict_if_unused();
        self.shared.cache.invalidate(link);
        if let Some(task) = self.shared.tasks.lock().get(link) {
            task.kick.notify_one();
        }
        self.shared.fetch(link, true, false).await
    }

    /// Subscribe to a link, starting its refresh schedule if needed.
    ///
    /// The first subscriber triggers an immediate fetch; afterwards the
    /// link is re-fetched every `refetch_interval` and each result is
    /// published to all subscribers. The schedule runs only while at
    /// least one subscription is alive.
    pub fn subscribe(&self, link: &LinkId) -> LinkSubscription {
        self.shared.cache.evict_if_unused();
        let mut tasks = self.shared.tasks.lock();
        self.shared.cache.add_subscriber(link);
        let task = tasks
            .entry(link.clone())
            .or_insert_with(|| RefreshTask::spawn(self.shared.clone(), link.clone()));
        LinkSubscription {
            link: link.clone(),
            updates: task.updates.subscribe(),
            shared: self.shared.clone(),
        }
    }
}

/// Builder for [`LinkWatcher`].
///
/// Defaults mirror the monitor UI's query tuning: snapshots are served
/// for 10 seconds, refreshed every 10 seconds while watched, and kept for
/// 5 seconds after the last subscriber departs.
#[derive(Debug, Default)]
pub struct WatcherBuilder {
    stale_after: Option<Duration>,
    expire_after: Option<Duration>,
    refetch_interval: Option<Duration>,
    max_backoff: Option<Duration>,
}

impl WatcherBuilder {
    /// How long a fetched snapshot is served without refetching
    /// (default: 10 seconds).
    pub fn stale_after(mut self, d: Duration) -> Self {
        self.stale_after = Some(d);
        self
    }

    /// How long a cache entry survives after its last subscriber departs
    /// (default: 5 seconds).
    pub fn expire_after(mut self, d: Duration) -> Self {
        self.expire_after = Some(d);
        self
    }

    /// Interval between background refreshes while subscribed
    /// (default: 10 seconds).
    pub fn refetch_interval(mut self, d: Duration) -> Self {
        self.refetch_interval = Some(d);
        self
    }

    /// Cap on the delay between retries after consecutive failures
    /// (default: 60 seconds).
    pub fn max_backoff(mut self, d: Duration) -> Self {
        self.max_backoff = Some(d);
        self
    }

    /// Build the watcher over the given transport.
    pub fn build<T: StatusTransport + 'static>(self, transport: T) -> LinkWatcher {
        let config = CacheConfig {
            stale_after: self.stale_after.unwrap_or(Duration::from_secs(10)),
            expire_after: self.expire_after.unwrap_or(Duration::from_secs(5)),
        };
        LinkWatcher {
            shared: Arc::new(Shared {
                transport: Arc::new(transport),
                cache: StatusCache::new(config),
                refetch_interval: self.refetch_interval.unwrap_or(Duration::from_secs(10)),
                max_backoff: self.max_backoff.unwrap_or(Duration::from_secs(60)),
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }
}

#[derive(Debug)]
struct Shared {
    transport: Arc<dyn StatusTransport>,
    cache: StatusCache,
    refetch_interval: Duration,
    max_backoff: Duration,
    tasks: Mutex<HashMap<LinkId, RefreshTask>>,
}

impl Shared {
    /// Obtain the status for a link under the single-flight protocol.
    async fn fetch(
        &self,
        link: &LinkId,
        bypass_staleness: bool,
        from_refresh_task: bool,
    ) -> Result<LinkStatus, FetchError> {
        match self.cache.claim_fetch(link, bypass_staleness) {
            FetchPlan::Fresh(status) => Ok(status),
            FetchPlan::Join(mut rx) => match rx.wait_for(Option::is_some).await {
                Ok(outcome) => (*outcome).clone().unwrap_or(Err(FetchError::Canceled)),
                Err(_) => Err(FetchError::Canceled),
            },
            FetchPlan::Lead(lease) => {
                debug!(link = %link, "fetching link status");
                let outcome = self.transport.fetch_status(link).await;
                lease.complete(outcome, from_refresh_task)
            }
        }
    }
}

#[derive(Debug)]
struct RefreshTask {
    updates: watch::Sender<LinkSample>,
    stop: watch::Sender<bool>,
    kick: Arc<Notify>,
}

impl RefreshTask {
    fn spawn(shared: Arc<Shared>, link: LinkId) -> Self {
        let (updates_tx, _) = watch::channel(LinkSample::default());
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let kick = Arc::new(Notify::new());

        let task = RefreshTask {
            updates: updates_tx.clone(),
            stop: stop_tx,
            kick: kick.clone(),
        };

        tokio::spawn(async move {
            // The first pass may serve a still-fresh snapshot; interval
            // ticks always refetch.
            let mut bypass_staleness = false;
            let mut failures: u32 = 0;

            loop {
                if *stop_rx.borrow() {
                    break;
                }
                let outcome = shared.fetch(&link, bypass_staleness, true).await;
                if *stop_rx.borrow() {
                    // Last subscriber departed mid-fetch; the outcome was
                    // already discarded by the cache.
                    break;
                }
                match &outcome {
                    Ok(_) => failures = 0,
                    Err(error) => {
                        failures = failures.saturating_add(1);
                        warn!(link = %link, error = %error, failures, "link status fetch failed");
                    }
                }
                if let Some(sample) = shared.cache.get(&link) {
                    let _ = updates_tx.send(sample);
                }

                let delay = backoff_delay(shared.refetch_interval, shared.max_backoff, failures);
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = kick.notified() => {
                        // Manual refresh: the entry was already marked
                        // stale, so the normal staleness check refetches
                        // or joins the trigger's own fetch.
                        bypass_staleness = false;
                    }
                    _ = tokio::time::sleep(delay) => {
                        bypass_staleness = true;
                    }
                }
            }
            debug!(link = %link, "refresh schedule stopped");
        });

        task
    }
}

/// Delay before the next refresh attempt.
///
/// The first failure retries on the normal tick; further consecutive
/// failures back off exponentially up to `max_backoff`.
fn backoff_delay(interval: Duration, max_backoff: Duration, failures: u32) -> Duration {
    if failures <= 1 {
        return interval;
    }
    let shift = (failures - 1).min(6);
    interval
        .saturating_mul(2u32.saturating_pow(shift))
        .min(max_backoff)
}

/// A counted subscription to one link's refresh schedule.
///
/// Samples published by the schedule are observed with
/// [`next`](Self::next) or read directly with [`latest`](Self::latest).
/// Dropping the last subscription for a link stops its schedule.
#[derive(Debug)]
pub struct LinkSubscription {
    link: LinkId,
    updates: watch::Receiver<LinkSample>,
    shared: Arc<Shared>,
}

impl LinkSubscription {
    /// The link this subscription watches.
    pub fn link(&self) -> &LinkId {
        &self.link
    }

    /// The most recently published sample.
    pub fn latest(&self) -> LinkSample {
        self.updates.borrow().clone()
    }

    /// Wait for the next published sample.
    pub async fn next(&mut self) -> LinkSample {
        // The refresh task outlives every subscription, so the channel
        // stays open while this receiver exists.
        let _ = self.updates.changed().await;
        self.updates.borrow_and_update().clone()
    }
}

impl Drop for LinkSubscription {
    fn drop(&mut self) {
        let mut tasks = self.shared.tasks.lock();
        let remaining = self.shared.cache.remove_subscriber(&self.link);
        if remaining == 0 {
            if let Some(task) = tasks.remove(&self.link) {
                let _ = task.stop.send(true);
            }
        }
    }
}
