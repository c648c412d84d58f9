//! # linkwatch-client
//!
//! Polling client for relay link health. This crate fetches link status
//! snapshots from a monitor's web API, caches them per link with
//! staleness and expiry bookkeeping, coalesces concurrent fetches into a
//! single network call, and keeps watched links fresh on a fixed interval.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkwatch_client::{LinkWatcher, MonitorApi};
//! use linkwatch_types::LinkId;
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = MonitorApi::builder()
//!         .endpoint("http://localhost:8000")
//!         .build();
//!     let watcher = LinkWatcher::new(api);
//!
//!     // Watch one directed link; the schedule runs while subscribed.
//!     let link = LinkId::new("0x1.icon-cx01", "0x2.bsc-0xab");
//!     let mut sub = watcher.subscribe(&link);
//!
//!     let sample = sub.next().await;
//!     if let Some(view) = sample.view() {
//!         println!("{}: {} ({})", link, view.color.as_str(), view.delay_text);
//!     }
//! }
//! ```
//!
//! ## Behavior
//!
//! - **Fresh cache hits are free**: a snapshot younger than `stale_after`
//!   is served without a network call.
//! - **One fetch per link**: concurrent requesters attach to the fetch
//!   already in flight and observe the same outcome.
//! - **Stale-but-available**: a failed refresh keeps the last snapshot and
//!   reports the error alongside it; the next tick retries.
//! - **Subscriber-counted lifetime**: refresh schedules run only while a
//!   link has subscribers, and parked entries expire after
//!   `expire_after`.

mod api;
mod cache;
mod error;
mod watcher;

pub use api::{MonitorApi, MonitorApiBuilder, StatusTransport};
pub use cache::{CacheConfig, LinkSample, StatusCache};
pub use error::FetchError;
pub use watcher::{LinkSubscription, LinkWatcher, WatcherBuilder};

// Re-export types for convenience
pub use linkwatch_types::{
    LinkEntry, LinkId, LinkState, LinkStatus, LinkView, Milliseconds, NetworkId, StateColor,
};
