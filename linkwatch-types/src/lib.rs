//! # linkwatch-types
//!
//! Core types for relay link health monitoring. This crate defines the
//! identities, wire schema, and derived display state shared between the
//! fetching client and anything that renders link health.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: core types work without a
//!   serialization framework
//! - **Optional serialization**: enable the `serde` feature to parse the
//!   monitor's JSON payloads
//! - **Open state set**: unknown link state labels are preserved, never an
//!   error
//! - **Pure derivation**: the snapshot → view mapping has no I/O and no
//!   clock
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization of the wire schema via serde
//!
//! ## Example
//!
//! ```rust
//! use linkwatch_types::{LinkState, LinkStatus, Milliseconds, StateColor};
//!
//! let status = LinkStatus {
//!     tx_seq: 12,
//!     rx_seq: 10,
//!     pending_delay: Milliseconds::from_millis(65_000),
//!     time_limit: Milliseconds::from_secs(300),
//!     state: LinkState::Good,
//!     ..Default::default()
//! };
//!
//! let view = status.view();
//! assert!(view.delivering);
//! assert_eq!(view.color, StateColor::Green);
//! assert_eq!(view.delay_text, "1m 5s");
//! ```

mod duration;
mod link;
mod network;
mod view;

pub use duration::*;
pub use link::*;
pub use network::*;
pub use view::*;
