//! Link identities and status snapshots from the monitor API.

use std::fmt;

use crate::{Milliseconds, NetworkId};

/// Key for a directed relay link: messages flow from `src` to `dst`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkId {
    pub src: NetworkId,
    pub dst: NetworkId,
}

impl LinkId {
    /// Create a link key from its endpoints.
    pub fn new(src: impl Into<NetworkId>, dst: impl Into<NetworkId>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.src, self.dst)
    }
}

/// One element of the monitor's link listing (`GET /links`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkEntry {
    pub src: NetworkId,
    pub dst: NetworkId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub src_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dst_name: String,
}

impl LinkEntry {
    /// The key for this link.
    pub fn id(&self) -> LinkId {
        LinkId::new(self.src.clone(), self.dst.clone())
    }
}

/// State label reported for a link.
///
/// The label set is open: monitors introduce new labels over time, so
/// anything outside the known set parses into [`LinkState::Other`] rather
/// than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkState {
    Good,
    Bad,
    #[cfg_attr(feature = "serde", serde(untagged))]
    Other(String),
}

impl LinkState {
    /// The label as reported by the monitor.
    pub fn as_str(&self) -> &str {
        match self {
            LinkState::Good => "good",
            LinkState::Bad => "bad",
            LinkState::Other(label) => label,
        }
    }
}

impl Default for LinkState {
    fn default() -> Self {
        // The monitor reports "unknown" until a link has been measured.
        LinkState::Other("unknown".to_string())
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched status snapshot for one directed link.
///
/// Numeric and name fields default when absent: the monitor emits partial
/// objects while a link is still being measured.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkStatus {
    pub src: NetworkId,
    pub dst: NetworkId,
    pub src_name: String,
    pub dst_name: String,
    pub state: LinkState,

    /// Messages sent by the source side.
    pub tx_seq: u64,
    /// Messages received and acknowledged at the destination side.
    pub rx_seq: u64,
    /// Last block height of the source chain.
    pub tx_height: u64,
    /// Last verified block height at the destination chain.
    pub rx_height: u64,

    /// Messages sent but not yet confirmed delivered.
    pub pending_count: u64,
    /// Elapsed time since the oldest pending message was sent.
    pub pending_delay: Milliseconds,
    /// Delivery threshold beyond which delay is considered unbounded.
    pub time_limit: Milliseconds,
}

impl LinkStatus {
    /// The key for this link.
    pub fn id(&self) -> LinkId {
        LinkId::new(self.src.clone(), self.dst.clone())
    }

    /// Whether messages are currently in transit (`tx_seq > rx_seq`).
    pub fn is_delivering(&self) -> bool {
        self.tx_seq > self.rx_seq
    }
}
