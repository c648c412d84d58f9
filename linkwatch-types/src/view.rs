//! Derived display state for a link snapshot.
//!
//! This is the pure mapping from a raw [`LinkStatus`] to what a renderer
//! shows: the delivering indicator, a bounded progress ratio against the
//! delivery time limit, the state badge color, and the formatted pending
//! delay.

use crate::{LinkState, LinkStatus};

/// Color classification for a link state badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateColor {
    Green,
    Red,
    Neutral,
}

impl StateColor {
    /// Returns the CSS-style scheme name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateColor::Green => "green",
            StateColor::Red => "red",
            StateColor::Neutral => "neutral",
        }
    }
}

impl LinkState {
    /// Badge color for this state.
    ///
    /// Labels outside the known set resolve to [`StateColor::Neutral`];
    /// monitors add labels over time and an unknown one must never fail.
    pub fn color(&self) -> StateColor {
        match self {
            LinkState::Good => StateColor::Green,
            LinkState::Bad => StateColor::Red,
            LinkState::Other(_) => StateColor::Neutral,
        }
    }
}

/// Display-ready view of a link status.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    /// Messages are in transit (`tx_seq > rx_seq`).
    pub delivering: bool,
    /// Pending delay as a fraction of the time limit, clamped to `[0, 1]`.
    pub progress: f64,
    /// The pending delay has reached or passed the time limit.
    pub indeterminate: bool,
    /// Badge color derived from the state label.
    pub color: StateColor,
    /// Compact rendering of the pending delay, e.g. `"1m 5s"`.
    pub delay_text: String,
}

impl LinkView {
    /// Derive the view from a status snapshot.
    pub fn from_status(status: &LinkStatus) -> Self {
        let delay = status.pending_delay.as_millis();
        let limit = status.time_limit.as_millis();

        let progress = if limit > 0 {
            (delay as f64 / limit as f64).clamp(0.0, 1.0)
        } else {
            // A missing or non-positive limit cannot bound any delay.
            1.0
        };

        Self {
            delivering: status.is_delivering(),
            progress,
            indeterminate: delay >= limit,
            color: status.state.color(),
            delay_text: status.pending_delay.format_compact(),
        }
    }
}

impl LinkStatus {
    /// Derive the display view for this snapshot.
    pub fn view(&self) -> LinkView {
        LinkView::from_status(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Milliseconds;

    fn status(tx_seq: u64, rx_seq: u64, delay: i64, limit: i64, state: LinkState) -> LinkStatus {
        LinkStatus {
            tx_seq,
            rx_seq,
            pending_delay: Milliseconds::from_millis(delay),
            time_limit: Milliseconds::from_millis(limit),
            state,
            ..Default::default()
        }
    }

    #[test]
    fn delivering_tracks_sequence_gap() {
        assert!(status(12, 10, 0, 5000, LinkState::Good).view().delivering);
        assert!(!status(10, 10, 0, 5000, LinkState::Good).view().delivering);
        assert!(!status(9, 10, 0, 5000, LinkState::Good).view().delivering);
    }

    #[test]
    fn progress_is_clamped() {
        let view = status(0, 0, 2500, 5000, LinkState::Good).view();
        assert!((view.progress - 0.5).abs() < f64::EPSILON);
        assert!(!view.indeterminate);

        let view = status(0, 0, 10_000, 5000, LinkState::Good).view();
        assert!((view.progress - 1.0).abs() < f64::EPSILON);
        assert!(view.indeterminate);

        let view = status(0, 0, -100, 5000, LinkState::Good).view();
        assert!(view.progress.abs() < f64::EPSILON);
        assert!(!view.indeterminate);
    }

    #[test]
    fn indeterminate_at_exact_limit() {
        let view = status(0, 0, 5000, 5000, LinkState::Good).view();
        assert!(view.indeterminate);
        assert!((view.progress - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_limit_is_indeterminate() {
        let view = status(0, 0, 0, 0, LinkState::Good).view();
        assert!(view.indeterminate);
        assert!((view.progress - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn color_lookup_with_neutral_default() {
        assert_eq!(LinkState::Good.color(), StateColor::Green);
        assert_eq!(LinkState::Bad.color(), StateColor::Red);
        assert_eq!(
            LinkState::Other("unknown-value".to_string()).color(),
            StateColor::Neutral
        );
        assert_eq!(StateColor::Neutral.as_str(), "neutral");
    }

    #[test]
    fn idle_good_link_end_to_end() {
        // tx_seq == rx_seq, nothing pending, healthy state
        let view = status(10, 10, 0, 5000, LinkState::Good).view();
        assert!(!view.delivering);
        assert!(view.progress.abs() < f64::EPSILON);
        assert_eq!(view.color, StateColor::Green);
        assert_eq!(view.delay_text, "0s");
    }

    #[test]
    fn overdue_bad_link_end_to_end() {
        // delay past the limit while messages are in transit
        let view = status(12, 10, 6000, 5000, LinkState::Bad).view();
        assert!(view.delivering);
        assert!(view.indeterminate);
        assert_eq!(view.color, StateColor::Red);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn idle_good_response_body_to_view() {
        let body = r#"{"tx_seq":10, "rx_seq":10, "pending_count":0, "pending_delay":0, "time_limit":5000, "state":"good"}"#;
        let view = serde_json::from_str::<LinkStatus>(body).unwrap().view();

        assert!(!view.delivering);
        assert!(view.progress.abs() < f64::EPSILON);
        assert_eq!(view.color, StateColor::Green);
        assert_eq!(view.delay_text, "0s");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn overdue_bad_response_body_to_view() {
        let body = r#"{"tx_seq":12, "rx_seq":10, "pending_delay":6000, "time_limit":5000, "state":"bad"}"#;
        let view = serde_json::from_str::<LinkStatus>(body).unwrap().view();

        assert!(view.delivering);
        assert!(view.indeterminate);
        assert_eq!(view.color, StateColor::Red);
    }
}
