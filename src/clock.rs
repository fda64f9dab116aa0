//! Round clock reconciliation.
//!
//! Remaining time is always recomputed from the round's absolute deadline —
//! `max(0, round_ends_at - now)` — on every poll, so the displayed countdown
//! self-corrects after delivery delays, suspended timers, or clock skew
//! between ticks. Decrementing a local counter would reintroduce drift and is
//! deliberately not offered here.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Default polling cadence for the countdown task.
pub const DEFAULT_COUNTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Progress ratio above which urgency stays [`Urgency::Low`].
const LOW_URGENCY_FLOOR: f64 = 0.66;

/// Progress ratio above which urgency stays [`Urgency::Medium`].
const MEDIUM_URGENCY_FLOOR: f64 = 0.33;

/// Three-tier urgency indicator driven by the remaining-time ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Classify a progress ratio in `[0, 1]`.
    pub fn for_progress(progress: f64) -> Self {
        if progress > LOW_URGENCY_FLOOR {
            Self::Low
        } else if progress > MEDIUM_URGENCY_FLOOR {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Milliseconds remaining until `ends_at_ms`, clamped at zero.
pub fn remaining_ms(now_ms: u64, ends_at_ms: u64) -> u64 {
    ends_at_ms.saturating_sub(now_ms)
}

/// Remaining-time ratio in `[0, 1]`.
///
/// A zero duration yields `0.0` rather than dividing by zero; the server
/// never sends zero-length rounds, but a defect there must not poison the
/// display.
pub fn progress(remaining_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (remaining_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// Current wall-clock time as epoch milliseconds.
///
/// A pre-epoch system clock maps to zero, which the arithmetic above treats
/// as "deadline fully in the future" — harmless for display purposes.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_deadline_minus_now() {
        assert_eq!(remaining_ms(1_000, 6_000), 5_000);
        assert_eq!(remaining_ms(6_000, 6_000), 0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        // Poll arriving after the deadline (t = +5100 of a 5000ms round).
        assert_eq!(remaining_ms(10_100, 10_000), 0);
        assert_eq!(remaining_ms(u64::MAX, 0), 0);
    }

    #[test]
    fn progress_at_round_start_is_one() {
        // roundEndsAt = now + 5000, duration 5000: t = 0.
        assert_eq!(progress(5_000, 5_000), 1.0);
    }

    #[test]
    fn progress_at_deadline_is_zero() {
        // Same round at t = +5000.
        assert_eq!(progress(0, 5_000), 0.0);
    }

    #[test]
    fn progress_is_clamped_above_one() {
        // Remaining exceeding the nominal duration (server extended the
        // deadline) still renders a full bar.
        assert_eq!(progress(7_500, 5_000), 1.0);
    }

    #[test]
    fn progress_with_zero_duration_is_zero() {
        assert_eq!(progress(1_000, 0), 0.0);
    }

    #[test]
    fn urgency_tiers() {
        assert_eq!(Urgency::for_progress(1.0), Urgency::Low);
        assert_eq!(Urgency::for_progress(0.67), Urgency::Low);
        assert_eq!(Urgency::for_progress(0.66), Urgency::Medium);
        assert_eq!(Urgency::for_progress(0.34), Urgency::Medium);
        assert_eq!(Urgency::for_progress(0.33), Urgency::High);
        assert_eq!(Urgency::for_progress(0.0), Urgency::High);
    }

    #[test]
    fn now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn urgency_serializes_snake_case() {
        let json = serde_json::to_string(&Urgency::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
