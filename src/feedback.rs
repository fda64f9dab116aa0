//! Short-lived, self-expiring feedback values.
//!
//! A [`TransientSlot`] holds at most one value and one live expiry timer.
//! Setting a new value aborts the previous timer before starting the next
//! one, so a stale timer can never clear a value that superseded it. The
//! current value is published on a `tokio::sync::watch` channel; UI layers
//! subscribe and re-render on change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::protocol::GuessOutcome;

/// Expiry delay for guess-result feedback.
pub const GUESS_FEEDBACK_TTL: Duration = Duration::from_millis(2_500);

/// Expiry delay for the invite-copy confirmation, slightly longer so the
/// copier has time to switch windows and still see it.
pub const COPY_NOTICE_TTL: Duration = Duration::from_millis(4_000);

/// Feedback for the local player's most recent guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessFeedback {
    pub status: GuessOutcome,
    pub message: String,
}

struct SlotInner<T> {
    tx: watch::Sender<Option<T>>,
    /// Bumped on every set/clear. An expiry task only clears the slot when
    /// its own generation is still current, closing the window between a
    /// timer firing and its abort landing.
    generation: AtomicU64,
    timer: StdMutex<Option<JoinHandle<()>>>,
}

/// A single feedback slot with stale-timer cancellation.
///
/// Cloning the slot clones a handle to the same underlying value; the slot
/// is cheap to share between the client handle and the transport loop.
pub struct TransientSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T> Clone for TransientSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TransientSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransientSlot<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(SlotInner {
                tx,
                generation: AtomicU64::new(0),
                timer: StdMutex::new(None),
            }),
        }
    }

    /// Subscribe to value transitions. The receiver observes `Some(value)` on
    /// set and a single `None` when the value expires or is cleared.
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.inner.tx.subscribe()
    }

    fn abort_pending_timer(&self) {
        let handle = match self.inner.timer.lock() {
            Ok(mut slot) => slot.take(),
            // A panicked expiry task cannot poison anything we still need;
            // the generation check below keeps the slot coherent.
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> TransientSlot<T> {
    /// Current value, if it has not expired.
    pub fn get(&self) -> Option<T> {
        self.inner.tx.borrow().clone()
    }

    /// Set a new value and (re)start its expiry timer.
    ///
    /// Any pending timer for the previous value is aborted first, so the slot
    /// sees exactly one `None` transition per superseding chain — the one
    /// from the newest value's own timer.
    pub fn set(&self, value: T, ttl: Duration) {
        self.abort_pending_timer();
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.tx.send_replace(Some(value));

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if inner.generation.load(Ordering::Acquire) == generation {
                inner.tx.send_replace(None);
            }
        });

        if let Ok(mut slot) = self.inner.timer.lock() {
            *slot = Some(handle);
        }
    }

    /// Clear the value immediately and cancel any pending timer.
    pub fn clear(&self) {
        self.abort_pending_timer();
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        if self.inner.tx.borrow().is_some() {
            self.inner.tx.send_replace(None);
        }
    }
}

impl<T> Drop for SlotInner<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.timer.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
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

    #[tokio::test(start_paused = true)]
    async fn value_expires_after_ttl() {
        let slot: TransientSlot<&'static str> = TransientSlot::new();
        slot.set("hello", Duration::from_millis(100));
        assert_eq!(slot.get(), Some("hello"));

        // Let the expiry task register its timer before moving the clock.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(slot.get(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_value_cancels_previous_timer() {
        let slot: TransientSlot<&'static str> = TransientSlot::new();
        let mut rx = slot.subscribe();

        slot.set("a", Duration::from_millis(100));
        assert_eq!(rx.borrow_and_update().clone(), Some("a"));
        tokio::task::yield_now().await;

        // Replace before A expires.
        tokio::time::advance(Duration::from_millis(50)).await;
        slot.set("b", Duration::from_millis(100));
        assert_eq!(rx.borrow_and_update().clone(), Some("b"));
        tokio::task::yield_now().await;

        // Past A's original deadline: B must survive and no transition
        // fires. A's timer was cancelled, not merely ignored.
        tokio::time::advance(Duration::from_millis(70)).await;
        tokio::task::yield_now().await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(slot.get(), Some("b"));

        // Past B's deadline: exactly one null-transition, from B's own timer.
        tokio::time::advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), None);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_timer() {
        let slot: TransientSlot<u32> = TransientSlot::new();
        let mut rx = slot.subscribe();

        slot.set(1, Duration::from_millis(100));
        slot.clear();
        assert_eq!(slot.get(), None);

        // The cancelled timer must not fire a second null-transition.
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        let mut nulls = 0;
        while rx.has_changed().unwrap_or(false) {
            if rx.borrow_and_update().is_none() {
                nulls += 1;
            }
        }
        assert_eq!(nulls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_on_empty_slot_is_silent() {
        let slot: TransientSlot<u32> = TransientSlot::new();
        let mut rx = slot.subscribe();
        slot.clear();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_supersession_keeps_latest() {
        let slot: TransientSlot<u32> = TransientSlot::new();
        for i in 0..10 {
            slot.set(i, Duration::from_millis(100));
        }
        assert_eq!(slot.get(), Some(9));

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(slot.get(), None);
    }
}
