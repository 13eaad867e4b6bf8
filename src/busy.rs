//! Busy ("thinking") indicator with explicit pending-operation tracking.
//!
//! Every operation that shows the indicator holds a [`BusyGuard`]. The
//! indicator is visible while at least one guard is outstanding, so an early
//! finisher never hides it under a slower overlapping request. Each guard
//! also arms a failsafe timer that force-releases that one operation if it
//! never settles.

use crate::events::{EventBus, UiEvent};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Default failsafe delay.
pub const DEFAULT_FAILSAFE: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct BusyInner {
    pending: Mutex<HashSet<Uuid>>,
    events: EventBus,
}

impl BusyInner {
    /// Remove `id`. Returns false if it was already released.
    fn release(&self, id: Uuid) -> bool {
        let (removed, now_idle) = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            let removed = pending.remove(&id);
            (removed, removed && pending.is_empty())
        };
        if now_idle {
            self.events.publish(UiEvent::BusyChanged { visible: false });
        }
        removed
    }
}

/// Shared busy indicator.
#[derive(Debug, Clone)]
pub struct BusyIndicator {
    inner: Arc<BusyInner>,
    failsafe: Duration,
}

impl BusyIndicator {
    #[must_use]
    pub fn new(failsafe: Duration, events: EventBus) -> Self {
        Self {
            inner: Arc::new(BusyInner {
                pending: Mutex::new(HashSet::new()),
                events,
            }),
            failsafe,
        }
    }

    /// Start a busy operation. The indicator stays visible until the
    /// returned guard drops or its failsafe fires.
    #[must_use]
    pub fn begin(&self, operation: &'static str) -> BusyGuard {
        let id = Uuid::new_v4();
        let became_visible = {
            let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.insert(id);
            pending.len() == 1
        };
        if became_visible {
            self.inner.events.publish(UiEvent::BusyChanged { visible: true });
        }

        let failsafe = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                let delay = self.failsafe;
                Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if inner.release(id) {
                        tracing::warn!(
                            operation,
                            after_secs = delay.as_secs(),
                            "busy failsafe triggered: releasing operation that never settled"
                        );
                    }
                }))
            }
            Err(_) => {
                tracing::debug!(operation, "no tokio runtime; busy failsafe not armed");
                None
            }
        };

        BusyGuard {
            id,
            inner: Arc::clone(&self.inner),
            failsafe,
        }
    }

    /// Whether the indicator should be shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.pending() > 0
    }

    /// Number of outstanding operations.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Releases its operation when dropped, on every exit path.
#[derive(Debug)]
pub struct BusyGuard {
    id: Uuid,
    inner: Arc<BusyInner>,
    failsafe: Option<JoinHandle<()>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.failsafe.take() {
            handle.abort();
        }
        self.inner.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn indicator() -> (BusyIndicator, EventBus) {
        let bus = EventBus::new(16);
        (BusyIndicator::new(DEFAULT_FAILSAFE, bus.clone()), bus)
    }

    #[test]
    fn hidden_until_begin_and_after_drop() {
        let (busy, _bus) = indicator();
        assert!(!busy.is_visible());
        let guard = busy.begin("test");
        assert!(busy.is_visible());
        drop(guard);
        assert!(!busy.is_visible());
    }

    #[test]
    fn overlapping_operations_keep_indicator_visible() {
        let (busy, bus) = indicator();
        let mut rx = bus.subscribe();

        let first = busy.begin("first");
        let second = busy.begin("second");
        drop(first);
        assert!(busy.is_visible(), "second op still pending");
        drop(second);
        assert!(!busy.is_visible());

        assert_eq!(rx.try_recv().unwrap(), UiEvent::BusyChanged { visible: true });
        assert_eq!(rx.try_recv().unwrap(), UiEvent::BusyChanged { visible: false });
        assert!(rx.try_recv().is_err(), "exactly one show/hide pair");
    }

    #[tokio::test(start_paused = true)]
    async fn failsafe_releases_stuck_operation() {
        let (busy, _bus) = indicator();
        let guard = busy.begin("stuck");
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(busy.is_visible());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!busy.is_visible());
        // Dropping after the failsafe fired is a no-op.
        drop(guard);
        assert_eq!(busy.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failsafe_only_releases_its_own_operation() {
        let (busy, _bus) = indicator();
        let stuck = busy.begin("stuck");
        tokio::time::sleep(Duration::from_secs(5)).await;
        let later = busy.begin("later");

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(busy.pending(), 1, "only the first op timed out");
        drop(later);
        assert!(!busy.is_visible());
        drop(stuck);
    }
}
