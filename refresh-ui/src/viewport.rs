//! Viewport size signal with debounced resize delivery.
//!
//! ## Usage
//!
//! Feed raw resize events into a [`ViewportSignal`] and let layout code
//! subscribe to the settled size.
//!
//! Resize reports are buffered until no new report has arrived for the
//! debounce interval; only then is the size published to subscribers. The
//! newest report always wins, so once resizing stops the published size is the
//! final one. Subscriptions are released when their [`Subscription`] handle is
//! dropped.
//!
//! ```
//! use std::{
//!     sync::{Arc, atomic::{AtomicI32, Ordering}},
//!     time::{Duration, Instant},
//! };
//! use refresh_ui::{Px, PxSize, viewport::ViewportSignal};
//!
//! let signal = ViewportSignal::with_debounce(Duration::from_millis(100));
//! let seen = Arc::new(AtomicI32::new(0));
//! let subscription = signal.subscribe({
//!     let seen = seen.clone();
//!     move |size| seen.store(size.width.raw(), Ordering::SeqCst)
//! });
//!
//! let start = Instant::now();
//! signal.report_resize(PxSize::new(Px(700), Px(900)), start);
//! signal.report_resize(PxSize::new(Px(820), Px(900)), start + Duration::from_millis(30));
//! assert!(signal.settle(start + Duration::from_millis(60)).is_none());
//! assert!(signal.settle(start + Duration::from_millis(200)).is_some());
//! assert_eq!(seen.load(Ordering::SeqCst), 820);
//!
//! drop(subscription);
//! assert_eq!(signal.listener_count(), 0);
//! ```

use std::{
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::px::{Px, PxSize};

/// Quiet interval used by [`ViewportSignal::new`].
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

type Listener = Arc<dyn Fn(PxSize) + Send + Sync>;

struct PendingResize {
    size: PxSize,
    reported_at: Instant,
}

struct SignalInner {
    settled: Option<PxSize>,
    pending: Option<PendingResize>,
    debounce: Duration,
    listeners: FxHashMap<u64, Listener>,
    next_listener_id: u64,
}

impl SignalInner {
    /// Commits `size` and returns the listeners to notify, if it changed.
    fn commit(&mut self, size: PxSize) -> Vec<Listener> {
        self.pending = None;
        if self.settled == Some(size) {
            return Vec::new();
        }
        self.settled = Some(size);
        let mut ids: Vec<_> = self.listeners.keys().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| self.listeners.get(id).cloned())
            .collect()
    }
}

/// Shared, cloneable source of the current viewport size.
///
/// Clones refer to the same signal.
#[derive(Clone)]
pub struct ViewportSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl Default for ViewportSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportSignal {
    /// Creates an unmeasured signal with [`DEFAULT_RESIZE_DEBOUNCE`].
    pub fn new() -> Self {
        Self::with_debounce(DEFAULT_RESIZE_DEBOUNCE)
    }

    /// Creates an unmeasured signal with a custom quiet interval.
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SignalInner {
                settled: None,
                pending: None,
                debounce,
                listeners: FxHashMap::default(),
                next_listener_id: 0,
            })),
        }
    }

    /// Creates a signal that already holds a settled size.
    pub fn measured(size: PxSize) -> Self {
        let signal = Self::new();
        signal.inner.lock().settled = Some(size);
        signal
    }

    /// Returns the settled size, or `None` before the first measurement.
    pub fn size(&self) -> Option<PxSize> {
        self.inner.lock().settled
    }

    /// Returns the settled width, treating an unmeasured viewport as `0`.
    pub fn width(&self) -> Px {
        self.size().map(|size| size.width).unwrap_or(Px::ZERO)
    }

    /// Returns the settled height, treating an unmeasured viewport as `0`.
    pub fn height(&self) -> Px {
        self.size().map(|size| size.height).unwrap_or(Px::ZERO)
    }

    /// Returns `true` while a resize report waits for the quiet interval.
    pub fn has_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Records a raw resize report observed at `now`.
    ///
    /// Nothing is published until [`settle`](Self::settle) or
    /// [`flush`](Self::flush) runs.
    pub fn report_resize(&self, size: PxSize, now: Instant) {
        trace!(width = size.width.raw(), height = size.height.raw(), "viewport resize reported");
        self.inner.lock().pending = Some(PendingResize {
            size,
            reported_at: now,
        });
    }

    /// Publishes the pending size if the quiet interval has elapsed at `now`.
    ///
    /// Returns the committed size, if any.
    pub fn settle(&self, now: Instant) -> Option<PxSize> {
        let (size, listeners) = {
            let mut inner = self.inner.lock();
            let pending = inner.pending.as_ref()?;
            if now.saturating_duration_since(pending.reported_at) < inner.debounce {
                return None;
            }
            let size = pending.size;
            (size, inner.commit(size))
        };
        notify(&listeners, size);
        Some(size)
    }

    /// Publishes the pending size immediately, ignoring the quiet interval.
    pub fn flush(&self) -> Option<PxSize> {
        let (size, listeners) = {
            let mut inner = self.inner.lock();
            let size = inner.pending.as_ref()?.size;
            (size, inner.commit(size))
        };
        notify(&listeners, size);
        Some(size)
    }

    /// Publishes `size` immediately, discarding any pending report.
    ///
    /// Used for the first real measurement after mount.
    pub fn set_size(&self, size: PxSize) {
        let listeners = self.inner.lock().commit(size);
        notify(&listeners, size);
    }

    /// Registers `listener` for settled size changes.
    ///
    /// The listener stays registered until the returned handle is dropped.
    /// Listeners run outside the signal's lock and may read the signal.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(PxSize) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.insert(id, Arc::new(listener));
        Subscription {
            id,
            signal: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

fn notify(listeners: &[Listener], size: PxSize) {
    for listener in listeners {
        listener(size);
    }
}

/// Handle that keeps a viewport listener registered.
///
/// Dropping the handle removes the listener.
#[must_use = "dropping a subscription removes its listener"]
pub struct Subscription {
    id: u64,
    signal: Weak<Mutex<SignalInner>>,
}

impl Subscription {
    /// Removes the listener now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner.lock().listeners.remove(&self.id);
            trace!(listener = self.id, "viewport listener released");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    fn size(width: i32) -> PxSize {
        PxSize::new(Px(width), Px(800))
    }

    fn recording(signal: &ViewportSignal) -> (Subscription, Arc<Mutex<Vec<Px>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscription = signal.subscribe({
            let seen = seen.clone();
            move |size| seen.lock().push(size.width)
        });
        (subscription, seen)
    }

    #[test]
    fn test_unmeasured_signal_reports_zero_width() {
        let signal = ViewportSignal::new();
        assert_eq!(signal.size(), None);
        assert_eq!(signal.width(), Px::ZERO);
        assert_eq!(signal.height(), Px::ZERO);
    }

    #[test]
    fn test_rapid_reports_publish_only_final_width() {
        let signal = ViewportSignal::with_debounce(Duration::from_millis(100));
        let (_subscription, seen) = recording(&signal);
        let start = Instant::now();

        for (step, width) in [500, 620, 740, 1310].into_iter().enumerate() {
            signal.report_resize(size(width), start + Duration::from_millis(step as u64 * 20));
            assert!(signal.settle(start + Duration::from_millis(step as u64 * 20 + 10)).is_none());
        }
        assert_eq!(signal.width(), Px::ZERO);

        let settled = signal.settle(start + Duration::from_millis(400));
        assert_eq!(settled, Some(size(1310)));
        assert_eq!(*seen.lock(), vec![Px(1310)]);
        assert!(!signal.has_pending());
    }

    #[test]
    fn test_flush_bypasses_debounce() {
        let signal = ViewportSignal::with_debounce(Duration::from_secs(60));
        let (_subscription, seen) = recording(&signal);
        signal.report_resize(size(900), Instant::now());
        assert_eq!(signal.flush(), Some(size(900)));
        assert_eq!(signal.flush(), None);
        assert_eq!(*seen.lock(), vec![Px(900)]);
    }

    #[test]
    fn test_unchanged_size_does_not_notify() {
        let signal = ViewportSignal::measured(size(640));
        let (_subscription, seen) = recording(&signal);
        signal.set_size(size(640));
        assert!(seen.lock().is_empty());
        signal.set_size(size(641));
        assert_eq!(*seen.lock(), vec![Px(641)]);
    }

    #[test]
    fn test_dropping_subscription_releases_listener() {
        let signal = ViewportSignal::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = signal.subscribe({
            let calls = calls.clone();
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        });
        let second = signal.subscribe(|_| {});
        assert_eq!(signal.listener_count(), 2);

        drop(first);
        second.unsubscribe();
        assert_eq!(signal.listener_count(), 0);

        signal.set_size(size(1024));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_signal_is_harmless() {
        let signal = ViewportSignal::new();
        let subscription = signal.subscribe(|_| {});
        drop(signal);
        drop(subscription);
    }

    #[test]
    fn test_listener_may_read_signal() {
        let signal = ViewportSignal::new();
        let observed = Arc::new(Mutex::new(None));
        let _subscription = signal.subscribe({
            let signal = signal.clone();
            let observed = observed.clone();
            move |_| *observed.lock() = Some(signal.width())
        });
        signal.set_size(size(777));
        assert_eq!(*observed.lock(), Some(Px(777)));
    }
}
