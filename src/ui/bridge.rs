// EventLoopBridge - hands UI updates from worker threads to the Slint event loop
//
// Query results land on tokio workers and the state subscription thread, but
// Slint components may only be touched on the event loop thread. Updates are
// queued on a bounded channel and a handler thread forwards each one through
// `Weak::upgrade_in_event_loop`.
//
// Full re-renders go through a LatestSlot instead: at most one is queued, and
// it applies whatever value is newest when the event loop gets to it.

use crate::metrics::QueryMetrics;
use slint::{ComponentHandle, Weak};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Capacity of the update queue; updates beyond it are dropped
pub const UI_UPDATE_CAPACITY: usize = 100;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Queue `update`, counting the outcome. Returns whether it was queued.
fn dispatch<U>(tx: &mpsc::Sender<U>, update: U, metrics: &QueryMetrics) -> bool {
    match tx.try_send(update) {
        Ok(()) => {
            metrics.record_ui_update();
            true
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            metrics.record_ui_channel_full();
            tracing::warn!("UI update channel full - dropping update");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
            false
        }
    }
}

/// Newest pending value of a coalesced update.
///
/// While a consumer is queued, further values replace the pending one instead
/// of queueing more consumers.
#[derive(Debug)]
pub struct LatestSlot<V> {
    inner: Mutex<Pending<V>>,
}

#[derive(Debug)]
struct Pending<V> {
    value: Option<V>,
    scheduled: bool,
}

impl<V> LatestSlot<V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Pending {
                value: None,
                scheduled: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Pending<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value`. Returns `true` when no consumer is queued yet and the
    /// caller must queue one; `false` when a queued consumer will pick it up.
    fn put(&self, value: V) -> bool {
        let mut pending = self.lock();
        pending.value = Some(value);
        !std::mem::replace(&mut pending.scheduled, true)
    }

    /// Take the newest value; the next `put` queues a new consumer
    fn take(&self) -> Option<V> {
        let mut pending = self.lock();
        pending.scheduled = false;
        pending.value.take()
    }

    /// The consumer could not be queued; keep the value for the next `put`
    fn unschedule(&self) {
        self.lock().scheduled = false;
    }
}

impl<V> Default for LatestSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue a consumer for `latest` unless one is already waiting.
fn dispatch_latest<T, V, F>(
    tx: &mpsc::Sender<UiUpdate<T>>,
    latest: &Arc<LatestSlot<V>>,
    value: V,
    apply: F,
    metrics: &QueryMetrics,
) -> bool
where
    T: 'static,
    V: Send + 'static,
    F: FnOnce(&T, V) + Send + 'static,
{
    if !latest.put(value) {
        metrics.record_ui_update_coalesced();
        return true;
    }

    let pending = Arc::clone(latest);
    let update: UiUpdate<T> = Box::new(move |ui: &T| {
        if let Some(value) = pending.take() {
            apply(ui, value);
        }
    });

    let queued = dispatch(tx, update, metrics);
    if !queued {
        latest.unschedule();
    }
    queued
}

/// Owns the handler thread that marshals updates onto the Slint event loop.
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui, metrics.clone());
///
/// let handle = bridge.clone_handle();
/// std::thread::spawn(move || {
///     handle.update_ui(|ui| ui.set_screen_title("Episodes".into()));
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    ui_weak: Weak<T>,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<QueryMetrics>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create the bridge and start its handler thread.
    ///
    /// The thread exits when every sender is dropped or the event loop is gone.
    pub fn new(ui: &T, metrics: Arc<QueryMetrics>) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UI_UPDATE_CAPACITY);

        let ui_weak_clone = ui_weak.clone();
        let spawned = std::thread::Builder::new()
            .name("rickdex-ui-bridge".into())
            .spawn(move || {
                tracing::debug!("EventLoopBridge handler thread started");

                while let Some(update_fn) = ui_update_rx.blocking_recv() {
                    let result = ui_weak_clone.upgrade_in_event_loop(move |ui| {
                        update_fn(&ui);
                    });

                    if let Err(e) = result {
                        tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                        break;
                    }
                }

                tracing::debug!("EventLoopBridge handler thread terminated");
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to start EventLoopBridge thread: {}", e);
        }

        Self {
            ui_weak,
            ui_update_tx,
            metrics,
        }
    }

    /// Schedule a UI update from any thread; `false` if it was dropped
    pub fn update_ui<F>(&self, update: F) -> bool
    where
        F: FnOnce(&T) + Send + 'static,
    {
        dispatch(&self.ui_update_tx, Box::new(update), &self.metrics)
    }

    /// Cloneable handle for threads and callbacks
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            ui_weak: self.ui_weak.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Lightweight, cloneable sender side of an [`EventLoopBridge`].
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    ui_weak: Weak<T>,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<QueryMetrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// See [`EventLoopBridge::update_ui`].
    pub fn update_ui<F>(&self, update: F) -> bool
    where
        F: FnOnce(&T) + Send + 'static,
    {
        dispatch(&self.ui_update_tx, Box::new(update), &self.metrics)
    }

    /// Apply `value` with `apply`, folding it into an already queued update
    /// for the same slot. The newest value always reaches the window.
    pub fn update_latest<V, F>(&self, latest: &Arc<LatestSlot<V>>, value: V, apply: F) -> bool
    where
        V: Send + 'static,
        F: FnOnce(&T, V) + Send + 'static,
    {
        dispatch_latest(&self.ui_update_tx, latest, value, apply, &self.metrics)
    }

    /// Weak reference to the component; only upgradable on the event loop thread.
    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}
