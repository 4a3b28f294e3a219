use crate::charts::{AxisUpdate, ChartPane};
use crate::window::VisibleRange;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, warn};

pub type RangeListener = Box<dyn Fn(&AxisUpdate) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every other mounted pane was asked to show `axis`.
    Synced { axis: AxisUpdate, failed: Vec<String> },
    /// A pass was already running; the event was dropped.
    Ignored,
}

/// Keeps every mounted chart on the same x-axis range.
///
/// A pan or zoom on one pane is copied to all the others. Relayouts issued
/// during a pass fire their own events; those arrive while the guard is
/// held and are dropped, which is what stops the A→B→A feedback loop.
#[derive(Default)]
pub struct ChartRangeSynchronizer {
    panes: RwLock<Vec<Arc<dyn ChartPane>>>,
    active_range: Mutex<Option<VisibleRange>>,
    syncing: AtomicBool,
    listeners: Mutex<Vec<RangeListener>>,
}

impl ChartRangeSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `pane`, replacing any pane with the same id.
    pub fn mount(&self, pane: Arc<dyn ChartPane>) {
        let mut panes = self.panes.write().unwrap_or_else(PoisonError::into_inner);
        panes.retain(|existing| existing.id() != pane.id());
        panes.push(pane);
    }

    pub fn unmount(&self, id: &str) {
        let mut panes = self.panes.write().unwrap_or_else(PoisonError::into_inner);
        panes.retain(|pane| pane.id() != id);
    }

    pub fn panes(&self) -> Vec<Arc<dyn ChartPane>> {
        self.panes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.panes().iter().any(|pane| pane.id() == id)
    }

    /// `None` means the charts are auto-ranged.
    pub fn active_range(&self) -> Option<VisibleRange> {
        lock(&self.active_range).clone()
    }

    /// Forgets any zoom without touching the panes; the next draw sets
    /// their axes.
    pub fn clear_active_range(&self) {
        *lock(&self.active_range) = None;
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Called after each completed pass with the axis every pane now shows.
    /// Listeners must not subscribe from inside the callback.
    pub fn subscribe(&self, listener: RangeListener) {
        lock(&self.listeners).push(listener);
    }

    /// Propagates an axis change reported by pane `source` to its siblings.
    pub fn handle_relayout(&self, source: &str, update: AxisUpdate) -> SyncOutcome {
        let Some(guard) = SyncGuard::acquire(&self.syncing) else {
            debug!(source, "range sync already running, ignoring relayout");
            return SyncOutcome::Ignored;
        };

        let axis = AxisUpdate::from(update.range().cloned());
        *lock(&self.active_range) = axis.range().cloned();

        let mut failed = Vec::new();
        for pane in self.panes().iter().filter(|pane| pane.id() != source) {
            if let Err(err) = pane.relayout(&axis) {
                warn!(pane = pane.id(), %err, "failed to sync chart range");
                failed.push(pane.id().to_owned());
            }
        }
        drop(guard);

        debug!(source, ?axis, "chart ranges synced");
        for listener in lock(&self.listeners).iter() {
            listener(&axis);
        }

        SyncOutcome::Synced { axis, failed }
    }
}

/// Holds the sync flag; releasing it on drop covers early returns and panics.
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SyncGuard(flag))
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
