use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifies one load-and-render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CycleToken(u64);

impl CycleToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Last-issued-wins gate for asynchronous load cycles.
///
/// Results are keyed on issuance order: a cycle may only touch the view
/// while its token is still the active one. Nothing is cancelled; stale
/// work simply finds its token superseded and drops its result.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    active: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&self) -> CycleToken {
        CycleToken(self.active.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> CycleToken {
        CycleToken(self.active.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, token: CycleToken) -> bool {
        self.active.load(Ordering::SeqCst) == token.0
    }

    /// Runs `effect` only if `token` is still active.
    pub fn run_if_current<T>(&self, token: CycleToken, effect: impl FnOnce() -> T) -> Option<T> {
        if self.is_current(token) {
            Some(effect())
        } else {
            debug!(cycle = token.0, active = self.current().0, "discarding stale cycle result");
            None
        }
    }
}
