//! View Scopes
//!
//! A [`ViewScope`] lives as long as a mounted view. Remote calls started by the
//! view run through [`ScopeHandle::guard`]; closing the scope aborts them, and
//! no completion handler runs afterwards.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, abortable};

#[derive(Debug, Default)]
struct ScopeInner {
    closed: AtomicBool,
    next_task: AtomicU64,
    in_flight: Mutex<HashMap<u64, AbortHandle>>,
}

/// Cloneable reference to a view's scope, moved into async tasks
#[derive(Clone, Debug, Default)]
pub struct ScopeHandle {
    inner: Arc<ScopeInner>,
}

impl ScopeHandle {
    pub fn is_alive(&self) -> bool {
        !self.inner.closed.load(Ordering::Acquire)
    }

    /// Run `fut` unless the scope closes first.
    ///
    /// Returns `None` when the scope was already closed, or closed while
    /// `fut` was pending.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_alive() {
            return None;
        }

        let (fut, abort) = abortable(fut);
        let task = self.inner.next_task.fetch_add(1, Ordering::Relaxed);
        self.in_flight().insert(task, abort);

        // close() may have drained the map before the insert above
        if !self.is_alive() {
            self.in_flight().remove(&task);
            return None;
        }

        let output = fut.await;
        self.in_flight().remove(&task);
        output.ok().filter(|_| self.is_alive())
    }

    /// Run a state mutation only while the scope is alive
    pub fn apply<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.is_alive().then(f)
    }

    /// Number of guarded futures still pending
    pub fn in_flight_count(&self) -> usize {
        self.in_flight().len()
    }

    fn in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<u64, AbortHandle>> {
        self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let pending: Vec<_> = self.in_flight().drain().map(|(_, handle)| handle).collect();
        if !pending.is_empty() {
            tracing::debug!(aborted = pending.len(), "view scope closed with calls in flight");
        }
        for handle in pending {
            handle.abort();
        }
    }
}

/// Owned by a mounted view; closes on drop
#[derive(Debug, Default)]
pub struct ViewScope {
    handle: ScopeHandle,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn is_closed(&self) -> bool {
        !self.handle.is_alive()
    }

    /// Abort everything in flight and refuse further work
    pub fn close(&self) {
        self.handle.close();
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.handle.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_guard_passes_output_through() {
        let scope = ViewScope::new();
        assert_eq!(scope.handle().guard(async { 7 }).await, Some(7));
        assert_eq!(scope.handle().in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_scope_does_not_start_work() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        scope.close();

        let mut started = false;
        let output = handle.guard(async { started = true }).await;
        assert_eq!(output, None);
        assert!(!started);
        assert_eq!(handle.apply(|| 1), None);
    }

    #[tokio::test]
    async fn test_close_aborts_pending_call() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        let gate = Arc::new(Notify::new());

        let waiter = Arc::clone(&gate);
        let mut pending = Box::pin(handle.guard(async move {
            waiter.notified().await;
            "late"
        }));
        assert!((&mut pending).now_or_never().is_none());
        assert_eq!(handle.in_flight_count(), 1);

        drop(scope);
        gate.notify_one();
        assert_eq!(pending.await, None);
        assert_eq!(handle.in_flight_count(), 0);
    }
}
