//! View lifetime and abort signalling
//!
//! Every remote call a view makes runs through [`ViewLifetime::run`]. When
//! the view is unmounted (explicitly, or by dropping its lifetime), calls
//! still in flight are aborted and resolve to [`ViewError::Unmounted`], so
//! a late response can never touch a view that is gone.

use crate::error::ViewError;
use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    unmounted: AtomicBool,
    next_call: AtomicU64,
    in_flight: Mutex<HashMap<u64, AbortHandle>>,
}

impl Inner {
    fn unmount(&self) {
        if self.unmounted.swap(true, Ordering::SeqCst) {
            return;
        }
        let aborted: Vec<AbortHandle> = self.in_flight.lock().drain().map(|(_, h)| h).collect();
        if !aborted.is_empty() {
            tracing::debug!(count = aborted.len(), "aborting in-flight calls on unmount");
        }
        for handle in aborted {
            handle.abort();
        }
    }
}

/// Lifetime of one mounted view
#[derive(Debug, Default)]
pub struct ViewLifetime {
    inner: Arc<Inner>,
}

impl ViewLifetime {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the front end keeps to unmount the view from outside
    #[inline]
    #[must_use]
    pub fn handle(&self) -> UnmountHandle {
        UnmountHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.inner.unmounted.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    /// Number of calls currently registered
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Run `call` unless and until the view is unmounted
    ///
    /// # Errors
    /// `ViewError::Unmounted` if the view is, or becomes, unmounted
    pub async fn guard<F>(&self, call: F) -> Result<F::Output, ViewError>
    where
        F: Future,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.inner.next_call.fetch_add(1, Ordering::Relaxed);
        {
            let mut in_flight = self.inner.in_flight.lock();
            if self.inner.unmounted.load(Ordering::SeqCst) {
                return Err(ViewError::Unmounted);
            }
            in_flight.insert(id, handle);
        }
        let _registered = Registered {
            inner: &self.inner,
            id,
        };

        match Abortable::new(call, registration).await {
            Ok(output) if self.is_mounted() => Ok(output),
            _ => Err(ViewError::Unmounted),
        }
    }

    /// [`guard`](Self::guard) for fallible calls, flattening the error
    pub async fn run<F, T, E>(&self, call: F) -> Result<T, ViewError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ViewError>,
    {
        self.guard(call).await?.map_err(Into::into)
    }
}

/// Deregisters a call when it finishes or its future is dropped
struct Registered<'a> {
    inner: &'a Inner,
    id: u64,
}

impl Drop for Registered<'_> {
    fn drop(&mut self) {
        self.inner.in_flight.lock().remove(&self.id);
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

/// Detached handle that unmounts a view
#[derive(Debug, Clone)]
pub struct UnmountHandle {
    inner: Arc<Inner>,
}

impl UnmountHandle {
    #[inline]
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.inner.unmounted.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confstore_core::ApiError;

    #[tokio::test]
    async fn completed_call_passes_through() {
        let lifetime = ViewLifetime::new();
        let value = lifetime.guard(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(lifetime.in_flight(), 0);
    }

    #[tokio::test]
    async fn run_flattens_errors() {
        let lifetime = ViewLifetime::new();
        let result: Result<(), ViewError> = lifetime
            .run(async { Err::<(), _>(ApiError::Unauthenticated) })
            .await;
        assert_eq!(result, Err(ViewError::Api(ApiError::Unauthenticated)));
    }

    #[tokio::test]
    async fn unmounted_view_starts_no_call() {
        let lifetime = ViewLifetime::new();
        lifetime.unmount();

        let mut started = false;
        let result = lifetime.guard(async { started = true }).await;
        assert_eq!(result, Err(ViewError::Unmounted));
        assert!(!started);
    }

    #[tokio::test]
    async fn unmount_aborts_pending_call() {
        let lifetime = ViewLifetime::new();
        let handle = lifetime.handle();

        let pending = lifetime.guard(futures::future::pending::<()>());
        let unmount = async {
            tokio::task::yield_now().await;
            handle.unmount();
        };

        let (result, ()) = tokio::join!(pending, unmount);
        assert_eq!(result, Err(ViewError::Unmounted));
        assert!(!handle.is_mounted());
        assert_eq!(lifetime.in_flight(), 0);
    }

    #[tokio::test]
    async fn dropped_call_is_deregistered() {
        let lifetime = ViewLifetime::new();

        let mut call = Box::pin(lifetime.guard(futures::future::pending::<()>()));
        assert!(futures::poll!(&mut call).is_pending());
        assert_eq!(lifetime.in_flight(), 1);

        drop(call);
        assert_eq!(lifetime.in_flight(), 0);
        assert!(lifetime.is_mounted());
    }

    #[tokio::test]
    async fn timed_out_calls_do_not_accumulate() {
        let lifetime = ViewLifetime::new();
        for _ in 0..3 {
            let timed = tokio::time::timeout(
                std::time::Duration::from_millis(1),
                lifetime.guard(futures::future::pending::<()>()),
            )
            .await;
            assert!(timed.is_err());
        }
        assert_eq!(lifetime.in_flight(), 0);
    }

    #[test]
    fn drop_unmounts() {
        let lifetime = ViewLifetime::new();
        let handle = lifetime.handle();
        drop(lifetime);
        assert!(!handle.is_mounted());
    }
}
