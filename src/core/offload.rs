//! Thread-offload bridge and the suspendable call handle.

use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;

use tokio::sync::oneshot;
use tracing::debug;

use crate::pool::OffloadPool;

use super::error::DispatchError;
use super::unit::{BlockingFn, BoxFuture};

/// Handle to a pending result that an active scheduler can suspend on.
///
/// Resolves to the unit's value. Dispatch-layer failures (a pool that dropped
/// a job it had accepted) surface as [`DispatchError`]; a unit that panicked
/// on a worker thread is re-raised on the awaiting side with its original
/// payload, not a wrapped one.
pub struct CallHandle<T> {
    inner: HandleInner<T>,
}

enum HandleInner<T> {
    /// The unit's own suspendable execution, passed through untouched.
    Inline(BoxFuture<T>),
    /// Result channel from an offloaded worker thread.
    Offload(oneshot::Receiver<thread::Result<T>>),
}

impl<T> CallHandle<T> {
    pub(crate) fn inline(fut: BoxFuture<T>) -> Self {
        Self {
            inner: HandleInner::Inline(fut),
        }
    }
}

impl<T> fmt::Debug for CallHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            HandleInner::Inline(_) => f.write_str("CallHandle::Inline"),
            HandleInner::Offload(_) => f.write_str("CallHandle::Offload"),
        }
    }
}

impl<T> Future for CallHandle<T> {
    type Output = Result<T, DispatchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            HandleInner::Inline(fut) => fut.as_mut().poll(cx).map(Ok),
            HandleInner::Offload(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(Ok(value))) => Poll::Ready(Ok(value)),
                Poll::Ready(Ok(Err(panic))) => resume_unwind(panic),
                Poll::Ready(Err(_)) => Poll::Ready(Err(DispatchError::OffloadLost(
                    "worker pool dropped the job before completion".into(),
                ))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Submit a blocking unit to the worker pool and return a handle the caller's
/// scheduler can suspend on.
///
/// Returns immediately; the unit never executes on the calling thread. A
/// rejected submission surfaces as [`DispatchError::OffloadRejected`] and is
/// not retried.
pub(crate) fn offload<A, T>(
    pool: &dyn OffloadPool,
    unit: &'static str,
    callable: BlockingFn<A, T>,
    args: A,
) -> Result<CallHandle<T>, DispatchError>
where
    A: Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel::<thread::Result<T>>();
    pool.submit(Box::new(move || {
        let outcome = catch_unwind(AssertUnwindSafe(|| callable(args)));
        // A dropped receiver means the caller stopped waiting.
        let _ = tx.send(outcome);
    }))?;

    debug!(unit = unit, "blocking unit offloaded to worker pool");
    Ok(CallHandle {
        inner: HandleInner::Offload(rx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pool::{Job, SubmitError};

    /// Pool stand-in that runs each job on a freshly spawned thread.
    struct InlineThreadPool;

    impl OffloadPool for InlineThreadPool {
        fn submit(&self, job: Job) -> Result<(), SubmitError> {
            thread::spawn(job);
            Ok(())
        }
    }

    /// Pool stand-in that drops every job on the floor.
    struct DroppingPool;

    impl OffloadPool for DroppingPool {
        fn submit(&self, job: Job) -> Result<(), SubmitError> {
            drop(job);
            Ok(())
        }
    }

    // CallHandle needs no reactor, so a plain executor is enough here.
    fn block_on<F: Future>(fut: F) -> F::Output {
        futures::executor::block_on(fut)
    }

    #[test]
    fn offload_handle_resolves_to_the_unit_value() {
        let callable: BlockingFn<(i32, i32), i32> = Arc::new(|(a, b)| a + b);
        let handle = offload(&InlineThreadPool, "add", callable, (2, 3)).unwrap();
        assert_eq!(block_on(handle).unwrap(), 5);
    }

    #[test]
    fn dropped_job_surfaces_as_offload_lost() {
        let callable: BlockingFn<(), i32> = Arc::new(|()| 1);
        let handle = offload(&DroppingPool, "lost", callable, ()).unwrap();
        let err = block_on(handle).unwrap_err();
        assert!(matches!(err, DispatchError::OffloadLost(_)));
    }

    #[test]
    #[should_panic(expected = "kaboom")]
    fn worker_panic_is_reraised_with_its_original_payload() {
        let callable: BlockingFn<(), i32> = Arc::new(|()| panic!("kaboom"));
        let handle = offload(&InlineThreadPool, "explode", callable, ()).unwrap();
        let _ = block_on(handle);
    }

    #[test]
    fn inline_handle_passes_the_future_through() {
        let handle = CallHandle::inline(Box::pin(async { "done" }));
        assert_eq!(block_on(handle).unwrap(), "done");
    }
}
