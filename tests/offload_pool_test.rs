//! Integration tests for the offload path: pool rejection, lost jobs, and the
//! tokio blocking-pool adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ambicall::config::OffloadPoolConfig;
use ambicall::core::{ContextProbe, DispatchError, Dispatcher, ExecutionContext, WrappedUnit};
use ambicall::pool::{Job, OffloadPool, SubmitError, ThreadPool};
use ambicall::runtime::{TokioBlockingPool, TokioContextProbe};

/// Probe that always answers `Scheduled`, so blocking units offload even from
/// a plain test thread.
struct ScheduledProbe;

impl ContextProbe for ScheduledProbe {
    fn detect(&self) -> ExecutionContext {
        ExecutionContext::Scheduled
    }
}

#[test]
fn a_full_queue_surfaces_as_offload_rejected() {
    let pool = Arc::new(
        ThreadPool::new(
            OffloadPoolConfig::new()
                .with_worker_count(1)
                .with_max_queue_depth(1),
        )
        .unwrap(),
    );

    // Occupy the single worker until released.
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    pool.submit(Box::new(move || {
        started_tx.send(()).unwrap();
        let _ = release_rx.recv();
    }))
    .unwrap();
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let d = Dispatcher::with_parts(Arc::new(ScheduledProbe), Arc::clone(&pool) as Arc<dyn OffloadPool>);
    let unit = WrappedUnit::blocking("busy", |(): ()| ());

    // The queue has one slot; the second dispatch is refused, not retried.
    assert!(d.dispatch(&unit, ()).is_ok());
    let err = d.dispatch(&unit, ()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::OffloadRejected(SubmitError::QueueFull)
    ));

    release_tx.send(()).unwrap();
    pool.shutdown();
}

#[test]
fn dispatch_against_a_shut_down_pool_is_rejected() {
    let pool = Arc::new(
        ThreadPool::new(OffloadPoolConfig::new().with_worker_count(1)).unwrap(),
    );
    pool.shutdown();

    let d = Dispatcher::with_parts(Arc::new(ScheduledProbe), Arc::clone(&pool) as Arc<dyn OffloadPool>);
    let unit = WrappedUnit::blocking("late", |(): ()| ());

    let err = d.dispatch(&unit, ()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::OffloadRejected(SubmitError::Shutdown)
    ));
}

/// Pool stand-in that accepts every job and then drops it.
struct DroppingPool;

impl OffloadPool for DroppingPool {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        drop(job);
        Ok(())
    }
}

#[tokio::test]
async fn a_dropped_job_resolves_to_offload_lost() {
    let d = Dispatcher::with_parts(Arc::new(TokioContextProbe), Arc::new(DroppingPool));
    let unit = WrappedUnit::blocking("doomed", |(): ()| 1);

    let handle = d.dispatch(&unit, ()).unwrap().into_pending().unwrap();
    let err = handle.await.unwrap_err();
    assert!(matches!(err, DispatchError::OffloadLost(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_blocking_pool_adapter_offloads_off_thread() {
    let d = Dispatcher::with_parts(
        Arc::new(TokioContextProbe),
        Arc::new(TokioBlockingPool::new(tokio::runtime::Handle::current())),
    );

    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);
    let caller = thread::current().id();

    let unit = WrappedUnit::blocking("add", move |(a, b): (u64, u64)| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert_ne!(thread::current().id(), caller);
        a + b
    });

    let handle = d.dispatch(&unit, (2, 3)).unwrap().into_pending().unwrap();
    assert_eq!(handle.await.unwrap(), 5);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn pool_counters_track_the_offload_traffic() {
    let pool = Arc::new(
        ThreadPool::new(
            OffloadPoolConfig::new()
                .with_worker_count(2)
                .with_max_queue_depth(16),
        )
        .unwrap(),
    );

    let d = Dispatcher::with_parts(Arc::new(ScheduledProbe), Arc::clone(&pool) as Arc<dyn OffloadPool>);
    let unit = WrappedUnit::blocking("count", |x: u64| x);

    let (tx, rx) = mpsc::channel();
    for i in 0..4u64 {
        let handle = d.dispatch(&unit, i).unwrap().into_pending().unwrap();
        tx.send(handle).unwrap();
    }
    drop(tx);

    // Resolve all handles on a throwaway runtime, then check the counters.
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut total = 0;
    while let Ok(handle) = rx.recv() {
        total += rt.block_on(handle).unwrap();
    }
    assert_eq!(total, 6);

    // The completed counter is bumped after the job's result is delivered,
    // so give the workers a moment to finish bookkeeping.
    for _ in 0..100 {
        if pool.stats().completed_jobs == 4 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    let stats = pool.stats();
    assert_eq!(stats.worker_count, 2);
    assert_eq!(stats.submitted_jobs, 4);
    assert_eq!(stats.completed_jobs, 4);
    assert_eq!(stats.rejected_jobs, 0);
}
