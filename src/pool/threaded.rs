//! Stock offload pool backed by dedicated OS threads.
//!
//! Workers block on a bounded crossbeam channel; dropping the sender during
//! shutdown unblocks them naturally, so there is no polling anywhere. A
//! panicking job is contained on its worker thread and never takes the pool
//! down.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::OffloadPoolConfig;

use super::{Job, OffloadPool, PoolCounters, PoolError, PoolStats, SubmitError};

/// Offload pool with dedicated OS threads for blocking work.
#[derive(Debug)]
pub struct ThreadPool {
    config: OffloadPoolConfig,
    /// Job sender (to workers). Option allows clean shutdown by dropping.
    job_tx: Mutex<Option<Sender<Job>>>,
    counters: Arc<PoolCounters>,
    shutdown: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Create a pool with `config.worker_count` dedicated OS threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for a rejected configuration and
    /// [`PoolError::Spawn`] if a worker thread cannot be started.
    pub fn new(config: OffloadPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (job_tx, job_rx) = bounded::<Job>(config.max_queue_depth);
        let counters = Arc::new(PoolCounters::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            workers.push(spawn_worker(
                worker_id,
                job_rx.clone(),
                Arc::clone(&counters),
                Arc::clone(&shutdown),
                config.thread_stack_size,
            )?);
        }

        info!(
            worker_count = config.worker_count,
            max_queue_depth = config.max_queue_depth,
            "offload pool initialized with dedicated OS threads"
        );

        Ok(Self {
            config,
            job_tx: Mutex::new(Some(job_tx)),
            counters,
            shutdown,
            workers: Mutex::new(workers),
        })
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.config.worker_count)
    }

    /// Shut down the pool gracefully.
    ///
    /// Drops the job sender so idle workers unblock and exit once the queue
    /// drains, then joins them. Safe to call more than once.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return; // Already shut down
        }

        info!("shutting down offload pool");

        {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
        }

        let mut workers = self.workers.lock();
        for (worker_id, worker) in workers.drain(..).enumerate() {
            if worker.join().is_err() {
                warn!(worker_id = worker_id, "worker panicked");
            }
        }

        info!("offload pool shut down complete");
    }
}

impl OffloadPool for ThreadPool {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        if self.shutdown.load(Ordering::Acquire) {
            self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::Shutdown);
        }

        let job_tx_guard = self.job_tx.lock();
        let Some(job_tx) = job_tx_guard.as_ref() else {
            self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::Shutdown);
        };

        match job_tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                self.counters.queued_jobs.fetch_add(1, Ordering::Relaxed);
                debug!("job submitted to offload pool");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
                warn!("offload pool queue is full");
                Err(SubmitError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
                Err(SubmitError::Shutdown)
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Signal shutdown but DON'T join workers in Drop; explicit shutdown()
        // is required for graceful cleanup.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
            debug!("offload pool dropped without explicit shutdown - workers will be detached");
        }
    }
}

/// Spawn a worker thread.
fn spawn_worker(
    worker_id: usize,
    job_rx: Receiver<Job>,
    counters: Arc<PoolCounters>,
    shutdown: Arc<AtomicBool>,
    stack_size: usize,
) -> Result<JoinHandle<()>, PoolError> {
    let handle = thread::Builder::new()
        .name(format!("offload-worker-{worker_id}"))
        .stack_size(stack_size)
        .spawn(move || {
            debug!(worker_id = worker_id, "worker thread started");

            // Blocking recv; when the sender is dropped, recv() returns Err
            // and the worker exits.
            loop {
                let job = match job_rx.recv() {
                    Ok(job) => job,
                    Err(_) => {
                        debug!(worker_id = worker_id, "worker channel closed, exiting");
                        break;
                    }
                };

                if shutdown.load(Ordering::Acquire) {
                    // A job accepted before shutdown is dropped here; its
                    // result channel closes and the waiter sees OffloadLost.
                    debug!(worker_id = worker_id, "worker shutdown during drain, exiting");
                    break;
                }

                counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);

                // Jobs from the offload bridge already contain their own
                // panic boundary; this one protects the worker from raw
                // submissions.
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    warn!(worker_id = worker_id, "offloaded job panicked");
                }

                counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
            }

            debug!(worker_id = worker_id, "worker thread exiting");
        })?;

    Ok(handle)
}
