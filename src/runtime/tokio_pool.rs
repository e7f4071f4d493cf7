//! Offload pool adapter over a tokio runtime's blocking thread pool.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::pool::{Job, OffloadPool, SubmitError};

/// Offload pool that submits jobs through `Handle::spawn_blocking`.
///
/// For applications that already run a multi-threaded tokio runtime and want
/// offloaded work on its blocking pool instead of a dedicated one. Sizing and
/// shutdown belong to the runtime, not to this adapter.
#[derive(Debug, Clone)]
pub struct TokioBlockingPool {
    handle: Arc<Handle>,
}

impl TokioBlockingPool {
    /// Create a pool adapter from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }
}

impl OffloadPool for TokioBlockingPool {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        // spawn_blocking queues without an admission bound; if the runtime is
        // shutting down the job is dropped and the waiter sees its result
        // channel close.
        let _join = self.handle.spawn_blocking(job);
        Ok(())
    }
}
