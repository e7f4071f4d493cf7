//! Error types for dispatch operations.

use thiserror::Error;

use crate::pool::SubmitError;

/// Errors raised by the dispatch layer itself.
///
/// A wrapped unit's own failure is never represented here: a unit that returns
/// `Result` keeps that `Result` as its output type `T`, and it flows through
/// every dispatch path unchanged. A unit that panics on a worker thread is
/// re-raised on the awaiting side with its original payload.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A run-to-completion was requested on a thread that already hosts an
    /// active scheduler (nested-scheduler attempt).
    #[error(
        "cannot run `{unit}` to completion: a scheduler is already active on \
         this thread; suspend on the unit (`.await` its handle) instead of \
         calling it directly"
    )]
    ContextConflict {
        /// Name of the wrapped unit the caller tried to drive.
        unit: &'static str,
    },
    /// The worker pool rejected the offload submission.
    #[error("offload submission rejected: {0}")]
    OffloadRejected(#[from] SubmitError),
    /// The worker pool accepted the job but dropped it before completion.
    #[error("offload result lost: {0}")]
    OffloadLost(String),
    /// Building the private scheduler for a run-to-completion failed.
    #[error("failed to build private scheduler: {0}")]
    SchedulerBuild(#[source] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
