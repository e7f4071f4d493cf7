//! Run-to-completion bridge for suspendable units on unscheduled threads.

use std::future::Future;

use tokio::runtime::{Builder, Handle};
use tracing::debug;

use super::error::DispatchError;

/// Drive a suspendable unit's future to completion on the calling thread.
///
/// Builds a private current-thread scheduler scoped to this single call; it
/// lives on this stack frame, so it is torn down on every exit path, including
/// when the unit panics. The unit's own failure propagates unchanged through
/// the returned value.
///
/// If the calling thread already hosts an active scheduler (a nested attempt,
/// e.g. one that started between the dispatch probe and this call), the bridge
/// refuses with [`DispatchError::ContextConflict`] instead of stalling that
/// scheduler's thread.
pub(crate) fn run_to_completion<T, F>(unit: &'static str, fut: F) -> Result<T, DispatchError>
where
    F: Future<Output = T>,
{
    if Handle::try_current().is_ok() {
        return Err(DispatchError::ContextConflict { unit });
    }

    let scheduler = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DispatchError::SchedulerBuild)?;

    debug!(unit = unit, "driving unit to completion on a private scheduler");
    Ok(scheduler.block_on(fut))
}
