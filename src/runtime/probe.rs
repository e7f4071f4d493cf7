//! Tokio-backed execution-context probe.

use tokio::runtime::Handle;

use crate::core::{ContextProbe, ExecutionContext};

/// Probe that asks tokio whether a runtime is bound to the calling thread.
///
/// `Handle::try_current()` is a thread-local lookup: cheap, side-effect free,
/// and it never builds a runtime. A missing runtime is the normal
/// `Unscheduled` answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioContextProbe;

impl ContextProbe for TokioContextProbe {
    fn detect(&self) -> ExecutionContext {
        if Handle::try_current().is_ok() {
            ExecutionContext::Scheduled
        } else {
            ExecutionContext::Unscheduled
        }
    }
}
