//! The dispatch decision matrix over (caller context, callee kind).

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::OffloadPoolConfig;
use crate::pool::{OffloadPool, PoolError, ThreadPool};
use crate::runtime::probe::TokioContextProbe;

use super::context::{ContextProbe, ExecutionContext};
use super::error::DispatchError;
use super::offload::{self, CallHandle};
use super::sync_bridge;
use super::unit::{CalleeInner, UnitKind, WrappedUnit};

/// The four strategies dispatch can select, one per row of the
/// (context, kind) matrix. Transient: chosen per call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// Unscheduled caller, suspendable unit: drive it to completion in place
    /// on a private scheduler and return the final value.
    RunToCompletion,
    /// Unscheduled caller, blocking unit: plain synchronous invocation on the
    /// calling thread.
    DirectCall,
    /// Scheduled caller, suspendable unit: hand back the unit's own execution
    /// as a handle without waiting on it.
    PassThrough,
    /// Scheduled caller, blocking unit: ship it to the worker pool and return
    /// a handle, keeping the scheduler responsive.
    Offload,
}

impl DispatchStrategy {
    /// Select the strategy for a (context, kind) pair.
    ///
    /// Closed and exhaustive so every row is independently testable.
    #[must_use]
    pub const fn select(context: ExecutionContext, kind: UnitKind) -> Self {
        match (context, kind) {
            (ExecutionContext::Unscheduled, UnitKind::Suspendable) => Self::RunToCompletion,
            (ExecutionContext::Unscheduled, UnitKind::Blocking) => Self::DirectCall,
            (ExecutionContext::Scheduled, UnitKind::Suspendable) => Self::PassThrough,
            (ExecutionContext::Scheduled, UnitKind::Blocking) => Self::Offload,
        }
    }
}

/// Outcome of dispatching a wrapped unit.
pub enum Dispatched<T> {
    /// Unscheduled paths: the unit's final value, produced before returning.
    Ready(T),
    /// Scheduled paths: a handle the active scheduler suspends on.
    Pending(CallHandle<T>),
}

impl<T> Dispatched<T> {
    /// The final value, if the unit ran to completion on this thread.
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(_) => None,
        }
    }

    /// The pending handle, if completion was handed back to the scheduler.
    pub fn into_pending(self) -> Option<CallHandle<T>> {
        match self {
            Self::Ready(_) => None,
            Self::Pending(handle) => Some(handle),
        }
    }
}

impl<T> fmt::Debug for Dispatched<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Dispatched::Ready"),
            Self::Pending(handle) => write!(f, "Dispatched::Pending({handle:?})"),
        }
    }
}

/// The core decision engine.
///
/// Combines the caller's context (cache, then probe) with the unit's stored
/// kind and runs exactly one of the four strategies. The dispatcher itself is
/// synchronous and non-blocking except on the run-to-completion path, which
/// blocks deliberately: it is chosen precisely when the caller has no
/// scheduler to keep responsive.
pub struct Dispatcher {
    probe: Arc<dyn ContextProbe>,
    pool: Arc<dyn OffloadPool>,
}

impl Dispatcher {
    /// Build a dispatcher with the tokio probe and a stock thread pool sized
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] if the configuration is invalid or worker threads
    /// cannot be spawned.
    pub fn new(config: OffloadPoolConfig) -> Result<Self, PoolError> {
        Ok(Self::with_parts(
            Arc::new(TokioContextProbe),
            Arc::new(ThreadPool::new(config)?),
        ))
    }

    /// Build a dispatcher from injected collaborators.
    #[must_use]
    pub fn with_parts(probe: Arc<dyn ContextProbe>, pool: Arc<dyn OffloadPool>) -> Self {
        Self { probe, pool }
    }

    /// Dispatch one call on a wrapped unit.
    ///
    /// Context resolution: a latched cache short-circuits to `Scheduled`
    /// without probing. Otherwise the probe runs; a `Scheduled` answer is
    /// latched before proceeding so later calls on this unit skip the probe,
    /// while an `Unscheduled` answer writes nothing, so every unscheduled call
    /// re-probes.
    ///
    /// # Errors
    ///
    /// Only dispatch-layer failures are raised here; the unit's own failure
    /// travels inside `T`. See [`DispatchError`].
    pub fn dispatch<A, T>(
        &self,
        unit: &WrappedUnit<A, T>,
        args: A,
    ) -> Result<Dispatched<T>, DispatchError>
    where
        A: Send + 'static,
        T: Send + 'static,
    {
        let context = if unit.cache().read() {
            trace!(unit = unit.name(), "dispatch cache hit, skipping probe");
            ExecutionContext::Scheduled
        } else {
            let detected = self.probe.detect();
            if detected == ExecutionContext::Scheduled {
                unit.cache().mark_scheduled();
            }
            detected
        };

        debug!(
            unit = unit.name(),
            context = ?context,
            strategy = ?DispatchStrategy::select(context, unit.kind()),
            "dispatching"
        );

        match (context, unit.callee().inner()) {
            (ExecutionContext::Unscheduled, CalleeInner::Suspendable(f)) => {
                sync_bridge::run_to_completion(unit.name(), f(args)).map(Dispatched::Ready)
            }
            (ExecutionContext::Unscheduled, CalleeInner::Blocking(f)) => {
                Ok(Dispatched::Ready(f(args)))
            }
            (ExecutionContext::Scheduled, CalleeInner::Suspendable(f)) => {
                Ok(Dispatched::Pending(CallHandle::inline(f(args))))
            }
            (ExecutionContext::Scheduled, CalleeInner::Blocking(f)) => {
                offload::offload(self.pool.as_ref(), unit.name(), Arc::clone(f), args)
                    .map(Dispatched::Pending)
            }
        }
    }

    /// Force a unit's dispatch cache back to unscheduled.
    ///
    /// Diagnostic/test hook only; equivalent to [`WrappedUnit::reset_cache`].
    pub fn reset_cache<A, T>(&self, unit: &WrappedUnit<A, T>) {
        unit.reset_cache();
    }
}
