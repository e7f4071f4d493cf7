//! Wrapped units and wrap-time classification.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::context::DispatchCache;

/// A boxed future produced by a suspendable callee.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub(crate) type BlockingFn<A, T> = Arc<dyn Fn(A) -> T + Send + Sync>;
pub(crate) type SuspendableFn<A, T> = Arc<dyn Fn(A) -> BoxFuture<T> + Send + Sync>;

/// What a unit of work needs from its caller to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Proceeds to completion only under a scheduler; yields at suspension
    /// points.
    Suspendable,
    /// Runs to completion on the calling thread without ever yielding.
    Blocking,
}

/// The underlying callable of a wrapped unit.
///
/// Built through [`Callee::blocking`] or [`Callee::suspendable`]; the
/// constructor chosen fixes the unit's [`UnitKind`] once, at wrap time. It is
/// never re-evaluated.
pub struct Callee<A, T> {
    inner: CalleeInner<A, T>,
}

pub(crate) enum CalleeInner<A, T> {
    Blocking(BlockingFn<A, T>),
    Suspendable(SuspendableFn<A, T>),
}

impl<A, T> Callee<A, T> {
    /// Wrap a plain closure that runs to completion without yielding.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self {
            inner: CalleeInner::Blocking(Arc::new(f)),
        }
    }

    /// Wrap a closure producing a future that needs a scheduler to finish.
    pub fn suspendable<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            inner: CalleeInner::Suspendable(Arc::new(move |args| {
                let fut: BoxFuture<T> = Box::pin(f(args));
                fut
            })),
        }
    }

    /// Classify the callable as suspendable or blocking.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self.inner {
            CalleeInner::Blocking(_) => UnitKind::Blocking,
            CalleeInner::Suspendable(_) => UnitKind::Suspendable,
        }
    }

    pub(crate) fn inner(&self) -> &CalleeInner<A, T> {
        &self.inner
    }
}

/// A unit of work adapted for context-blind invocation.
///
/// Immutable after creation: the callable, its kind (classified exactly once
/// at wrap time), and an owned [`DispatchCache`]. The unit owns its cache cell
/// directly, so no registry or weak-reference bookkeeping exists anywhere.
/// Share the unit between call sites with [`Arc`]; it lives as long as any
/// reference to it does.
pub struct WrappedUnit<A, T> {
    name: &'static str,
    callee: Callee<A, T>,
    kind: UnitKind,
    cache: DispatchCache,
}

impl<A, T> WrappedUnit<A, T> {
    /// Adapt a callable, classifying it exactly once.
    ///
    /// The name is carried for diagnostics; it appears in the
    /// `ContextConflict` message so the caller knows which call site to fix.
    pub fn wrap(name: &'static str, callee: Callee<A, T>) -> Self {
        let kind = callee.kind();
        Self {
            name,
            callee,
            kind,
            cache: DispatchCache::new(),
        }
    }

    /// Shorthand for wrapping a blocking closure.
    pub fn blocking<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self::wrap(name, Callee::blocking(f))
    }

    /// Shorthand for wrapping a suspendable closure.
    pub fn suspendable<F, Fut>(name: &'static str, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::wrap(name, Callee::suspendable(f))
    }

    /// Diagnostic name given at wrap time.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The kind stored at wrap time.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// The dispatch cache owned by this unit.
    #[must_use]
    pub const fn cache(&self) -> &DispatchCache {
        &self.cache
    }

    /// Force the dispatch cache back to unscheduled.
    ///
    /// Diagnostic/test hook only; production call sites never need it.
    pub fn reset_cache(&self) {
        self.cache.reset();
    }

    pub(crate) fn callee(&self) -> &Callee<A, T> {
        &self.callee
    }
}

impl<A, T> fmt::Debug for WrappedUnit<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedUnit")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("scheduled_seen", &self.cache.read())
            .finish()
    }
}
