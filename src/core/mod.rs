//! Core dispatch engine: context probing, the per-unit cache, wrap-time
//! classification, and the four-way decision matrix.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod offload;
mod sync_bridge;
pub mod unit;

pub use context::{ContextProbe, DispatchCache, ExecutionContext};
pub use dispatcher::{DispatchStrategy, Dispatched, Dispatcher};
pub use error::{AppResult, DispatchError};
pub use offload::CallHandle;
pub use unit::{BoxFuture, Callee, UnitKind, WrappedUnit};
