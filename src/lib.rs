//! # Ambicall
//!
//! A context-adaptive call dispatch layer: wrap a unit of work once and invoke
//! it correctly from both synchronous code and code running inside a tokio
//! runtime, without the caller declaring which one it is.
//!
//! ## Core Problem Solved
//!
//! Libraries that serve both sync and async applications usually end up with
//! duplicated APIs (`fetch` / `fetch_async`) or with callers that must know
//! whether a runtime is active. Ambicall moves that decision into a dispatch
//! engine:
//!
//! - **Context detection**: is a scheduler bound to the calling thread?
//! - **Asymmetric caching**: a unit observed in scheduled context latches that
//!   observation; unscheduled calls always re-probe
//! - **Four-way dispatch**: (context × unit kind) selects run-to-completion,
//!   direct call, pass-through, or thread offload
//! - **Thread offload**: blocking work called under a runtime is shipped to a
//!   worker pool so the runtime stays responsive
//! - **Run-to-completion**: suspendable work called from plain sync code is
//!   driven on a private, call-scoped scheduler
//!
//! ## Example
//!
//! ```rust,ignore
//! use ambicall::config::OffloadPoolConfig;
//! use ambicall::core::{Dispatched, Dispatcher, WrappedUnit};
//!
//! let dispatcher = Dispatcher::new(OffloadPoolConfig::new().with_worker_count(4))?;
//! let add = WrappedUnit::blocking("add", |(a, b): (i32, i32)| a + b);
//!
//! // From plain sync code: the value comes back directly.
//! let five = dispatcher.dispatch(&add, (2, 3))?.into_ready().unwrap();
//!
//! // From inside a runtime: the same call yields a handle to await, and the
//! // blocking work runs on a worker thread.
//! # async fn scheduled(dispatcher: &Dispatcher, add: &WrappedUnit<(i32, i32), i32>) {
//! match dispatcher.dispatch(add, (2, 3)).unwrap() {
//!     Dispatched::Pending(handle) => assert_eq!(handle.await.unwrap(), 5),
//!     Dispatched::Ready(_) => unreachable!(),
//! }
//! # }
//! ```
//!
//! ## Caveat: the one-way cache
//!
//! Once a unit has been observed being called from scheduled context, the
//! engine assumes it will continue to be called from scheduled context and
//! stops probing for that unit. Reusing one wrapped unit across a long-lived
//! scheduled worker *and* an unrelated unscheduled call site breaks that
//! assumption: the unscheduled site will receive a pending handle it has no
//! scheduler to resolve. Give such call sites their own unit, or use
//! `WrappedUnit::reset_cache` in diagnostics.
//!
//! Cancellation, timeouts, and deadline propagation are deliberately the
//! caller's responsibility; dispatch never retries anything on its own.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core dispatch engine: probing, caching, classification, and the matrix.
pub mod core;
/// Configuration models for the offload pool.
pub mod config;
/// Worker-pool abstraction and the stock thread-backed pool.
pub mod pool;
/// Runtime adapters (tokio probe and blocking-pool adapter).
pub mod runtime;
/// Shared utilities.
pub mod util;
