//! Runtime adapters: the tokio context probe and blocking-pool adapter.

pub mod probe;
pub mod tokio_pool;

pub use probe::TokioContextProbe;
pub use tokio_pool::TokioBlockingPool;
