//! Configuration models for the offload pool.

pub mod offload;

pub use offload::OffloadPoolConfig;
