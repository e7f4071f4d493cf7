//! Offload pool configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the stock thread-backed offload pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffloadPoolConfig {
    /// Number of dedicated worker threads.
    pub worker_count: usize,
    /// Maximum queued jobs before submissions are rejected.
    pub max_queue_depth: usize,
    /// Stack size for worker threads in bytes.
    pub thread_stack_size: usize,
}

impl Default for OffloadPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            max_queue_depth: 256,
            thread_stack_size: 2 * 1024 * 1024,
        }
    }
}

impl OffloadPoolConfig {
    /// Create a configuration with defaults (one worker per logical CPU).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the maximum queue depth.
    #[must_use]
    pub const fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.max_queue_depth == 0 {
            return Err("max_queue_depth must be greater than 0".into());
        }
        if self.thread_stack_size < 64 * 1024 {
            return Err("thread_stack_size must be at least 64 KiB".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a message for parse failures or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(OffloadPoolConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let cfg = OffloadPoolConfig::new().with_worker_count(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_queue_depth_is_invalid() {
        let cfg = OffloadPoolConfig::new().with_max_queue_depth(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tiny_stack_is_invalid() {
        let cfg = OffloadPoolConfig::new().with_thread_stack_size(1024);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let cfg = OffloadPoolConfig::new()
            .with_worker_count(4)
            .with_max_queue_depth(32);
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = OffloadPoolConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.worker_count, 4);
        assert_eq!(parsed.max_queue_depth, 32);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        let json = r#"{"worker_count":0,"max_queue_depth":32,"thread_stack_size":2097152}"#;
        assert!(OffloadPoolConfig::from_json_str(json).is_err());
    }
}
