//! Fluent construction of a [`Bus`].
//!
//! ```
//! use std::time::Duration;
//! use notifykit_bus::Bus;
//!
//! let bus = Bus::builder()
//!     .worker_thread_name("ui-events")
//!     .stream_buffer(32)
//!     .slow_handler_warn(Duration::from_millis(50))
//!     .build();
//! assert_eq!(bus.config().stream_buffer, 32);
//! ```

use std::time::Duration;

use crate::bus::Bus;
use crate::config::BusConfig;

/// Builder for [`Bus`].
#[derive(Debug, Clone, Default)]
pub struct BusBuilder {
    config: BusConfig,
}

impl BusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the delivery queue worker thread.
    pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_thread_name = name.into();
        self
    }

    /// Default buffer of message streams.
    pub fn stream_buffer(mut self, size: usize) -> Self {
        self.config.stream_buffer = size;
        self
    }

    /// Warn about inline handlers slower than `threshold`.
    /// `Duration::ZERO` disables the warning.
    pub fn slow_handler_warn(mut self, threshold: Duration) -> Self {
        self.config.slow_handler_warn_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn build(self) -> Bus {
        Bus::with_config(self.config)
    }
}
