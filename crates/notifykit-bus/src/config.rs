//! Bus configuration.
//!
//! [`BusConfig`] is plain data with serde support so it can live in an
//! application settings file. Sentinel values are resolved by accessors:
//! - `slow_handler_warn_ms = 0` → no slow-handler warnings
//! - `stream_buffer = 0` → clamped to 1

use std::time::Duration;

use notifykit_core::{NotifyError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for one bus instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Name of the delivery queue worker thread.
    pub worker_thread_name: String,
    /// Default buffer size of message streams.
    pub stream_buffer: usize,
    /// Inline handlers running longer than this many milliseconds are logged
    /// at `warn`. `0` disables the check.
    pub slow_handler_warn_ms: u64,
}

impl BusConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BusConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the bus cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.worker_thread_name.trim().is_empty() {
            return Err(NotifyError::InvalidConfig {
                reason: "worker_thread_name must not be empty".to_string(),
            });
        }
        if self.worker_thread_name.contains('\0') {
            return Err(NotifyError::InvalidConfig {
                reason: "worker_thread_name must not contain NUL".to_string(),
            });
        }
        Ok(())
    }

    /// Slow inline handler threshold as an `Option`.
    #[inline]
    pub fn slow_handler_threshold(&self) -> Option<Duration> {
        if self.slow_handler_warn_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.slow_handler_warn_ms))
        }
    }

    /// Stream buffer size clamped to a minimum of 1.
    #[inline]
    pub fn stream_buffer_clamped(&self) -> usize {
        self.stream_buffer.max(1)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            worker_thread_name: "notifykit-delivery".to_string(),
            stream_buffer: 10,
            slow_handler_warn_ms: 250,
        }
    }
}
