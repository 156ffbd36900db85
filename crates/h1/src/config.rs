//! Connection configuration.
//!
//! Every limit has a default, so `ConnectionConfig::default()` is a usable
//! production setting. The configuration also deserializes with `serde`;
//! missing fields fall back to their defaults:
//!
//! ```
//! use micro_h1::config::ConnectionConfig;
//!
//! let config = ConnectionConfig::default().with_max_header_count(100);
//! assert_eq!(config.limits.max_header_count, 100);
//! assert_eq!(config.limits.max_request_line_length, 10_000);
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_MAX_REQUEST_LINE_LENGTH: usize = 10_000;
pub const DEFAULT_MAX_HEADER_LENGTH: usize = 10_000;
pub const DEFAULT_MAX_HEADER_COUNT: usize = 50;
pub const DEFAULT_READ_LENGTH: usize = 1_000_000;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LENGTH: usize = 8_000_000;

/// Limits applied while parsing the request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeaderLimits {
    /// Longest accepted request line, excluding CRLF
    pub max_request_line_length: usize,
    /// Longest accepted header line, excluding CRLF; also bounds chunk-size and trailer lines
    pub max_header_length: usize,
    /// Most header fields accepted in one request
    pub max_header_count: usize,
}

impl Default for HeaderLimits {
    fn default() -> Self {
        Self {
            max_request_line_length: DEFAULT_MAX_REQUEST_LINE_LENGTH,
            max_header_length: DEFAULT_MAX_HEADER_LENGTH,
            max_header_count: DEFAULT_MAX_HEADER_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    #[serde(flatten)]
    pub limits: HeaderLimits,
    /// Most bytes requested from the transport per read, at least 1
    #[serde(deserialize_with = "deserialize_at_least_one")]
    pub read_length: usize,
    /// How long a single transport read may wait
    #[serde(rename = "read_timeout_ms", deserialize_with = "deserialize_millis")]
    pub read_timeout: Duration,
    /// Default for the most body bytes returned by one body read, at least 1
    #[serde(deserialize_with = "deserialize_at_least_one")]
    pub length: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            limits: HeaderLimits::default(),
            read_length: DEFAULT_READ_LENGTH,
            read_timeout: DEFAULT_READ_TIMEOUT,
            length: DEFAULT_LENGTH,
        }
    }
}

impl ConnectionConfig {
    pub fn with_max_request_line_length(mut self, max: usize) -> Self {
        self.limits.max_request_line_length = max;
        self
    }

    pub fn with_max_header_length(mut self, max: usize) -> Self {
        self.limits.max_header_length = max;
        self
    }

    pub fn with_max_header_count(mut self, max: usize) -> Self {
        self.limits.max_header_count = max;
        self
    }

    pub fn with_read_length(mut self, read_length: usize) -> Self {
        self.read_length = read_length.max(1);
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }
}

fn deserialize_at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    usize::deserialize(deserializer).map(|n| n.max(1))
}

fn deserialize_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
