//! Timeout configuration for task-link client operations.
//!
//! Centralizes the timeouts applied to HTTP requests, WebSocket connection
//! establishment, and the subscription authentication handshake.

use std::time::Duration;

/// Timeout configuration for task-link client operations.
///
/// # Examples
///
/// ```rust
/// use task_link::TaskLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = TaskLinkTimeouts::default();
///
/// // Custom timeouts for high-latency environments
/// let timeouts = TaskLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(60))
///     .receive_timeout(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TaskLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for receiving a response after a request is sent.
    /// Default: 30 seconds
    pub receive_timeout: Duration,

    /// Timeout for the WebSocket authentication handshake.
    /// Default: 5 seconds
    pub auth_timeout: Duration,

    /// Keep-alive ping interval for WebSocket connections.
    /// Set to zero to disable keep-alive pings.
    /// Default: 20 seconds
    pub keepalive_interval: Duration,
}

impl Default for TaskLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            auth_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(20),
        }
    }
}

impl TaskLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> TaskLinkTimeoutsBuilder {
        TaskLinkTimeoutsBuilder::new()
    }

    /// Timeouts optimized for fast local development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            auth_timeout: Duration::from_secs(2),
            keepalive_interval: Duration::from_secs(15),
        }
    }

    /// Timeouts optimized for high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(120),
            auth_timeout: Duration::from_secs(15),
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

/// Builder for [`TaskLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct TaskLinkTimeoutsBuilder {
    timeouts: TaskLinkTimeouts,
}

impl TaskLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: TaskLinkTimeouts::default(),
        }
    }

    /// Set the connection establishment timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the response receive timeout.
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    /// Set the WebSocket authentication handshake timeout.
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.auth_timeout = timeout;
        self
    }

    /// Set the WebSocket keep-alive ping interval.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.timeouts.keepalive_interval = interval;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> TaskLinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let timeouts = TaskLinkTimeouts::builder()
            .connection_timeout(Duration::from_secs(1))
            .auth_timeout(Duration::from_secs(2))
            .build();
        assert_eq!(timeouts.connection_timeout, Duration::from_secs(1));
        assert_eq!(timeouts.auth_timeout, Duration::from_secs(2));
        // Untouched fields keep their defaults
        assert_eq!(timeouts.receive_timeout, Duration::from_secs(30));
    }

    #[test]
    fn presets_are_ordered() {
        let fast = TaskLinkTimeouts::fast();
        let relaxed = TaskLinkTimeouts::relaxed();
        assert!(fast.connection_timeout < relaxed.connection_timeout);
        assert!(fast.receive_timeout < relaxed.receive_timeout);
    }
}
