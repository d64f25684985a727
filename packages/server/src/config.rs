//! Server configuration.

use std::time::Duration;

use thiserror::Error;

use crate::domain::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;
/// Longest accepted inbound line in bytes, terminator excluded
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;
/// Lines queued per connection before a non-reading peer is disconnected
pub const DEFAULT_OUTBOUND_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("history size must be at least 1")]
    ZeroHistoryCapacity,

    #[error("max connections must be at least 1")]
    ZeroMaxConnections,

    #[error("idle timeout must be at least 1 second")]
    ZeroIdleTimeout,

    #[error("max line length must be at least 1 byte")]
    ZeroMaxLineLength,

    #[error("outbound queue depth must be at least 1")]
    ZeroOutboundQueueDepth,
}

/// Validated server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port for chat connections
    pub port: u16,
    /// Port for the admin HTTP API; disabled when `None`
    pub admin_port: Option<u16>,
    /// Maximum number of history entries kept in memory
    pub history_capacity: usize,
    /// Maximum number of concurrent sessions
    pub max_connections: usize,
    /// Tell senders when a direct message could not be delivered
    pub notify_rejections: bool,
    /// Close sessions that send nothing for this long
    pub idle_timeout: Option<Duration>,
    /// Inbound lines longer than this are dropped
    pub max_line_length: usize,
    /// Outbound lines buffered per connection; a peer that falls this far behind is closed
    pub outbound_queue_depth: usize,
}

impl ServerConfig {
    /// Check the configuration for values the server cannot run with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroMaxConnections);
        }
        if self.idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::ZeroMaxLineLength);
        }
        if self.outbound_queue_depth == 0 {
            return Err(ConfigError::ZeroOutboundQueueDepth);
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn admin_addr(&self) -> Option<String> {
        self.admin_port
            .map(|port| format!("{}:{}", self.host, port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin_port: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            notify_rejections: false,
            idle_timeout: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            outbound_queue_depth: DEFAULT_OUTBOUND_QUEUE_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // テスト項目: 既定の設定は検証を通過する
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let result = config.clone().validate();

        // then (期待する結果):
        assert_eq!(result, Ok(config));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        // テスト項目: 0 を指定できない項目は検証エラーになる
        // given (前提条件):
        let zero_history = ServerConfig {
            history_capacity: 0,
            ..Default::default()
        };
        let zero_connections = ServerConfig {
            max_connections: 0,
            ..Default::default()
        };
        let zero_timeout = ServerConfig {
            idle_timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        let zero_line_length = ServerConfig {
            max_line_length: 0,
            ..Default::default()
        };
        let zero_queue_depth = ServerConfig {
            outbound_queue_depth: 0,
            ..Default::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            zero_history.validate(),
            Err(ConfigError::ZeroHistoryCapacity)
        );
        assert_eq!(
            zero_connections.validate(),
            Err(ConfigError::ZeroMaxConnections)
        );
        assert_eq!(zero_timeout.validate(), Err(ConfigError::ZeroIdleTimeout));
        assert_eq!(
            zero_line_length.validate(),
            Err(ConfigError::ZeroMaxLineLength)
        );
        assert_eq!(
            zero_queue_depth.validate(),
            Err(ConfigError::ZeroOutboundQueueDepth)
        );
    }

    #[test]
    fn test_addresses() {
        // テスト項目: バインドアドレスと管理 API アドレスが組み立てられる
        // given (前提条件):
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            admin_port: Some(9001),
            ..Default::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.admin_addr().as_deref(), Some("0.0.0.0:9001"));
        assert_eq!(ServerConfig::default().admin_addr(), None);
    }
}
