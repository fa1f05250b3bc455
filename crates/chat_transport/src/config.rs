use std::time::Duration;

use crate::url::DEFAULT_BASE_URL;

/// Delay before reconnecting after the channel closes.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
/// Delay before connecting a freshly reset session.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(100);

/// Transport configuration shared by the socket and the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Backend origin; `http(s)` is rewritten to `ws(s)` for the channel.
    pub base_url: String,
    /// Optional request timeout for HTTP fetches.
    pub timeout: Option<Duration>,
    /// Optional `User-Agent` override for HTTP fetches.
    pub user_agent: Option<String>,
    pub reconnect_delay: Duration,
    pub reset_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_expectations() {
        let config = TransportConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.reset_delay, Duration::from_millis(100));
        assert!(config.timeout.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = TransportConfig::new("https://chat.example.test")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("agent-chat/0.1")
            .with_reconnect_delay(Duration::from_millis(10))
            .with_reset_delay(Duration::from_millis(1));
        assert_eq!(config.base_url, "https://chat.example.test");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent.as_deref(), Some("agent-chat/0.1"));
        assert_eq!(config.reconnect_delay, Duration::from_millis(10));
        assert_eq!(config.reset_delay, Duration::from_millis(1));
    }
}
