//! Client configuration.

use std::time::Duration;

use crate::types::ApiUrl;

/// Default timeout applied to every request, including the refresh call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("bistro/", env!("CARGO_PKG_VERSION"));

/// Settings for an API session.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bistro_core::{ApiUrl, ClientConfig};
///
/// let config = ClientConfig::new(ApiUrl::new("https://pos.example.com").unwrap())
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL that endpoint paths are appended to.
    pub api_url: ApiUrl,
    /// Per-request timeout. A refresh that times out counts as rejected.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
