//! Configuration for the Nylas client.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{NylasError, NylasResult};

/// Default API server.
pub const DEFAULT_BASE_URL: &str = "https://api.nylas.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Nylas client.
#[derive(Clone)]
pub struct NylasConfig {
    /// Account access token.
    pub(crate) access_token: SecretString,
    /// Base URL for API requests.
    pub base_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl NylasConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> NylasConfigBuilder {
        NylasConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NYLAS_ACCESS_TOKEN` (required): account access token
    /// - `NYLAS_API_SERVER` (optional): custom API server
    /// - `NYLAS_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> NylasResult<Self> {
        let access_token = std::env::var("NYLAS_ACCESS_TOKEN").map_err(|_| {
            NylasError::configuration("NYLAS_ACCESS_TOKEN environment variable not set")
        })?;

        let mut builder = NylasConfigBuilder::new().access_token(access_token);

        if let Ok(api_server) = std::env::var("NYLAS_API_SERVER") {
            builder = builder.base_url(api_server);
        }

        if let Ok(timeout) = std::env::var("NYLAS_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|_| {
                NylasError::configuration(format!("Invalid NYLAS_TIMEOUT value: {}", timeout))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the access token.
    pub(crate) fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Resolves an API path against the base URL.
    pub fn endpoint_url(&self, path: &str) -> NylasResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> NylasResult<()> {
        if self.access_token.expose_secret().is_empty() {
            return Err(NylasError::configuration("Access token must not be empty"));
        }

        match self.base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(NylasError::configuration(format!(
                    "Unsupported base URL scheme: {}",
                    scheme
                )))
            }
        }

        if self.timeout.is_zero() {
            return Err(NylasError::configuration("Timeout must be greater than zero"));
        }

        Ok(())
    }
}

impl std::fmt::Debug for NylasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NylasConfig")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for [`NylasConfig`].
#[derive(Default)]
pub struct NylasConfigBuilder {
    access_token: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl NylasConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> NylasResult<NylasConfig> {
        let access_token = self
            .access_token
            .ok_or_else(|| NylasError::configuration("Access token is required"))?;

        // A trailing slash keeps any path prefix of the base URL when joining.
        let mut base = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("integrations-nylas/{}", env!("CARGO_PKG_VERSION")));

        let config = NylasConfig {
            access_token: SecretString::new(access_token),
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent,
        };

        config.validate()?;

        Ok(config)
    }
}
