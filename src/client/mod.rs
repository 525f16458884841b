//! Nylas API client.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{NylasConfig, NylasConfigBuilder};
use crate::connection::Connection;
use crate::errors::NylasResult;
use crate::models::File;
use crate::transport::HttpConnection;

/// Nylas API client.
///
/// Owns the configuration and the connection every resource it creates is bound to.
pub struct NylasClient {
    config: NylasConfig,
    connection: Arc<dyn Connection>,
}

impl NylasClient {
    /// Creates a client that talks HTTP according to `config`.
    pub fn new(config: NylasConfig) -> NylasResult<Self> {
        let connection = Arc::new(HttpConnection::new(config.clone())?);
        Ok(Self { config, connection })
    }

    /// Creates a client using a caller-supplied connection.
    pub fn with_connection(config: NylasConfig, connection: Arc<dyn Connection>) -> Self {
        Self { config, connection }
    }

    /// Creates a client from the environment.
    pub fn from_env() -> NylasResult<Self> {
        Self::new(NylasConfig::from_env()?)
    }

    /// Creates a new client builder.
    pub fn builder() -> NylasClientBuilder {
        NylasClientBuilder::new()
    }

    /// Creates an empty file, ready to be populated and uploaded.
    pub fn new_file(&self) -> File {
        File::new(self.connection.clone())
    }

    /// Creates a handle to an existing file.
    pub fn file(&self, id: impl Into<String>) -> File {
        File::from_id(self.connection.clone(), id)
    }

    /// Returns the connection.
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &NylasConfig {
        &self.config
    }
}

/// Builder for [`NylasClient`].
#[derive(Default)]
pub struct NylasClientBuilder {
    config_builder: NylasConfigBuilder,
    connection: Option<Arc<dyn Connection>>,
}

impl NylasClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.access_token(token);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.connect_timeout(timeout);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Uses `connection` instead of an HTTP connection built from the configuration.
    pub fn connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Builds the client.
    pub fn build(self) -> NylasResult<NylasClient> {
        let config = self.config_builder.build()?;

        match self.connection {
            Some(connection) => Ok(NylasClient::with_connection(config, connection)),
            None => NylasClient::new(config),
        }
    }
}
