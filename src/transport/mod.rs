//! HTTP transport: a reqwest-backed [`Connection`].

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};
use reqwest::multipart::{Form, Part};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::NylasConfig;
use crate::connection::{
    ByteStream, Connection, ConnectionResponse, FormData, RequestDescriptor, ResponseEncoding,
};
use crate::errors::{ApiErrorResponse, NylasError, NylasResult};

/// [`Connection`] implementation on top of `reqwest`.
pub struct HttpConnection {
    client: reqwest::Client,
    config: NylasConfig,
}

impl HttpConnection {
    /// Creates a new connection from the configuration.
    ///
    /// `config.timeout` is applied per request. For downloads it bounds the wait
    /// for the response head only, so long streamed bodies are not cut off.
    pub fn new(config: NylasConfig) -> NylasResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                NylasError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new connection with a custom client.
    pub fn with_client(client: reqwest::Client, config: NylasConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NylasConfig {
        &self.config
    }

    fn build_form(form_data: FormData) -> NylasResult<Form> {
        let mut form = Form::new();

        for (name, part) in form_data.parts {
            let mut file_part = Part::bytes(part.value.to_vec());
            if let Some(filename) = part.options.filename {
                file_part = file_part.file_name(filename);
            }
            let content_type = part
                .options
                .content_type
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
            file_part = file_part.mime_str(&content_type).map_err(|e| NylasError::BadRequest {
                message: format!("Invalid content type '{}': {}", content_type, e),
                error_type: None,
            })?;
            form = form.part(name, file_part);
        }

        Ok(form)
    }

    /// Maps HTTP status codes to Nylas errors.
    fn map_http_error(status: u16, body: &Bytes, headers: &HashMap<String, String>) -> NylasError {
        let api_error: Option<ApiErrorResponse> = serde_json::from_slice(body).ok();

        let message = api_error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {} error", status));

        match status {
            400 => NylasError::BadRequest {
                message,
                error_type: api_error.and_then(|e| e.error_type),
            },
            401 => NylasError::Authentication { message },
            403 => NylasError::Permission { message },
            404 => NylasError::NotFound { message },
            429 => NylasError::RateLimit {
                message,
                retry_after: Self::extract_retry_after(headers),
            },
            500..=599 => NylasError::Server { status, message },
            _ => NylasError::Unknown {
                status,
                message,
                body: Some(String::from_utf8_lossy(body).to_string()),
            },
        }
    }

    fn extract_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Converts response headers to a map with lower-cased names.
    fn extract_headers(headers: &HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|val| (k.as_str().to_ascii_lowercase(), val.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn request(&self, descriptor: RequestDescriptor) -> NylasResult<ConnectionResponse> {
        let url = self.config.endpoint_url(&descriptor.path)?;

        debug!(
            method = ?descriptor.method,
            path = %descriptor.path,
            download = descriptor.download_request,
            "Sending request"
        );

        let mut request = self
            .client
            .request(descriptor.method.into(), url)
            .basic_auth(self.config.access_token(), Some(""))
            .header(USER_AGENT, &self.config.user_agent);

        if descriptor.json {
            request = request.header(ACCEPT, mime::APPLICATION_JSON.as_ref());
        }

        if let Some(form_data) = descriptor.form_data {
            request = request.multipart(Self::build_form(form_data)?);
        }

        let response = if descriptor.download_request {
            tokio::time::timeout(self.config.timeout, request.send())
                .await
                .map_err(|_| NylasError::Timeout {
                    message: format!("No response within {:?}", self.config.timeout),
                })??
        } else {
            request.timeout(self.config.timeout).send().await?
        };
        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        debug!(status = status, path = %descriptor.path, "Received response");

        if status >= 400 {
            let body = response.bytes().await?;
            let error = Self::map_http_error(status, &body, &headers);
            warn!(status = status, path = %descriptor.path, error = %error, "Request failed");
            return Err(error);
        }

        if descriptor.download_request {
            let stream = response.bytes_stream().map(|chunk| {
                chunk.map_err(|e| NylasError::Stream {
                    message: e.to_string(),
                })
            });
            return Ok(ConnectionResponse::streaming(
                status,
                headers,
                ByteStream::new(stream),
            ));
        }

        let body = response.bytes().await?;
        let body = match descriptor.encoding {
            Some(ResponseEncoding::Utf8) if std::str::from_utf8(&body).is_err() => {
                Bytes::from(String::from_utf8_lossy(&body).into_owned())
            }
            _ => body,
        };

        Ok(ConnectionResponse::new(status, headers, body))
    }
}
