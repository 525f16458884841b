//! The connection contract between resources and the HTTP layer.
//!
//! Resources never talk HTTP themselves. They describe the request they need with a
//! [`RequestDescriptor`] and hand it to a [`Connection`], which performs the transport
//! and returns a [`ConnectionResponse`].

mod body;

pub use body::{ByteStream, ResponseBody};

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

use crate::errors::{NylasError, NylasResult};

/// Performs requests on behalf of resources.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Issues the described request and returns the raw response.
    async fn request(&self, descriptor: RequestDescriptor) -> NylasResult<ConnectionResponse>;
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// GET request.
    #[default]
    Get,
    /// POST request.
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// How the connection should treat the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseEncoding {
    /// Decode the body as UTF-8 text.
    Utf8,
}

/// Description of a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// API path, relative to the connection's base URL.
    pub path: String,
    /// Whether the response is expected to be JSON.
    pub json: bool,
    /// Multipart form body.
    pub form_data: Option<FormData>,
    /// Body encoding; `None` keeps the body as raw bytes.
    pub encoding: Option<ResponseEncoding>,
    /// Marks a download, which capable connections answer with a streamed body.
    pub download_request: bool,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            method: Method::Get,
            path: String::new(),
            json: true,
            form_data: None,
            encoding: Some(ResponseEncoding::Utf8),
            download_request: false,
        }
    }
}

impl RequestDescriptor {
    /// Creates a GET descriptor for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Creates a POST descriptor for `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets whether the response is expected to be JSON.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Attaches a multipart form body.
    pub fn form_data(mut self, form: FormData) -> Self {
        self.form_data = Some(form);
        self
    }

    /// Keeps the response body as raw bytes.
    pub fn binary(mut self) -> Self {
        self.encoding = None;
        self
    }

    /// Marks the request as a download.
    pub fn download_request(mut self, download: bool) -> Self {
        self.download_request = download;
        self
    }
}

/// Multipart form body, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    /// Form parts.
    pub parts: BTreeMap<String, FormPart>,
}

impl FormData {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named part.
    pub fn part(mut self, name: impl Into<String>, part: FormPart) -> Self {
        self.parts.insert(name.into(), part);
        self
    }

    /// Looks up a part by name.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.get(name)
    }
}

/// A single multipart form part.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    /// Part payload.
    pub value: Bytes,
    /// Part metadata.
    pub options: PartOptions,
}

/// Metadata for a multipart form part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartOptions {
    /// File name sent in the part's `Content-Disposition`.
    pub filename: Option<String>,
    /// Part MIME type.
    pub content_type: Option<String>,
}

impl FormPart {
    /// Creates a part carrying `value`.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            options: PartOptions::default(),
        }
    }

    /// Sets the part file name.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.options.filename = Some(filename.into());
        self
    }

    /// Sets the part MIME type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.options.content_type = Some(content_type.into());
        self
    }
}

/// Response returned by a [`Connection`].
#[derive(Debug)]
pub struct ConnectionResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lower-cased.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: ResponseBody,
}

impl ConnectionResponse {
    /// Creates a response with a buffered body.
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Bytes(body.into()),
        }
    }

    /// Creates a response whose body is a stream.
    pub fn streaming(status: u16, headers: HashMap<String, String>, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Stream(body),
        }
    }

    /// Looks up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Buffers the body and decodes it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> NylasResult<T> {
        let body = self.body.into_bytes().await?;

        serde_json::from_slice(&body).map_err(|e| NylasError::Deserialization {
            message: e.to_string(),
            body: String::from_utf8_lossy(&body).to_string(),
        })
    }
}
