//! The File resource.
//!
//! A [`File`] mirrors a file stored by the API. It is created locally, optionally
//! populated with a name, content type and payload, and then either uploaded (the
//! server assigns `id` and `size`) or constructed from a known id to fetch its
//! metadata or download its content.
//!
//! # Example
//!
//! ```no_run
//! use integrations_nylas::NylasClient;
//!
//! # async fn example(client: NylasClient) -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = client
//!     .new_file()
//!     .with_filename("report.txt")
//!     .with_content_type("text/plain")
//!     .with_data("quarterly numbers");
//!
//! file.upload().await?;
//! println!("uploaded {:?} ({:?} bytes)", file.id(), file.size());
//!
//! let downloaded = file.download().await?;
//! println!("{}: {} bytes", downloaded.filename(), downloaded.body().len());
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::callback::notify;
use crate::connection::{Connection, ConnectionResponse, FormData, FormPart, RequestDescriptor};
use crate::errors::{NylasError, NylasResult};

/// Collection name of the files endpoint.
pub const COLLECTION_NAME: &str = "files";

/// File name reported for downloads without a usable `Content-Disposition`.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "filename";

/// Characters escaped in an id used as a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Wire representation of a file.
///
/// Every field is optional: a response only overwrites the attributes it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileJson {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Object type, `"file"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// File name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Messages the file is attached to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_ids: Option<Vec<String>>,
    /// Inline attachment identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// A file stored by the API, bound to the connection used to reach it.
#[derive(Clone)]
pub struct File {
    connection: Arc<dyn Connection>,
    id: Option<String>,
    // Set once hydration assigns the id; later answers cannot rebind it.
    id_from_server: bool,
    account_id: Option<String>,
    object: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
    data: Option<Bytes>,
    size: Option<u64>,
    message_ids: Vec<String>,
    content_id: Option<String>,
}

impl File {
    /// Creates an empty file bound to `connection`.
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            id: None,
            id_from_server: false,
            account_id: None,
            object: None,
            filename: None,
            content_type: None,
            data: None,
            size: None,
            message_ids: Vec::new(),
            content_id: None,
        }
    }

    /// Creates a handle to an existing file.
    pub fn from_id(connection: Arc<dyn Connection>, id: impl Into<String>) -> Self {
        let mut file = Self::new(connection);
        file.id = Some(id.into());
        file
    }

    /// Sets the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the inline attachment identifier.
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// Server-assigned identifier.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Owning account.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Object type.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    /// File name.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// MIME type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Payload to upload.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Messages the file is attached to.
    pub fn message_ids(&self) -> &[String] {
        &self.message_ids
    }

    /// Inline attachment identifier.
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    /// Returns the file with every attribute present in `json` applied.
    ///
    /// An id assigned by an earlier hydration is kept.
    pub fn hydrate(mut self, json: FileJson) -> Self {
        self.apply(json);
        self
    }

    fn apply(&mut self, json: FileJson) {
        let FileJson {
            id,
            account_id,
            object,
            filename,
            content_type,
            size,
            message_ids,
            content_id,
        } = json;

        if let Some(id) = id {
            if !self.id_from_server {
                self.id = Some(id);
                self.id_from_server = true;
            } else if self.id.as_deref() != Some(id.as_str()) {
                warn!(
                    file_id = self.id.as_deref().unwrap_or_default(),
                    ignored_id = %id,
                    "Ignoring id change for a server-assigned file"
                );
            }
        }
        if account_id.is_some() {
            self.account_id = account_id;
        }
        if object.is_some() {
            self.object = object;
        }
        if filename.is_some() {
            self.filename = filename;
        }
        if content_type.is_some() {
            self.content_type = content_type;
        }
        if size.is_some() {
            self.size = size;
        }
        if let Some(message_ids) = message_ids {
            self.message_ids = message_ids;
        }
        if content_id.is_some() {
            self.content_id = content_id;
        }
    }

    /// Wire representation of the current attributes. The payload is not included.
    pub fn to_json(&self) -> FileJson {
        FileJson {
            id: self.id.clone(),
            account_id: self.account_id.clone(),
            object: self.object.clone(),
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
            message_ids: Some(self.message_ids.clone()).filter(|ids| !ids.is_empty()),
            content_id: self.content_id.clone(),
        }
    }

    /// Uploads the payload and hydrates the file from the server's answer.
    ///
    /// Requires `filename`, `data` and `content_type`, checked in that order.
    ///
    /// # Errors
    ///
    /// - [`NylasError::MissingField`] for the first missing attribute, before any request
    /// - [`NylasError::EmptyUploadResult`] if the server lists no uploaded file
    /// - any error reported by the connection, unchanged
    pub async fn upload(&mut self) -> NylasResult<&Self> {
        let filename = non_empty(&self.filename)
            .ok_or_else(|| NylasError::missing_field("filename", "Please define a filename"))?;
        let data = self
            .data
            .clone()
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                NylasError::missing_field("data", "Please add some data to the file")
            })?;
        let content_type = non_empty(&self.content_type).ok_or_else(|| {
            NylasError::missing_field("content_type", "Please define a content-type")
        })?;

        debug!(filename = %filename, size = data.len(), "Uploading file");

        let form = FormData::new().part(
            "file",
            FormPart::new(data)
                .filename(filename)
                .content_type(content_type),
        );
        let descriptor = RequestDescriptor::post(format!("/{}", COLLECTION_NAME))
            .json(false)
            .form_data(form);

        let response = self.connection.request(descriptor).await?;
        let uploaded: Vec<FileJson> = response.json().await?;

        // One file per request, so the server lists exactly one entry.
        let Some(first) = uploaded.into_iter().next() else {
            warn!("Upload response listed no files");
            return Err(NylasError::EmptyUploadResult);
        };

        self.apply(first);
        info!(
            file_id = self.id.as_deref().unwrap_or_default(),
            size = ?self.size,
            "File uploaded"
        );

        Ok(self)
    }

    /// [`upload`](Self::upload), also reporting the outcome to `callback`.
    pub async fn upload_with_callback<F>(&mut self, callback: F) -> NylasResult<&Self>
    where
        F: FnOnce(Result<&File, &NylasError>),
    {
        let result = self.upload().await;
        callback(result.as_ref().map(|file| *file));
        result
    }

    /// Fetches the file's metadata as the server returns it.
    ///
    /// The response is neither filtered nor hydrated into the file.
    pub async fn metadata(&self) -> NylasResult<serde_json::Value> {
        let id = self.require_id()?;
        debug!(file_id = %id, "Fetching file metadata");

        let response = self
            .connection
            .request(RequestDescriptor::get(resource_path(id)))
            .await?;

        response.json().await
    }

    /// [`metadata`](Self::metadata), also reporting the outcome to `callback`.
    pub async fn metadata_with_callback<F>(&self, callback: F) -> NylasResult<serde_json::Value>
    where
        F: FnOnce(Result<&serde_json::Value, &NylasError>),
    {
        notify(self.metadata().await, callback)
    }

    /// Downloads the file content into memory.
    pub async fn download(&self) -> NylasResult<DownloadedFile> {
        let ConnectionResponse { headers, body, .. } = self.request_download().await?;
        let body = body.into_bytes().await?;

        let filename = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-disposition"))
            .and_then(|(_, value)| content_disposition_filename(value))
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string());

        debug!(filename = %filename, size = body.len(), "File downloaded");

        Ok(DownloadedFile {
            headers,
            body,
            filename,
        })
    }

    /// [`download`](Self::download), also reporting the outcome to `callback`.
    pub async fn download_with_callback<F>(&self, callback: F) -> NylasResult<DownloadedFile>
    where
        F: FnOnce(Result<&DownloadedFile, &NylasError>),
    {
        notify(self.download().await, callback)
    }

    /// Starts a download and returns the connection's response untouched, so the
    /// body can be consumed as a stream.
    ///
    /// With [`HttpConnection`](crate::HttpConnection) the request timeout bounds
    /// only the wait for the response head; reading the body is not limited.
    pub async fn readable_stream(&self) -> NylasResult<ConnectionResponse> {
        self.request_download().await
    }

    /// [`readable_stream`](Self::readable_stream), also reporting the outcome to
    /// `callback`.
    pub async fn readable_stream_with_callback<F>(
        &self,
        callback: F,
    ) -> NylasResult<ConnectionResponse>
    where
        F: FnOnce(Result<&ConnectionResponse, &NylasError>),
    {
        notify(self.readable_stream().await, callback)
    }

    async fn request_download(&self) -> NylasResult<ConnectionResponse> {
        let id = self.require_id()?;
        debug!(file_id = %id, "Downloading file");

        let descriptor = RequestDescriptor::get(format!("{}/download", resource_path(id)))
            .binary()
            .download_request(true);

        self.connection.request(descriptor).await
    }

    fn require_id(&self) -> NylasResult<&str> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| NylasError::missing_field("id", "Please provide a File id"))?;

        // Dot segments would be resolved away when joined onto the base URL.
        if id == "." || id == ".." {
            return Err(NylasError::InvalidId { id: id.to_string() });
        }

        Ok(id)
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("id", &self.id)
            .field("account_id", &self.account_id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("data", &self.data.as_ref().map(|d| format!("{} bytes", d.len())))
            .field("size", &self.size)
            .field("message_ids", &self.message_ids)
            .field("content_id", &self.content_id)
            .finish()
    }
}

/// Content of a downloaded file together with the response headers.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    headers: HashMap<String, String>,
    body: Bytes,
    filename: String,
}

impl DownloadedFile {
    /// Response headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// File content.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// File name from `Content-Disposition`, or [`DEFAULT_DOWNLOAD_FILENAME`].
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Consumes the download, returning the content.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

fn resource_path(id: &str) -> String {
    format!("/{}/{}", COLLECTION_NAME, utf8_percent_encode(id, PATH_SEGMENT))
}

/// Extracts the `filename=` parameter of a `Content-Disposition` header value.
fn content_disposition_filename(value: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new("filename=([^;]*)").expect("valid filename pattern"));

    pattern
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
