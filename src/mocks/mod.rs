//! Mock implementations for testing.
//!
//! [`MockConnection`] records every [`RequestDescriptor`] it receives and answers
//! with queued responses, so resource behaviour can be tested without a server.
//!
//! # Example
//!
//! ```
//! use integrations_nylas::mocks::MockConnection;
//! use integrations_nylas::File;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let connection = Arc::new(MockConnection::new());
//! connection.enqueue_json(serde_json::json!({ "id": "file-1", "object": "file" }));
//!
//! let file = File::from_id(connection.clone(), "file-1");
//! let metadata = file.metadata().await.unwrap();
//!
//! assert_eq!(metadata["object"], "file");
//! assert_eq!(connection.last_request().unwrap().path, "/files/file-1");
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::{ByteStream, Connection, ConnectionResponse, RequestDescriptor};
use crate::errors::{NylasError, NylasResult};

/// Mock connection for testing.
#[derive(Default)]
pub struct MockConnection {
    responses: Arc<Mutex<VecDeque<NylasResult<ConnectionResponse>>>>,
    requests: Arc<Mutex<Vec<RequestDescriptor>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockConnection {
    /// Creates a new mock connection with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response or error for the next request.
    pub fn enqueue(&self, response: NylasResult<ConnectionResponse>) {
        lock(&self.responses).push_back(response);
    }

    /// Queues a 200 response with a JSON body.
    pub fn enqueue_json(&self, body: serde_json::Value) {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        self.enqueue(Ok(ConnectionResponse::new(200, headers, body.to_string())));
    }

    /// Queues a 200 response with the given headers and a buffered body.
    pub fn enqueue_download(
        &self,
        headers: impl IntoIterator<Item = (&'static str, &'static str)>,
        body: impl Into<Bytes>,
    ) {
        self.enqueue(Ok(ConnectionResponse::new(
            200,
            to_header_map(headers),
            body,
        )));
    }

    /// Queues a 200 response whose body streams the given chunks.
    pub fn enqueue_stream(
        &self,
        headers: impl IntoIterator<Item = (&'static str, &'static str)>,
        chunks: Vec<Bytes>,
    ) {
        let stream = ByteStream::new(stream::iter(chunks.into_iter().map(Ok)));
        self.enqueue(Ok(ConnectionResponse::streaming(
            200,
            to_header_map(headers),
            stream,
        )));
    }

    /// Queues an error for the next request.
    pub fn enqueue_error(&self, error: NylasError) {
        self.enqueue(Err(error));
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RequestDescriptor> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn to_header_map(
    headers: impl IntoIterator<Item = (&'static str, &'static str)>,
) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[async_trait]
impl Connection for MockConnection {
    async fn request(&self, descriptor: RequestDescriptor) -> NylasResult<ConnectionResponse> {
        lock(&self.requests).push(descriptor);

        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(NylasError::Connection {
                message: "No mock response configured".to_string(),
            })
        })
    }
}
