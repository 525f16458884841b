//! Response bodies, buffered or streamed.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::errors::NylasResult;

/// Byte stream for streaming responses.
#[pin_project]
pub struct ByteStream {
    #[pin]
    inner: Pin<Box<dyn Stream<Item = NylasResult<Bytes>> + Send>>,
}

impl ByteStream {
    /// Creates a new byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = NylasResult<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Creates a stream yielding `bytes` as a single chunk.
    pub fn once(bytes: Bytes) -> Self {
        Self::new(stream::once(async move { Ok(bytes) }))
    }
}

impl Stream for ByteStream {
    type Item = NylasResult<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        this.inner.poll_next(cx)
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteStream")
    }
}

/// Body of a [`ConnectionResponse`](super::ConnectionResponse).
pub enum ResponseBody {
    /// Fully buffered body.
    Bytes(Bytes),
    /// Body still being received.
    Stream(ByteStream),
}

impl ResponseBody {
    /// Returns true if the body is a live stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, ResponseBody::Stream(_))
    }

    /// Buffers the whole body.
    pub async fn into_bytes(self) -> NylasResult<Bytes> {
        match self {
            ResponseBody::Bytes(bytes) => Ok(bytes),
            ResponseBody::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                Ok(buffer.freeze())
            }
        }
    }

    /// Converts the body into a stream of chunks.
    pub fn into_stream(self) -> ByteStream {
        match self {
            ResponseBody::Bytes(bytes) => ByteStream::once(bytes),
            ResponseBody::Stream(stream) => stream,
        }
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ResponseBody::Stream(_) => write!(f, "Stream"),
        }
    }
}
