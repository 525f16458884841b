//! Nylas File API Client
//!
//! A type-safe client for the File resource of the Nylas email platform API:
//! upload attachments, download them back (buffered or streamed) and fetch
//! their metadata.
//!
//! # Features
//!
//! - **Upload**: multipart upload with hydration from the server's answer
//! - **Download**: buffered downloads with the file name taken from `Content-Disposition`
//! - **Streaming**: raw responses whose body can be consumed chunk by chunk
//! - **Metadata**: the server's JSON description of a file, untouched
//! - **Pluggable transport**: every request goes through the [`Connection`] trait
//!
//! # Example
//!
//! ```no_run
//! use integrations_nylas::NylasClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NylasClient::builder()
//!     .access_token("access-token")
//!     .build()?;
//!
//! let metadata = client.file("dyla86usnzouam5wt7wt2bsvu").metadata().await?;
//! println!("{}", metadata["filename"]);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod callback;
pub mod client;
pub mod config;
pub mod connection;
pub mod errors;
pub mod models;
pub mod transport;

// Always available so integration tests can drive resources without a server.
pub mod mocks;

// Re-exports for convenience
pub use client::{NylasClient, NylasClientBuilder};
pub use config::{NylasConfig, NylasConfigBuilder};
pub use connection::{
    ByteStream, Connection, ConnectionResponse, FormData, FormPart, Method, RequestDescriptor,
    ResponseBody, ResponseEncoding,
};
pub use errors::{NylasError, NylasResult};
pub use models::{DownloadedFile, File, FileJson};
pub use transport::HttpConnection;
