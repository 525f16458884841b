//! Integration tests for the File resource.

use bytes::Bytes;
use futures::StreamExt;
use integrations_nylas::connection::{FormData, FormPart, Method, RequestDescriptor};
use integrations_nylas::mocks::MockConnection;
use integrations_nylas::{File, NylasError};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

/// Helper to create a populated file bound to a mock connection.
fn sample_file(connection: &Arc<MockConnection>) -> File {
    File::from_id(connection.clone(), "fileId")
        .with_data("Sample data")
        .with_content_type("text/plain")
        .with_filename("sample.txt")
}

fn network_error() -> NylasError {
    NylasError::Connection {
        message: "Network error".to_string(),
    }
}

// ============================================================================
// upload
// ============================================================================

#[tokio::test]
async fn test_upload_issues_multipart_post() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([{ "id": "id-1234" }]));
    let mut file = sample_file(&connection);

    file.upload().await.unwrap();

    let expected = RequestDescriptor {
        method: Method::Post,
        path: "/files".to_string(),
        json: false,
        form_data: Some(
            FormData::new().part(
                "file",
                FormPart::new("Sample data")
                    .filename("sample.txt")
                    .content_type("text/plain"),
            ),
        ),
        ..Default::default()
    };
    assert_eq!(connection.requests(), vec![expected]);
}

#[tokio::test]
async fn test_upload_hydrates_file_in_place() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([
        { "id": "id-1234", "filename": "renamed.txt", "size": 11, "message_ids": ["m-1"] }
    ]));
    let mut file = File::new(connection.clone())
        .with_data("Sample data")
        .with_content_type("text/plain")
        .with_filename("sample.txt");

    let uploaded = file.upload().await.unwrap();
    assert_eq!(uploaded.id(), Some("id-1234"));
    assert_eq!(uploaded.filename(), Some("renamed.txt"));

    assert_eq!(file.id(), Some("id-1234"));
    assert_eq!(file.filename(), Some("renamed.txt"));
    assert_eq!(file.size(), Some(11));
    assert_eq!(file.message_ids().to_vec(), vec!["m-1".to_string()]);
    assert_eq!(file.content_type(), Some("text/plain"));
}

#[tokio::test]
async fn test_upload_uses_first_entry_only() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([
        { "id": "first", "filename": "sample.txt" },
        { "id": "second", "filename": "other.txt" }
    ]));
    let mut file = sample_file(&connection);

    file.upload().await.unwrap();

    assert_eq!(file.id(), Some("first"));
}

#[tokio::test]
async fn test_upload_callback_receives_file() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([{ "id": "id-1234", "filename": "sample.txt" }]));
    let mut file = sample_file(&connection);

    let mut seen = None;
    let result = file
        .upload_with_callback(|result| {
            let file = result.expect("callback should see success");
            seen = Some((file.id().map(str::to_owned), file.filename().map(str::to_owned)));
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(
        seen,
        Some((Some("id-1234".to_string()), Some("sample.txt".to_string())))
    );
}

#[tokio::test]
async fn test_upload_empty_result_leaves_file_unchanged() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([]));
    let mut file = File::new(connection.clone())
        .with_data("Sample data")
        .with_content_type("text/plain")
        .with_filename("sample.txt");
    let before = file.to_json();

    let result = file.upload().await;

    assert!(matches!(result, Err(NylasError::EmptyUploadResult)));
    assert_eq!(file.to_json(), before);
    assert_eq!(file.id(), None);
}

#[tokio::test]
async fn test_upload_error_reaches_result_and_callback() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_error(network_error());
    let mut file = sample_file(&connection);

    let mut callback_error = None;
    let result = file
        .upload_with_callback(|result| callback_error = result.err().map(ToString::to_string))
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, NylasError::Connection { .. }));
    assert_eq!(callback_error, Some(error.to_string()));
}

#[tokio::test]
async fn test_upload_without_filename_never_reaches_connection() {
    let connection = Arc::new(MockConnection::new());
    let mut file = File::new(connection.clone())
        .with_data("Sample data")
        .with_content_type("text/plain");

    let result = file.upload().await;

    assert!(matches!(
        result,
        Err(NylasError::MissingField {
            field: "filename",
            ..
        })
    ));
    assert_eq!(connection.request_count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_malformed_response() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!({ "id": "not-a-list" }));
    let mut file = sample_file(&connection);

    let result = file.upload().await;

    assert!(matches!(result, Err(NylasError::Deserialization { .. })));
    assert_eq!(file.id(), Some("fileId"));
}

// ============================================================================
// download
// ============================================================================

#[tokio::test]
async fn test_download_issues_binary_get() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_download([("content-length", "4")], "body");
    let file = sample_file(&connection);

    file.download().await.unwrap();

    let expected = RequestDescriptor::get("/files/fileId/download")
        .binary()
        .download_request(true);
    assert_eq!(connection.last_request(), Some(expected));
    assert_eq!(connection.last_request().unwrap().encoding, None);
}

#[tokio::test]
async fn test_download_merges_headers_and_body() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_download([("header1", "1"), ("header2", "2")], "body");
    let file = sample_file(&connection);

    let downloaded = file.download().await.unwrap();

    let expected: HashMap<String, String> = [("header1", "1"), ("header2", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(downloaded.headers(), &expected);
    assert_eq!(downloaded.body(), &Bytes::from("body"));
    assert_eq!(downloaded.filename(), "filename");
}

#[tokio::test]
async fn test_download_buffers_streamed_body() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_stream(
        [("content-disposition", "attachment; filename=notes.txt; size=11")],
        vec![Bytes::from("Sample "), Bytes::from("data")],
    );
    let file = sample_file(&connection);

    let downloaded = file.download().await.unwrap();

    assert_eq!(downloaded.body(), &Bytes::from("Sample data"));
    assert_eq!(downloaded.filename(), "notes.txt");
    assert_eq!(
        downloaded.header("Content-Disposition"),
        Some("attachment; filename=notes.txt; size=11")
    );
}

#[tokio::test]
async fn test_download_callback_receives_file() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_download([("header1", "1")], "body");
    let file = sample_file(&connection);

    let mut seen_body = None;
    let result = file
        .download_with_callback(|result| seen_body = result.ok().map(|f| f.body().clone()))
        .await;

    assert_eq!(seen_body, Some(Bytes::from("body")));
    assert_eq!(result.unwrap().header("header1"), Some("1"));
}

#[tokio::test]
async fn test_download_error_reaches_result_and_callback() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_error(network_error());
    let file = sample_file(&connection);

    let mut callback_error = None;
    let result = file
        .download_with_callback(|result| callback_error = result.err().map(ToString::to_string))
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, NylasError::Connection { .. }));
    assert_eq!(callback_error, Some(error.to_string()));
}

#[tokio::test]
async fn test_download_without_id_never_reaches_connection() {
    let connection = Arc::new(MockConnection::new());
    let file = File::new(connection.clone());

    let mut callback_called = false;
    let result = file.download_with_callback(|_| callback_called = true).await;

    assert!(matches!(
        result,
        Err(NylasError::MissingField { field: "id", .. })
    ));
    assert!(callback_called);
    assert_eq!(connection.request_count(), 0);
}

// ============================================================================
// readable_stream
// ============================================================================

#[tokio::test]
async fn test_readable_stream_passes_response_through() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_stream(
        [("content-type", "application/pdf")],
        vec![Bytes::from("%PDF"), Bytes::from("-1.7")],
    );
    let file = sample_file(&connection);

    let response = file.readable_stream().await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert!(response.body.is_stream());

    let chunks: Vec<Bytes> = response
        .body
        .into_stream()
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;
    assert_eq!(chunks, vec![Bytes::from("%PDF"), Bytes::from("-1.7")]);

    let expected = RequestDescriptor::get("/files/fileId/download")
        .binary()
        .download_request(true);
    assert_eq!(connection.last_request(), Some(expected));
}

#[tokio::test]
async fn test_readable_stream_error_reaches_result_and_callback() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_error(network_error());
    let file = sample_file(&connection);

    let mut callback_error = None;
    let result = file
        .readable_stream_with_callback(|result| {
            callback_error = result.err().map(ToString::to_string)
        })
        .await;

    let error = result.unwrap_err();
    assert_eq!(callback_error, Some(error.to_string()));
}

// ============================================================================
// metadata
// ============================================================================

fn metadata_json() -> serde_json::Value {
    serde_json::json!({
        "content_type": "image/jpeg",
        "filename": "sailing_photo.jpg",
        "id": "dyla86usnzouam5wt7wt2bsvu",
        "message_ids": ["cud32592sewzy834bzhsbu0kt"],
        "account_id": "6aakaxzi4j5gn6f7kbb9e0fxs",
        "object": "file",
        "size": 8380
    })
}

#[tokio::test]
async fn test_metadata_issues_get() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(metadata_json());
    let file = sample_file(&connection);

    file.metadata().await.unwrap();

    assert_eq!(
        connection.last_request(),
        Some(RequestDescriptor::get("/files/fileId"))
    );
}

#[tokio::test]
async fn test_metadata_returns_response_unmodified() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(metadata_json());
    let file = sample_file(&connection);

    let metadata = file.metadata().await.unwrap();

    assert_eq!(metadata, metadata_json());
    // Metadata is not hydrated into the file.
    assert_eq!(file.filename(), Some("sample.txt"));
    assert_eq!(file.size(), None);
}

#[tokio::test]
async fn test_metadata_callback_receives_response() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(metadata_json());
    let file = sample_file(&connection);

    let mut seen = None;
    let result = file
        .metadata_with_callback(|result| seen = result.ok().cloned())
        .await;

    assert_eq!(seen, Some(metadata_json()));
    assert_eq!(result.unwrap(), metadata_json());
}

#[tokio::test]
async fn test_metadata_error_reaches_result_and_callback() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_error(network_error());
    let file = sample_file(&connection);

    let mut callback_error = None;
    let result = file
        .metadata_with_callback(|result| callback_error = result.err().map(ToString::to_string))
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, NylasError::Connection { .. }));
    assert_eq!(callback_error, Some(error.to_string()));
}

// ============================================================================
// Repeated calls
// ============================================================================

#[tokio::test]
async fn test_failure_then_success_does_not_leak_state() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_error(network_error());
    connection.enqueue_json(serde_json::json!([{ "id": "id-1234", "size": 11 }]));
    let mut file = File::new(connection.clone())
        .with_data("Sample data")
        .with_content_type("text/plain")
        .with_filename("sample.txt");

    assert!(file.upload().await.is_err());
    assert_eq!(file.id(), None);

    file.upload().await.unwrap();
    assert_eq!(file.id(), Some("id-1234"));
    assert_eq!(file.size(), Some(11));
    assert_eq!(connection.request_count(), 2);
}

#[tokio::test]
async fn test_second_upload_keeps_server_assigned_id() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([{ "id": "server-A", "size": 11 }]));
    connection.enqueue_json(serde_json::json!([{ "id": "server-B", "size": 12 }]));
    let mut file = File::new(connection.clone())
        .with_data("Sample data")
        .with_content_type("text/plain")
        .with_filename("sample.txt");

    file.upload().await.unwrap();
    file.upload().await.unwrap();

    assert_eq!(file.id(), Some("server-A"));
    assert_eq!(file.size(), Some(12));
    assert_eq!(connection.request_count(), 2);
}

#[tokio::test]
async fn test_success_then_failure_keeps_hydrated_attributes() {
    let connection = Arc::new(MockConnection::new());
    connection.enqueue_json(serde_json::json!([{ "id": "id-1234", "size": 11 }]));
    connection.enqueue_error(network_error());
    let mut file = sample_file(&connection);

    file.upload().await.unwrap();
    let metadata = file.metadata().await;

    assert!(metadata.is_err());
    assert_eq!(file.id(), Some("id-1234"));
    assert_eq!(file.size(), Some(11));
    assert_eq!(
        connection.last_request().map(|r| r.path),
        Some("/files/id-1234".to_string())
    );
}
