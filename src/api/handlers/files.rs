use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

use crate::api::response::{envelope_response, ApiError};
use crate::gateway::{validate_file_name, Envelope, FilePayload};
use crate::AppState;

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let mut file_data: Option<Bytes> = None;
    let mut original_name: Option<String> = None;
    let mut file_content_type: Option<String> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(e.status(), format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                original_name = field.file_name().map(|s| s.to_string());
                file_content_type = field.content_type().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError(e.status(), format!("Failed to read file: {e}")))?;

                if data.len() as u64 > state.config.server.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.server.max_upload_size
                    )));
                }

                file_data = Some(data);
            }
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid name: {e}")))?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;

    let file_name = match name {
        Some(n) if n.trim().is_empty() => {
            return Err(ApiError::bad_request("name must not be empty"));
        }
        Some(n) => n.trim().to_string(),
        None => default_file_name(original_name.as_deref()),
    };
    validate_file_name(&file_name).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mime_type = file_content_type
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| {
            original_name
                .as_deref()
                .or(Some(file_name.as_str()))
                .and_then(|n| mime_guess::from_path(n).first())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let envelope = state
        .gateway
        .upload_file(FilePayload::new(file_data, mime_type), &file_name)
        .await;

    Ok(envelope_response(envelope))
}

pub async fn list_files(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Envelope>) {
    envelope_response(state.gateway.get_files().await)
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    validate_file_name(&name).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(envelope_response(state.gateway.delete_file(&name).await))
}

// ============================================================================
// Helpers
// ============================================================================

/// Storage key for an upload that did not name itself: the client's file
/// name behind a millisecond timestamp, or a UUID when there is none.
fn default_file_name(original: Option<&str>) -> String {
    let base = original
        .map(|n| n.rsplit(['/', '\\']).next().unwrap_or(n).trim())
        .filter(|n| !n.is_empty());

    match base {
        Some(base) => format!("{}_{base}", Utc::now().timestamp_millis()),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::object_store::ObjectStoreError;
    use crate::testutil::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-GATEWAY-TEST-BOUNDARY";

    fn multipart_body(file_name: &str, content_type: &str, data: &str, name: Option<&str>) -> String {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{data}\r\n"
        );
        if let Some(name) = name {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn upload_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/files")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app
            .clone()
            .oneshot(upload_request(multipart_body(
                "hello.txt",
                "text/plain",
                "hello world",
                Some("greetings/hello.txt"),
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(
            body["url"],
            "http://localhost:8080/static/greetings/hello.txt"
        );

        let resp = app
            .oneshot(Request::get("/files").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "greetings/hello.txt");
        assert_eq!(data[0]["size"], 11);
        assert_eq!(data[0]["type"], "text/plain");
    }

    #[tokio::test]
    async fn test_upload_without_name_uses_timestamped_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let resp = app
            .oneshot(upload_request(multipart_body(
                "photo.png",
                "application/octet-stream",
                "png-bytes",
                None,
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let files = state.gateway.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].name.ends_with("_photo.png"));
        // Generic content type is replaced by a guess from the file name
        assert_eq!(files[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_duplicate_name_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let body = multipart_body("a.txt", "text/plain", "one", Some("a.txt"));
        let resp = app.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = multipart_body("a.txt", "text/plain", "two", Some("a.txt"));
        let resp = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "The resource already exists");
    }

    #[tokio::test]
    async fn test_upload_missing_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nx.txt\r\n--{BOUNDARY}--\r\n"
        );
        let resp = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "file field is required");
    }

    #[tokio::test]
    async fn test_delete_removes_nested_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let body = multipart_body("a.txt", "text/plain", "data", Some("docs/a.txt"));
        let resp = app.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(
                Request::delete("/files/docs/a.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, serde_json::json!({ "success": true }));

        assert!(state.gateway.list().await.unwrap().is_empty());
        assert!(matches!(
            state.gateway.object_store().get("docs/a.txt").await,
            Err(ObjectStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let oversized = "x".repeat(10 * 1024 * 1024 + 200 * 1024);
        let body = multipart_body("big.bin", "application/octet-stream", &oversized, None);
        let resp = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert!(state.gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_dot_segments_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let body = multipart_body("b.txt", "text/plain", "data", Some("x/../b.txt"));
        let resp = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"], "Invalid file name: \"x/../b.txt\"");
        assert!(state.gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_empty_segment_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app
            .oneshot(Request::delete("/files/docs//a.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_default_file_name() {
        let name = default_file_name(Some("C:\\Users\\me\\report.pdf"));
        assert!(name.ends_with("_report.pdf"));

        let name = default_file_name(None);
        assert!(uuid::Uuid::parse_str(&name).is_ok());
    }
}
