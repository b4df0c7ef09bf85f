use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::object_store::ObjectStoreError;
use crate::AppState;

/// Serve blob content by storage key.
/// Route: GET /static/*name
pub async fn serve_static(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let data = state
        .gateway
        .object_store()
        .get(&name)
        .await
        .map_err(|e| match e {
            ObjectStoreError::NotFound(_) => ApiError::not_found("File not found"),
            _ => ApiError::internal(format!("Failed to retrieve file: {e}")),
        })?;

    let mime_type = mime_guess::from_path(&name).first_or_octet_stream();

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    if let Ok(value) = mime_type.as_ref().parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }

    let filename = name.rsplit('/').next().unwrap_or(&name);
    if let Ok(value) = format!("inline; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Names are never overwritten in place, only deleted and re-uploaded
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
