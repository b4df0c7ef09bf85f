//! Shared handle to a Supabase project.
//!
//! One `SupabaseClient` is created at startup and shared by the storage and
//! table backends. It owns the HTTP connection pool, the project endpoint, and
//! the access key sent on every request.

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;

use crate::config::SupabaseConfig;

pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

/// Error body shapes returned by Supabase services.
/// Storage sends `{statusCode, error, message}`, PostgREST `{code, message, details, hint}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, anyhow::Error> {
        let http = Client::builder().build()?;
        let base_url = Url::parse(&config.url)?;

        Ok(Self {
            http,
            base_url,
            api_key: config.anon_key.clone(),
        })
    }

    /// Absolute URL for a service path plus key-like segments.
    ///
    /// `path` is a fixed prefix such as `storage/v1/object`; each entry of
    /// `segments` may contain `/` and is percent-encoded piecewise.
    pub fn endpoint(&self, path: &str, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty();
            parts.extend(path.split('/').filter(|s| !s.is_empty()));
            for segment in segments {
                parts.extend(segment.split('/'));
            }
        }
        url
    }

    /// Start an authenticated request.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Pass through a successful response, otherwise extract the backend's message.
pub async fn check(resp: Response) -> Result<Response, String> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(error_message(status, &body))
}

pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.msg).or(b.error))
        .filter(|m| !m.is_empty());

    match parsed {
        Some(message) => message,
        None if body.trim().is_empty() => format!("Request failed with status {status}"),
        None => format!("Request failed with status {status}: {}", body.trim()),
    }
}
