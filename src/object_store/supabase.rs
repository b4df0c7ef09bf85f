use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, StatusCode};

use super::{ObjectStore, ObjectStoreError};
use crate::supabase::{check, SupabaseClient};

/// Supabase Storage bucket backend.
pub struct SupabaseStorage {
    bucket: String,
    client: Arc<SupabaseClient>,
}

impl SupabaseStorage {
    pub fn new(client: Arc<SupabaseClient>, bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            client,
        }
    }

    fn upload_request(&self, key: &str, data: Bytes, content_type: &str) -> RequestBuilder {
        let url = self
            .client
            .endpoint("storage/v1/object", &[self.bucket.as_str(), key]);
        self.client
            .request(Method::POST, url)
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(data)
    }

    fn download_request(&self, key: &str) -> RequestBuilder {
        let url = self
            .client
            .endpoint("storage/v1/object", &[self.bucket.as_str(), key]);
        self.client.request(Method::GET, url)
    }

    fn remove_request(&self, keys: &[&str]) -> RequestBuilder {
        let url = self.client.endpoint("storage/v1/object", &[self.bucket.as_str()]);
        self.client
            .request(Method::DELETE, url)
            .json(&serde_json::json!({ "prefixes": keys }))
    }

    fn info_request(&self, key: &str) -> RequestBuilder {
        let url = self
            .client
            .endpoint("storage/v1/object", &[self.bucket.as_str(), key]);
        self.client.request(Method::HEAD, url)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let resp = self.upload_request(key, data, content_type).send().await?;
        check(resp).await.map_err(ObjectStoreError::Backend)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let resp = self.download_request(key).send().await?;

        if is_missing(resp.status()) {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }

        let resp = check(resp).await.map_err(ObjectStoreError::Backend)?;
        Ok(resp.bytes().await?)
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), ObjectStoreError> {
        let resp = self.remove_request(keys).send().await?;
        check(resp).await.map_err(ObjectStoreError::Backend)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let resp = self.info_request(key).send().await?;
        if is_missing(resp.status()) {
            return Ok(false);
        }
        check(resp).await.map_err(ObjectStoreError::Backend)?;
        Ok(true)
    }

    fn public_url(&self, key: &str) -> String {
        self.client
            .endpoint("storage/v1/object/public", &[self.bucket.as_str(), key])
            .to_string()
    }
}

/// Storage reports a missing object as 400 or 404 depending on version.
fn is_missing(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST)
}
