mod local;
mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStorage;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("The resource already exists")]
    AlreadyExists(String),
    /// Message reported by the storage service, passed through verbatim.
    #[error("{0}")]
    Backend(String),
}

/// Abstraction over the bucket that holds uploaded blobs.
/// Keys are caller-chosen file names and may contain `/`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a new blob. Existing keys are not overwritten.
    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;
    /// Remove every listed key. Missing keys are left to the backend's semantics.
    async fn remove(&self, keys: &[&str]) -> Result<(), ObjectStoreError>;
    /// `Ok(false)` only when the backend reports the key missing.
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
    /// Public URL for a key. Computed locally, never touches the network.
    fn public_url(&self, key: &str) -> String;
}
