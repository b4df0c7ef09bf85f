//! Upload, list and delete against a bucket plus its index table.
//!
//! Each operation is a straight sequence of at most two backend calls. The pair
//! is not atomic: an upload whose row insert fails leaves the blob behind, and a
//! delete whose row removal fails leaves a row without a blob. Both are logged;
//! only the upload side can optionally be compensated (see [`RollbackPolicy`]).

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Backend, Config};
use crate::object_store::{LocalStore, ObjectStore, ObjectStoreError, SupabaseStorage};
use crate::storage::models::{FileRecord, NewFileRecord};
use crate::storage::{Database, FileTable, PostgrestTable, TableError};
use crate::supabase::SupabaseClient;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Storage(#[from] ObjectStoreError),
    #[error("{0}")]
    Database(#[from] TableError),
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),
}

/// A file name must survive URL path normalisation unchanged: no empty, `.`
/// or `..` segments.
pub fn validate_file_name(file_name: &str) -> Result<(), GatewayError> {
    let valid = !file_name.is_empty()
        && file_name
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."));
    if valid {
        Ok(())
    } else {
        Err(GatewayError::InvalidFileName(file_name.to_string()))
    }
}

/// What to do with a freshly written blob when its row insert fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Leave the blob in the bucket (orphaned).
    #[default]
    Preserve,
    /// Remove the blob again before reporting the insert failure.
    Compensate,
}

/// Binary payload together with the metadata recorded alongside it.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub data: Bytes,
    pub size: u64,
    pub mime_type: String,
}

impl FilePayload {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        let data = data.into();
        Self {
            size: data.len() as u64,
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// Uniform result shape handed to callers: check `success` before reading
/// `url` or `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<FileRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            url: None,
            data: None,
            error: None,
        }
    }

    pub fn with_url(url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::ok()
        }
    }

    pub fn with_data(data: Vec<FileRecord>) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub struct FileGateway {
    object_store: Arc<dyn ObjectStore>,
    table: Arc<dyn FileTable>,
    rollback: RollbackPolicy,
}

impl FileGateway {
    pub fn new(object_store: Arc<dyn ObjectStore>, table: Arc<dyn FileTable>) -> Self {
        Self {
            object_store,
            table,
            rollback: RollbackPolicy::default(),
        }
    }

    pub fn with_rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.rollback = rollback;
        self
    }

    /// Build the backends named by the configuration. The remote client is
    /// created here once and shared by the bucket and the table.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let (object_store, table) = match config.storage.backend {
            Backend::Supabase => {
                let client = Arc::new(SupabaseClient::new(&config.supabase)?);
                let store: Arc<dyn ObjectStore> = Arc::new(SupabaseStorage::new(
                    Arc::clone(&client),
                    &config.storage.bucket,
                ));
                let table: Arc<dyn FileTable> =
                    Arc::new(PostgrestTable::new(client, &config.storage.table));
                (store, table)
            }
            Backend::Local => {
                let store: Arc<dyn ObjectStore> = Arc::new(LocalStore::new(
                    &config.storage.local_storage_path,
                    &config.storage.public_base_url,
                )?);
                let table: Arc<dyn FileTable> =
                    Arc::new(Database::open(&config.storage.data_dir)?);
                (store, table)
            }
        };

        let rollback = if config.rollback_orphaned_uploads {
            RollbackPolicy::Compensate
        } else {
            RollbackPolicy::Preserve
        };

        Ok(Self::new(object_store, table).with_rollback(rollback))
    }

    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.object_store
    }

    pub fn rollback_policy(&self) -> RollbackPolicy {
        self.rollback
    }

    /// Write the blob, then index it. Returns the blob's public URL.
    pub async fn upload(&self, file: FilePayload, file_name: &str) -> Result<String, GatewayError> {
        validate_file_name(file_name)?;

        self.object_store
            .put(file_name, file.data, &file.mime_type)
            .await?;

        let url = self.object_store.public_url(file_name);
        let record = NewFileRecord {
            name: file_name.to_string(),
            size: file.size,
            mime_type: file.mime_type,
            url: url.clone(),
        };

        if let Err(e) = self.table.insert(std::slice::from_ref(&record)).await {
            match self.rollback {
                RollbackPolicy::Preserve => {
                    tracing::warn!(file_name, error = %e, "Row insert failed, blob left orphaned");
                }
                RollbackPolicy::Compensate => {
                    if let Err(cleanup) = self.object_store.remove(&[file_name]).await {
                        tracing::warn!(
                            file_name,
                            error = %cleanup,
                            "Failed to remove orphaned blob after row insert failure"
                        );
                    }
                }
            }
            return Err(e.into());
        }

        tracing::debug!(file_name, url = %url, "Uploaded file");
        Ok(url)
    }

    pub async fn list(&self) -> Result<Vec<FileRecord>, GatewayError> {
        Ok(self.table.list_newest_first().await?)
    }

    /// Remove the blob, then its row. A missing name is whatever the backends
    /// make of it.
    pub async fn delete(&self, file_name: &str) -> Result<(), GatewayError> {
        validate_file_name(file_name)?;

        self.object_store.remove(&[file_name]).await?;

        if let Err(e) = self.table.delete_by_name(file_name).await {
            tracing::warn!(file_name, error = %e, "Blob removed but row delete failed");
            return Err(e.into());
        }

        tracing::debug!(file_name, "Deleted file");
        Ok(())
    }

    // ========================================================================
    // Envelope surface
    // ========================================================================

    pub async fn upload_file(&self, file: FilePayload, file_name: &str) -> Envelope {
        match self.upload(file, file_name).await {
            Ok(url) => Envelope::with_url(url),
            Err(e) => {
                tracing::error!(file_name, error = %e, "Upload failed");
                Envelope::failure(e.to_string())
            }
        }
    }

    pub async fn get_files(&self) -> Envelope {
        match self.list().await {
            Ok(files) => Envelope::with_data(files),
            Err(e) => {
                tracing::error!(error = %e, "Listing files failed");
                Envelope::failure(e.to_string())
            }
        }
    }

    pub async fn delete_file(&self, file_name: &str) -> Envelope {
        match self.delete(file_name).await {
            Ok(()) => Envelope::ok(),
            Err(e) => {
                tracing::error!(file_name, error = %e, "Delete failed");
                Envelope::failure(e.to_string())
            }
        }
    }
}
