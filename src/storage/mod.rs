pub mod db;
mod files;
pub mod models;
mod postgrest;
mod tables;

pub use db::{Database, DatabaseError};
pub use postgrest::PostgrestTable;
pub use tables::*;

use async_trait::async_trait;
use thiserror::Error;

use models::{FileRecord, NewFileRecord};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("{0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("duplicate key value violates unique constraint: name '{0}' already exists")]
    Conflict(String),
    /// Message reported by the table service, passed through verbatim.
    #[error("{0}")]
    Backend(String),
}

/// Abstraction over the table that indexes uploaded blobs.
#[async_trait]
pub trait FileTable: Send + Sync {
    async fn insert(&self, records: &[NewFileRecord]) -> Result<(), TableError>;
    /// Every row, newest `created_at` first.
    async fn list_newest_first(&self) -> Result<Vec<FileRecord>, TableError>;
    /// Delete rows whose name matches. Matching nothing is not an error.
    async fn delete_by_name(&self, name: &str) -> Result<(), TableError>;
}
