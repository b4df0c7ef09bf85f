//! file-gateway - A thin gateway for file uploads on a hosted backend
//!
//! This crate forwards three operations to a backend-as-a-service platform:
//! - upload: write a blob to the `files` bucket, then index it in `file_uploads`
//! - list: read the index, newest first
//! - delete: remove the blob, then its index row
//!
//! Backends are swappable (Supabase Storage + PostgREST, or local filesystem +
//! redb), and the gateway is also served over a small REST API.

pub mod api;
pub mod config;
pub mod gateway;
pub mod object_store;
pub mod storage;
pub mod supabase;
#[cfg(test)]
pub mod testutil;

use config::Config;
use gateway::FileGateway;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub gateway: FileGateway,
}
