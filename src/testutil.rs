//! Shared test helpers for file-gateway unit tests.

use std::sync::Arc;

use crate::config::{Backend, Config, ServerConfig, StorageConfig, SupabaseConfig};
use crate::gateway::FileGateway;
use crate::AppState;

/// Create a test AppState on the local backends inside a temporary directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let files_dir = temp_dir.path().join("files");

    let config = Config {
        supabase: SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            anon_key: "test-anon-key".to_string(),
        },
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_upload_size: 10 * 1024 * 1024, // 10MB for tests
        },
        storage: StorageConfig {
            backend: Backend::Local,
            data_dir: data_dir.to_string_lossy().to_string(),
            local_storage_path: files_dir.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            ..StorageConfig::default()
        },
        rollback_orphaned_uploads: false,
    };

    let gateway = FileGateway::from_config(&config).expect("Failed to build test gateway");

    Arc::new(AppState { config, gateway })
}
