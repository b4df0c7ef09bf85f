use std::collections::HashMap;

use file_gateway::config::{Backend, Config, ConfigError};

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

const REQUIRED: [(&str, &str); 2] = [
    ("SUPABASE_URL", "https://demo.supabase.co/"),
    ("SUPABASE_ANON_KEY", "anon-key"),
];

#[test]
fn test_defaults() {
    let config = load(&REQUIRED).unwrap();

    assert_eq!(config.supabase.url, "https://demo.supabase.co");
    assert_eq!(config.supabase.anon_key, "anon-key");
    assert_eq!(config.storage.backend, Backend::Supabase);
    assert_eq!(config.storage.bucket, "files");
    assert_eq!(config.storage.table, "file_uploads");
    assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    assert_eq!(config.server.max_upload_size, 50 * 1024 * 1024);
    assert_eq!(config.storage.public_base_url, "http://0.0.0.0:8080");
    assert!(!config.rollback_orphaned_uploads);
}

#[test]
fn test_missing_url_is_fatal() {
    let err = load(&[("SUPABASE_ANON_KEY", "anon-key")]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("SUPABASE_URL")));
}

#[test]
fn test_missing_key_is_fatal_even_for_local_backend() {
    let err = load(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("BACKEND", "local"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
}

#[test]
fn test_blank_value_counts_as_missing() {
    let err = load(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_ANON_KEY", "   "),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
}

#[test]
fn test_invalid_url_rejected() {
    let err = load(&[
        ("SUPABASE_URL", "not a url"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));

    let err = load(&[
        ("SUPABASE_URL", "ftp://demo.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_unknown_backend_rejected() {
    let mut vars = REQUIRED.to_vec();
    vars.push(("BACKEND", "s3"));
    assert!(matches!(
        load(&vars).unwrap_err(),
        ConfigError::ValidationError(_)
    ));
}

#[test]
fn test_overrides() {
    let mut vars = REQUIRED.to_vec();
    vars.extend([
        ("BACKEND", "LOCAL"),
        ("STORAGE_BUCKET", "uploads"),
        ("METADATA_TABLE", "uploaded_files"),
        ("BIND_ADDRESS", "127.0.0.1:9000"),
        ("MAX_UPLOAD_SIZE", "1024"),
        ("ROLLBACK_ORPHANED_UPLOADS", "true"),
        ("DATA_DIR", "/tmp/data"),
        ("LOCAL_STORAGE_PATH", "/tmp/files"),
    ]);
    let config = load(&vars).unwrap();

    assert_eq!(config.storage.backend, Backend::Local);
    assert_eq!(config.storage.bucket, "uploads");
    assert_eq!(config.storage.table, "uploaded_files");
    assert_eq!(config.server.bind_address, "127.0.0.1:9000");
    assert_eq!(config.server.max_upload_size, 1024);
    assert_eq!(config.storage.public_base_url, "http://127.0.0.1:9000");
    assert_eq!(config.storage.data_dir, "/tmp/data");
    assert_eq!(config.storage.local_storage_path, "/tmp/files");
    assert!(config.rollback_orphaned_uploads);
}

#[test]
fn test_public_base_url_trims_trailing_slash() {
    let mut vars = REQUIRED.to_vec();
    vars.push(("PUBLIC_BASE_URL", "https://cdn.example.com/"));
    let config = load(&vars).unwrap();
    assert_eq!(config.storage.public_base_url, "https://cdn.example.com");
}

#[test]
fn test_rollback_flag_is_case_insensitive() {
    for value in ["TRUE", "True", " true ", "1"] {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ROLLBACK_ORPHANED_UPLOADS", value));
        assert!(load(&vars).unwrap().rollback_orphaned_uploads, "{value:?}");
    }

    let mut vars = REQUIRED.to_vec();
    vars.push(("ROLLBACK_ORPHANED_UPLOADS", "FALSE"));
    assert!(!load(&vars).unwrap().rollback_orphaned_uploads);
}

#[test]
fn test_rollback_flag_rejects_unknown_values() {
    let mut vars = REQUIRED.to_vec();
    vars.push(("ROLLBACK_ORPHANED_UPLOADS", "yes please"));
    assert!(matches!(
        load(&vars).unwrap_err(),
        ConfigError::ValidationError(_)
    ));
}
