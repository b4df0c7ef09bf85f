use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Remove the just-written blob when the metadata insert fails.
    pub rollback_orphaned_uploads: bool,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project endpoint, e.g. `https://xyzcompany.supabase.co`
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: Backend,
    pub bucket: String,
    pub table: String,
    /// redb directory for the local backend
    pub data_dir: String,
    /// Blob directory for the local backend
    pub local_storage_path: String,
    /// Base for public URLs handed out by the local backend
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Supabase,
            bucket: "files".to_string(),
            table: "file_uploads".to_string(),
            data_dir: "./data".to_string(),
            local_storage_path: "./files".to_string(),
            public_base_url: "http://0.0.0.0:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let url = required("SUPABASE_URL")?;
        let anon_key = required("SUPABASE_ANON_KEY")?;

        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let max_upload_size = lookup("MAX_UPLOAD_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024);

        let backend = match lookup("BACKEND")
            .unwrap_or_else(|| "supabase".to_string())
            .to_lowercase()
            .as_str()
        {
            "supabase" => Backend::Supabase,
            "local" => Backend::Local,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "BACKEND must be 'supabase' or 'local', got '{other}'"
                )))
            }
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{bind_address}"))
            .trim_end_matches('/')
            .to_string();

        let rollback_orphaned_uploads = match lookup("ROLLBACK_ORPHANED_UPLOADS") {
            None => false,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "ROLLBACK_ORPHANED_UPLOADS must be true or false, got '{other}'"
                    )))
                }
            },
        };

        let config = Config {
            supabase: SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            },
            server: ServerConfig {
                bind_address,
                max_upload_size,
            },
            storage: StorageConfig {
                backend,
                bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| "files".to_string()),
                table: lookup("METADATA_TABLE").unwrap_or_else(|| "file_uploads".to_string()),
                data_dir: lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string()),
                local_storage_path: lookup("LOCAL_STORAGE_PATH")
                    .unwrap_or_else(|| "./files".to_string()),
                public_base_url,
            },
            rollback_orphaned_uploads,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.supabase.url).map_err(|e| {
            ConfigError::ValidationError(format!("SUPABASE_URL is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(
                "SUPABASE_URL must use http or https".to_string(),
            ));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "STORAGE_BUCKET cannot be empty".to_string(),
            ));
        }

        if self.storage.table.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "METADATA_TABLE cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
