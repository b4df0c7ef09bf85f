use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `file_uploads` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Storage key, also the lookup key for deletes
    pub name: String,
    /// Byte size of the uploaded blob
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    /// Assigned by the table backend on insert
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `file_uploads`; `created_at` is left to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
}

impl NewFileRecord {
    pub fn into_record(self, created_at: DateTime<Utc>) -> FileRecord {
        FileRecord {
            name: self.name,
            size: self.size,
            mime_type: self.mime_type,
            url: self.url,
            created_at,
        }
    }
}
