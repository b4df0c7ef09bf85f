use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, NewFileRecord};
use super::tables::*;
use super::{FileTable, TableError};

impl Database {
    // ========================================================================
    // File upload rows
    // ========================================================================

    /// Insert new rows stamped with the current time.
    /// Fails without writing anything if any name is already taken.
    pub fn insert_files(&self, records: &[NewFileRecord]) -> Result<(), TableError> {
        self.insert_files_at(records, Utc::now())
    }

    /// Insert new rows with an explicit `created_at`.
    pub fn insert_files_at(
        &self,
        records: &[NewFileRecord],
        created_at: DateTime<Utc>,
    ) -> Result<(), TableError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(FILE_UPLOADS).map_err(DatabaseError::from)?;
            for new in records {
                if table
                    .get(new.name.as_str())
                    .map_err(DatabaseError::from)?
                    .is_some()
                {
                    return Err(TableError::Conflict(new.name.clone()));
                }
                let record = new.clone().into_record(created_at);
                let data = rmp_serde::to_vec_named(&record).map_err(DatabaseError::from)?;
                table
                    .insert(record.name.as_str(), data.as_slice())
                    .map_err(DatabaseError::from)?;
            }
        }
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Get a row by name
    pub fn get_file(&self, name: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILE_UPLOADS)?;

        match table.get(name)? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// All rows ordered by `created_at`, newest first
    pub fn list_files(&self) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILE_UPLOADS)?;

        let mut files = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let file: FileRecord = rmp_serde::from_slice(value.value())?;
            files.push(file);
        }

        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    /// Delete a row by name. Returns whether a row was removed.
    pub fn delete_file(&self, name: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(FILE_UPLOADS)?;
            let removed = table.remove(name)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(deleted)
    }
}

#[async_trait]
impl FileTable for Database {
    async fn insert(&self, records: &[NewFileRecord]) -> Result<(), TableError> {
        self.insert_files(records)
    }

    async fn list_newest_first(&self) -> Result<Vec<FileRecord>, TableError> {
        Ok(self.list_files()?)
    }

    async fn delete_by_name(&self, name: &str) -> Result<(), TableError> {
        self.delete_file(name)?;
        Ok(())
    }
}
