use redb::TableDefinition;

/// File uploads: name -> FileRecord (msgpack)
pub const FILE_UPLOADS: TableDefinition<&str, &[u8]> = TableDefinition::new("file_uploads");
