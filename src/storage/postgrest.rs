use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

use super::models::{FileRecord, NewFileRecord};
use super::{FileTable, TableError};
use crate::supabase::{check, SupabaseClient};

/// Hosted table reached through Supabase's PostgREST endpoint.
pub struct PostgrestTable {
    table: String,
    client: Arc<SupabaseClient>,
}

impl PostgrestTable {
    pub fn new(client: Arc<SupabaseClient>, table: &str) -> Self {
        Self {
            table: table.to_string(),
            client,
        }
    }

    fn table_request(&self, method: Method) -> RequestBuilder {
        let url = self.client.endpoint("rest/v1", &[self.table.as_str()]);
        self.client.request(method, url)
    }

    fn insert_request(&self, records: &[NewFileRecord]) -> RequestBuilder {
        self.table_request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(records)
    }

    fn select_request(&self) -> RequestBuilder {
        self.table_request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
    }

    fn delete_request(&self, name: &str) -> RequestBuilder {
        self.table_request(Method::DELETE)
            .query(&[("name", format!("eq.{name}"))])
    }
}

#[async_trait]
impl FileTable for PostgrestTable {
    async fn insert(&self, records: &[NewFileRecord]) -> Result<(), TableError> {
        let resp = self.insert_request(records).send().await?;
        check(resp).await.map_err(TableError::Backend)?;
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<FileRecord>, TableError> {
        let resp = self.select_request().send().await?;
        let resp = check(resp).await.map_err(TableError::Backend)?;
        Ok(resp.json().await?)
    }

    async fn delete_by_name(&self, name: &str) -> Result<(), TableError> {
        let resp = self.delete_request(name).send().await?;
        check(resp).await.map_err(TableError::Backend)?;
        Ok(())
    }
}
