use crate::model::{Record, RepositoryRegistry};
use anyhow::Result;
use std::sync::Arc;

/// Options for fetching a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// Contain paths of association names to hydrate
    pub contain: Vec<String>,
    /// 1-based page; `None` returns every record
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of records plus the size of the whole result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoundPage {
    pub records: Vec<Record>,
    pub total: u64,
}

/// Data-access layer handing hydrated records to the view
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Repositories this store knows about
    fn registry(&self) -> Arc<RepositoryRegistry>;

    async fn find_all(&self, repository: &str, query: &FindQuery) -> Result<FoundPage>;

    async fn get(&self, repository: &str, id: &str, contain: &[String]) -> Result<Option<Record>>;
}
