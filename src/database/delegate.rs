use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{Filter, FindManyArgs};

/// Field map written by create/update calls
pub type RecordData = Map<String, Value>;

/// Errors raised by a persistence delegate
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("{model} record '{id}' not found")]
    RecordNotFound { model: &'static str, id: String },

    #[error("{model} record '{id}' already exists")]
    Conflict { model: &'static str, id: String },

    #[error("Invalid record data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Narrow storage interface consumed by the tenant-aware repository.
///
/// Implementations execute queries exactly as given; tenant scoping is the
/// repository's job, never the delegate's.
#[async_trait]
pub trait PersistenceDelegate<M>: Send + Sync {
    async fn find_unique(&self, id: &str) -> Result<Option<M>, DelegateError>;

    async fn find_first(&self, filter: &Filter) -> Result<Option<M>, DelegateError>;

    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<M>, DelegateError>;

    async fn create(&self, data: RecordData) -> Result<M, DelegateError>;

    async fn update(&self, id: &str, data: RecordData) -> Result<M, DelegateError>;

    async fn delete(&self, id: &str) -> Result<M, DelegateError>;

    async fn count(&self, filter: &Filter) -> Result<u64, DelegateError>;
}
