//! Trait definitions for the search core.
//!
//! The store is abstracted so the orchestration logic can be tested
//! against an in-memory implementation.

use async_trait::async_trait;

use super::types::{IndexedRepoRecord, ScalarFilters};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid search request")]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for SearchError {
    fn from(e: sqlx::Error) -> Self {
        SearchError::DatabaseError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// The two many-to-many association tables a relational constraint can
/// run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Languages,
    Labels,
}

#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Ids of repositories associated with **every** value in `values`
    /// (AND semantics), optionally restricted to ids in `within`.
    async fn intersect(
        &self,
        assoc: Association,
        values: &[String],
        within: Option<&[String]>,
    ) -> Result<Vec<String>>;

    /// One window of matching records with associations hydrated,
    /// ordered by id. Callers pass `limit = page size + 1` and peek at
    /// the extra row to detect a further page.
    async fn fetch_page(
        &self,
        filters: &ScalarFilters,
        id_subset: Option<&[String]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IndexedRepoRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_store_object_safe(_: &dyn SearchStore) {}
}
