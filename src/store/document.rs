//! Document store interface.
//!
//! Documents are JSON values addressed by (collection, id). Writes can merge
//! into an existing document or replace it.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Ordering for a collection query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOrder {
    /// Field to order by.
    pub field: String,
    /// Descending when true.
    pub descending: bool,
}

impl QueryOrder {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Structured record storage addressed by (collection, document id).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document.
    ///
    /// With `merge`, top-level fields of `value` are laid over the existing
    /// document; other fields are kept. Without it the document is replaced.
    async fn set(&self, collection: &str, id: &str, value: &Value, merge: bool) -> Result<()>;

    /// Read a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// List all documents of a collection in the given order.
    async fn query(&self, collection: &str, order: &QueryOrder) -> Result<Vec<(String, Value)>>;

    /// Delete a document by id. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_order_constructors() {
        let asc = QueryOrder::asc("order");
        assert_eq!(asc.field, "order");
        assert!(!asc.descending);

        let desc = QueryOrder::desc("timestamp");
        assert_eq!(desc.field, "timestamp");
        assert!(desc.descending);
    }
}
