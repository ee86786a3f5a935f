//! Content record repository over the document store.

use std::sync::Arc;

use crate::content::record::{Category, ContentRecord, FolderId};
use crate::store::{DocumentStore, QueryOrder};
use crate::{Result, ZiyaratError};

/// Listing order for a category.
///
/// Different screens use different orderings; both are preserved as
/// configuration rather than one hardcoded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Newest first.
    TimestampDesc,
    /// Manual sort order, lower first.
    OrderAsc,
}

impl ListOrder {
    fn query_order(&self) -> QueryOrder {
        match self {
            ListOrder::TimestampDesc => QueryOrder::desc("timestamp"),
            ListOrder::OrderAsc => QueryOrder::asc("order"),
        }
    }
}

/// Repository for content records of document-backed categories.
pub struct ContentRepository {
    documents: Arc<dyn DocumentStore>,
}

impl ContentRepository {
    /// Create a repository over a document store.
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    fn collection(category: Category) -> Result<&'static str> {
        category.collection().ok_or_else(|| {
            ZiyaratError::Document(format!(
                "category {category} stores records as blobs, not documents"
            ))
        })
    }

    /// Write a record into a category's collection.
    pub async fn write_to(
        &self,
        category: Category,
        record: &ContentRecord,
        merge: bool,
    ) -> Result<()> {
        let collection = Self::collection(category)?;
        let value = serde_json::to_value(record)
            .map_err(|e| ZiyaratError::Document(format!("encode record: {e}")))?;
        self.documents
            .set(collection, &record.doc_id(), &value, merge)
            .await
    }

    /// Read one record.
    pub async fn get(&self, category: Category, folder_id: FolderId) -> Result<Option<ContentRecord>> {
        let collection = Self::collection(category)?;
        let value = self
            .documents
            .get(collection, &folder_id.to_string())
            .await?;
        match value {
            Some(value) => {
                let record = serde_json::from_value(value).map_err(|e| {
                    ZiyaratError::Document(format!(
                        "corrupt record {collection}/{folder_id}: {e}"
                    ))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List all records of a category in the given order.
    ///
    /// Documents that no longer parse as records are skipped with a warning
    /// rather than failing the whole listing.
    pub async fn list(&self, category: Category, order: ListOrder) -> Result<Vec<ContentRecord>> {
        let collection = Self::collection(category)?;
        let documents = self
            .documents
            .query(collection, &order.query_order())
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for (id, value) in documents {
            match serde_json::from_value::<ContentRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection, id, error = %e, "skipping unreadable record");
                }
            }
        }
        Ok(records)
    }

    /// Delete one record. Deleting a missing record is not an error.
    pub async fn delete(&self, category: Category, folder_id: FolderId) -> Result<()> {
        let collection = Self::collection(category)?;
        self.documents
            .delete(collection, &folder_id.to_string())
            .await
    }
}
