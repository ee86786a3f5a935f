//! JSON-blob record backend.
//!
//! Live updates and upcoming events do not use the document store: the whole
//! record is one JSON blob inside the item's storage folder
//! (`{prefix}/{folderId}/{slug}.json`). This backend and the document backend
//! are not interoperable; a category uses exactly one of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::content::record::{Category, FolderId};
use crate::store::{ObjectStore, TaskProgress};
use crate::{Result, ZiyaratError};

/// One dated bulletin (a live update or an upcoming event).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletinRecord {
    /// Headline.
    pub title: String,
    /// Display date entered by the operator.
    pub date: String,
    /// Body text.
    pub description: String,
    /// Attached image URL, when one was uploaded.
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation time, ISO-8601.
    pub timestamp: DateTime<Utc>,
    /// Owning folder id.
    #[serde(rename = "folderId")]
    pub folder_id: FolderId,
    /// Manual sort order; lower sorts first.
    #[serde(default)]
    pub order: i64,
}

impl BulletinRecord {
    /// Create a bulletin with the required fields.
    pub fn new(
        folder_id: FolderId,
        title: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            description: description.into(),
            image_url: None,
            timestamp: Utc::now(),
            folder_id,
            order: 0,
        }
    }
}

/// Store for blob-backed categories.
pub struct BulletinStore {
    objects: Arc<dyn ObjectStore>,
}

impl BulletinStore {
    /// Create a store over an object store.
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    fn blob_path(category: Category, folder_id: FolderId) -> Result<String> {
        let slug = category.blob_slug().ok_or_else(|| {
            ZiyaratError::Storage(format!(
                "category {category} stores records as documents, not blobs"
            ))
        })?;
        Ok(format!("{}/{slug}.json", category.folder_path(folder_id)))
    }

    /// Write one bulletin blob.
    pub async fn write(&self, category: Category, record: &BulletinRecord) -> Result<()> {
        let path = Self::blob_path(category, record.folder_id)?;
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| ZiyaratError::Storage(format!("encode bulletin: {e}")))?;
        self.objects
            .upload(&path, bytes, "application/json", TaskProgress::standalone())
            .await?;
        Ok(())
    }

    /// Read one bulletin, `None` when the blob does not exist.
    pub async fn get(
        &self,
        category: Category,
        folder_id: FolderId,
    ) -> Result<Option<BulletinRecord>> {
        let path = Self::blob_path(category, folder_id)?;
        let bytes = match self.objects.fetch(&path).await {
            Ok(bytes) => bytes,
            Err(ZiyaratError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| ZiyaratError::Storage(format!("corrupt bulletin {path}: {e}")))?;
        Ok(Some(record))
    }

    /// List all bulletins of a category, ordered by folder id ascending.
    ///
    /// Folders without a readable blob are skipped with a warning.
    pub async fn list(&self, category: Category) -> Result<Vec<BulletinRecord>> {
        // Validate the category before touching storage.
        Self::blob_path(category, 0)?;

        let listing = self.objects.list(category.storage_prefix()).await?;
        let mut ids: Vec<FolderId> = listing
            .prefixes
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        ids.sort_unstable();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(category, id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!(category = %category, folder_id = id, error = %e, "skipping unreadable bulletin");
                }
            }
        }
        Ok(records)
    }

    /// Best-effort delete of a bulletin folder's objects.
    ///
    /// Storage failures are logged and swallowed; the folder may keep
    /// orphaned objects.
    pub async fn delete(&self, category: Category, folder_id: FolderId) -> Result<()> {
        Self::blob_path(category, folder_id)?;

        let folder = category.folder_path(folder_id);
        let listing = match self.objects.list(&folder).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(folder, error = %e, "could not list bulletin folder for deletion");
                return Ok(());
            }
        };
        for item in listing.items {
            let path = format!("{folder}/{item}");
            if let Err(e) = self.objects.delete(&path).await {
                warn!(path, error = %e, "could not delete bulletin object");
            }
        }
        Ok(())
    }
}
