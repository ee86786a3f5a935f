//! Folder id allocation.
//!
//! The next id for a category is derived from the storage listing: parse every
//! sub-folder name as a base-10 integer and take the maximum plus one.
//!
//! This is a read-then-write scheme with no compare-and-swap: two sessions
//! allocating concurrently for the same category can compute the same id and
//! upload into the same folder, last writer wins. Known limitation of the
//! stored-data layout, kept as-is.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::debug;

use crate::content::{Category, FolderId};
use crate::store::ObjectStore;
use crate::{Result, ZiyaratError};

/// Session-scoped folder id allocator.
pub struct FolderAllocator {
    objects: Arc<dyn ObjectStore>,
    /// Next id per category, populated only after a successful commit.
    reserved: Mutex<HashMap<Category, FolderId>>,
}

impl FolderAllocator {
    /// Create an allocator over an object store.
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            objects,
            reserved: Mutex::new(HashMap::new()),
        }
    }

    /// Next free folder id for a category.
    ///
    /// After a commit has been recorded with [`mark_committed`], the cached
    /// next id is returned without re-listing storage. Otherwise the category
    /// prefix is listed and the result is `max(existing) + 1`, where names
    /// that do not parse as integers count as 0; with no sub-folders the
    /// first id is 1.
    ///
    /// Fails closed: a listing failure yields
    /// [`ZiyaratError::AllocatorUnavailable`] and no upload may start.
    ///
    /// [`mark_committed`]: FolderAllocator::mark_committed
    pub async fn next_folder_id(&self, category: Category) -> Result<FolderId> {
        if let Some(id) = self.reserved.lock().unwrap().get(&category) {
            return Ok(*id);
        }

        let listing = self
            .objects
            .list(category.storage_prefix())
            .await
            .map_err(|e| ZiyaratError::AllocatorUnavailable(e.to_string()))?;

        let highest = listing
            .prefixes
            .iter()
            .map(|name| name.parse::<FolderId>().unwrap_or(0))
            .max()
            .unwrap_or(0);

        debug!(category = %category, highest, "allocated next folder id");
        Ok(highest + 1)
    }

    /// Record that `id` was consumed by a successful commit.
    ///
    /// Subsequent allocations for the category yield `id + 1` without
    /// re-listing. The cache is session-local and lost on restart.
    pub fn mark_committed(&self, category: Category, id: FolderId) {
        self.reserved.lock().unwrap().insert(category, id + 1);
    }
}
