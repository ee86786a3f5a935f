//! Object store interface.
//!
//! Paths are hierarchical, `/`-separated, never leading-slashed:
//! `{category}/{folderId}/{leaf}`. Listing is shallow and returns leaf names.

use async_trait::async_trait;

use crate::store::progress::TaskProgress;
use crate::Result;

/// Immediate children of a storage path.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    /// Leaf names of sub-folders directly under the path.
    pub prefixes: Vec<String>,
    /// Leaf names of objects directly under the path.
    pub items: Vec<String>,
}

impl ObjectListing {
    /// True when the path has no children at all.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.items.is_empty()
    }
}

/// Hierarchical object storage.
///
/// Uploads report fractional progress through the given [`TaskProgress`]
/// handle and end in exactly one terminal state: success with a download URL,
/// or an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the immediate children of a path.
    async fn list(&self, prefix: &str) -> Result<ObjectListing>;

    /// Store bytes at a path and return the object's download URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: TaskProgress,
    ) -> Result<String>;

    /// Read an object's bytes.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Resolve the download URL of a stored object.
    async fn download_url(&self, path: &str) -> Result<String>;

    /// Delete an object.
    async fn delete(&self, path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_is_empty() {
        assert!(ObjectListing::default().is_empty());

        let listing = ObjectListing {
            prefixes: vec!["1".to_string()],
            items: Vec::new(),
        };
        assert!(!listing.is_empty());
    }
}
