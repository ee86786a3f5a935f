//! Test helpers for end-to-end publish tests.
//!
//! Provides a tempdir-backed service fixture plus object-store wrappers that
//! inject failures or hold an upload mid-flight.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use ziyarat::{
    LocalDocumentStore, LocalObjectStore, ObjectListing, ObjectStore, PublishService, Result,
    TaskProgress, UploadFile, ZiyaratError,
};

/// Tempdir-backed stores for one test.
pub struct TestBackend {
    _objects_dir: TempDir,
    _documents_dir: TempDir,
    pub objects: Arc<LocalObjectStore>,
    pub documents: Arc<LocalDocumentStore>,
}

impl TestBackend {
    pub fn new() -> Self {
        let objects_dir = TempDir::new().unwrap();
        let documents_dir = TempDir::new().unwrap();
        let objects = Arc::new(LocalObjectStore::new(objects_dir.path()).unwrap());
        let documents = Arc::new(LocalDocumentStore::new(documents_dir.path()).unwrap());
        Self {
            _objects_dir: objects_dir,
            _documents_dir: documents_dir,
            objects,
            documents,
        }
    }

    /// Service over the plain local stores.
    pub fn service(&self) -> PublishService {
        PublishService::new(self.objects.clone(), self.documents.clone())
    }

    /// Service whose object store is wrapped (for failure injection).
    pub fn service_with_objects(&self, objects: Arc<dyn ObjectStore>) -> PublishService {
        PublishService::new(objects, self.documents.clone())
    }

    /// Create an existing folder by storing one object in it.
    pub async fn seed_folder(&self, prefix: &str, name: &str) {
        self.objects
            .upload(
                &format!("{prefix}/{name}/seed.bin"),
                b"seed".to_vec(),
                "application/octet-stream",
                TaskProgress::standalone(),
            )
            .await
            .unwrap();
    }
}

#[allow(dead_code)]
pub fn image_file(name: &str) -> UploadFile {
    UploadFile::image(name, "image/jpeg", b"jpeg bytes".to_vec())
}

#[allow(dead_code)]
pub fn audio_file(name: &str) -> UploadFile {
    UploadFile::audio(name, "audio/mpeg", b"mp3 bytes".to_vec())
}

/// Object store that fails uploads whose path contains a marker substring.
pub struct FlakyObjectStore {
    inner: Arc<dyn ObjectStore>,
    fail_matching: String,
}

impl FlakyObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>, fail_matching: impl Into<String>) -> Self {
        Self {
            inner,
            fail_matching: fail_matching.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    async fn list(&self, prefix: &str) -> Result<ObjectListing> {
        self.inner.list(prefix).await
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: TaskProgress,
    ) -> Result<String> {
        if path.contains(&self.fail_matching) {
            return Err(ZiyaratError::Storage(format!(
                "simulated transport failure for {path}"
            )));
        }
        self.inner.upload(path, bytes, content_type, progress).await
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.fetch(path).await
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        self.inner.download_url(path).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.inner.delete(path).await
    }
}

/// Object store that reports 50% progress for a matching upload, then waits
/// for [`HoldingStore::release`] before letting it finish.
pub struct HoldingStore {
    inner: Arc<dyn ObjectStore>,
    hold_matching: String,
    gate: Arc<Notify>,
}

impl HoldingStore {
    pub fn new(inner: Arc<dyn ObjectStore>, hold_matching: impl Into<String>) -> Self {
        Self {
            inner,
            hold_matching: hold_matching.into(),
            gate: Arc::new(Notify::new()),
        }
    }

    /// Handle for releasing the held upload (`notify_one` lets it finish).
    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone()
    }
}

#[async_trait]
impl ObjectStore for HoldingStore {
    async fn list(&self, prefix: &str) -> Result<ObjectListing> {
        self.inner.list(prefix).await
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: TaskProgress,
    ) -> Result<String> {
        if path.contains(&self.hold_matching) {
            progress.set(0.5);
            self.gate.notified().await;
        }
        self.inner.upload(path, bytes, content_type, progress).await
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.fetch(path).await
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        self.inner.download_url(path).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.inner.delete(path).await
    }
}
