//! Publish service: the upload-commit pipeline and its symmetric
//! listing/deletion path.
//!
//! One commit uploads a folder's files and writes one metadata record:
//!
//! 1. validate the request (no network involved)
//! 2. allocate the folder id (fail-closed)
//! 3. upload the cover image alone, waiting for its terminal state
//! 4. upload the remaining files concurrently, aggregating progress
//! 5. write exactly one metadata document, merge semantics
//!
//! There is no transaction spanning the two stores. A failed upload leaves
//! already-succeeded siblings in storage with no record; a failed metadata
//! write leaves a fully-uploaded orphaned folder. Both states are reported
//! distinctly and are visible to operators, not auto-recovered.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::content::{
    batch_stored_name, cover_stored_name, is_cover_image, is_metadata_blob, Backend, BulletinRecord,
    BulletinStore, Category, ContentRecord, FileKind, FolderId, ListOrder, Paragraph,
    ContentRepository, METADATA_BLOB_NAME,
};
use crate::publish::allocator::FolderAllocator;
use crate::publish::{DEFAULT_MAX_UPLOAD_SIZE, MAX_NAME_LENGTH};
use crate::store::{BatchProgress, DocumentStore, ObjectStore, TaskProgress};
use crate::{Result, ZiyaratError};

/// One file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original filename, used for the extension and error reporting.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
    /// Slot the operator placed the file in.
    pub kind: FileKind,
}

impl UploadFile {
    fn build(filename: String, content_type: String, bytes: Vec<u8>, kind: FileKind) -> Self {
        let content_type = if content_type.is_empty() {
            mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string()
        } else {
            content_type
        };
        Self {
            filename,
            content_type,
            bytes,
            kind,
        }
    }

    /// A file for the image slot.
    pub fn image(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::build(filename.into(), content_type.into(), bytes, FileKind::Image)
    }

    /// A file for the audio slot.
    pub fn audio(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::build(filename.into(), content_type.into(), bytes, FileKind::Audio)
    }

    /// A file for the other-files slot.
    pub fn other(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::build(filename.into(), content_type.into(), bytes, FileKind::Other)
    }
}

/// Form data for one commit.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    /// Display name (required).
    pub name: String,
    /// Free-text description blocks.
    pub description: Vec<String>,
    /// Titled paragraphs.
    pub paragraphs: Vec<Paragraph>,
    /// Map or location URL.
    pub location_link: Option<String>,
    /// Manual sort order.
    pub order: i64,
    /// Featured image, uploaded first and alone.
    pub cover_image: Option<UploadFile>,
    /// Remaining files, uploaded concurrently.
    pub files: Vec<UploadFile>,
}

impl CommitRequest {
    /// Create a request with the required name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description blocks.
    pub fn with_description(mut self, description: Vec<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the paragraphs.
    pub fn with_paragraphs(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.paragraphs = paragraphs;
        self
    }

    /// Set the location link.
    pub fn with_location_link(mut self, link: impl Into<String>) -> Self {
        self.location_link = Some(link.into());
        self
    }

    /// Set the sort order.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Set the cover image.
    pub fn with_cover_image(mut self, file: UploadFile) -> Self {
        self.cover_image = Some(file);
        self
    }

    /// Add a batch file.
    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.files.push(file);
        self
    }
}

/// Edits applied to an existing record.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// New display name.
    pub name: Option<String>,
    /// Replacement description blocks.
    pub description: Option<Vec<String>>,
    /// Replacement paragraphs.
    pub paragraphs: Option<Vec<Paragraph>>,
    /// New location link.
    pub location_link: Option<String>,
    /// New sort order.
    pub order: Option<i64>,
    /// Replacement cover image.
    pub cover_image: Option<UploadFile>,
    /// Files to add; URLs are appended to the stored lists.
    pub files: Vec<UploadFile>,
}

/// Read-back inventory of a folder, partitioned by the stored-filename
/// classification.
#[derive(Debug, Clone, Default)]
pub struct FolderFiles {
    /// Download URLs of batch images.
    pub images: Vec<String>,
    /// Download URLs of audio files.
    pub audios: Vec<String>,
    /// Download URLs of everything else.
    pub others: Vec<String>,
}

/// High-level content operations for the portal screens.
pub struct PublishService {
    objects: Arc<dyn ObjectStore>,
    repository: ContentRepository,
    bulletins: BulletinStore,
    allocator: FolderAllocator,
    max_upload_size: u64,
}

impl PublishService {
    /// Create a service over the two stores.
    pub fn new(objects: Arc<dyn ObjectStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            repository: ContentRepository::new(documents),
            bulletins: BulletinStore::new(Arc::clone(&objects)),
            allocator: FolderAllocator::new(Arc::clone(&objects)),
            objects,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Override the maximum accepted upload size.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// The session's folder allocator.
    pub fn allocator(&self) -> &FolderAllocator {
        &self.allocator
    }

    fn validate_file(&self, file: &UploadFile) -> Result<()> {
        if !file.kind.accepts_content_type(&file.content_type) {
            return Err(ZiyaratError::Validation(format!(
                "{} has type {}, which is not a valid {} file",
                file.filename,
                file.content_type,
                file.kind.prefix()
            )));
        }
        if file.bytes.len() as u64 > self.max_upload_size {
            let max_mb = self.max_upload_size / 1024 / 1024;
            return Err(ZiyaratError::Validation(format!(
                "{} is too large (max {max_mb}MB)",
                file.filename
            )));
        }
        Ok(())
    }

    fn validate_commit(&self, category: Category, request: &CommitRequest) -> Result<()> {
        if category.backend() != Backend::Document {
            return Err(ZiyaratError::Validation(format!(
                "category {category} publishes bulletins, not content records"
            )));
        }
        if request.name.trim().is_empty() {
            return Err(ZiyaratError::Validation("name is required".to_string()));
        }
        if request.name.chars().count() > MAX_NAME_LENGTH {
            return Err(ZiyaratError::Validation(format!(
                "name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        if let Some(cover) = &request.cover_image {
            if !cover.content_type.starts_with("image/") {
                return Err(ZiyaratError::Validation(format!(
                    "{} has type {}, which is not a valid image file",
                    cover.filename, cover.content_type
                )));
            }
            self.validate_file(cover)?;
        }
        for file in &request.files {
            self.validate_file(file)?;
        }
        Ok(())
    }

    /// Upload the cover image alone and wait for its terminal state.
    async fn upload_cover(
        &self,
        category: Category,
        folder_id: FolderId,
        cover: &UploadFile,
        progress: Option<&watch::Sender<f64>>,
    ) -> Result<String> {
        let millis = Utc::now().timestamp_millis();
        let path = format!(
            "{}/{}",
            category.folder_path(folder_id),
            cover_stored_name(millis, &cover.filename)
        );
        let batch = match progress {
            Some(sink) => BatchProgress::with_sink(1, sink.clone()),
            None => BatchProgress::new(1),
        };
        self.objects
            .upload(&path, cover.bytes.clone(), &cover.content_type, batch.task(0))
            .await
            .map_err(|e| ZiyaratError::UploadFailed {
                filename: cover.filename.clone(),
                reason: e.to_string(),
            })
    }

    /// Upload the remaining files concurrently.
    ///
    /// All uploads are started together and all are awaited; a failure does
    /// not cancel siblings, and their stored objects are not rolled back.
    /// Returns the uploaded (kind, url) pairs or the first failure.
    async fn upload_batch(
        &self,
        category: Category,
        folder_id: FolderId,
        files: &[UploadFile],
        progress: Option<&watch::Sender<f64>>,
    ) -> Result<Vec<(FileKind, String)>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let millis = Utc::now().timestamp_millis();
        let batch = match progress {
            Some(sink) => BatchProgress::with_sink(files.len(), sink.clone()),
            None => BatchProgress::new(files.len()),
        };

        let uploads = files.iter().enumerate().map(|(index, file)| {
            let objects = Arc::clone(&self.objects);
            let task = batch.task(index);
            // The index offsets the timestamp so same-millisecond files get
            // distinct stored names.
            let path = format!(
                "{}/{}",
                category.folder_path(folder_id),
                batch_stored_name(file.kind, millis + index as i64, &file.filename)
            );
            let bytes = file.bytes.clone();
            let content_type = file.content_type.clone();
            let filename = file.filename.clone();
            let kind = file.kind;
            async move {
                objects
                    .upload(&path, bytes, &content_type, task)
                    .await
                    .map(|url| (kind, url))
                    .map_err(|e| ZiyaratError::UploadFailed {
                        filename,
                        reason: e.to_string(),
                    })
            }
        });

        let results = join_all(uploads).await;
        results.into_iter().collect()
    }

    /// Best-effort back-reference blob next to the uploaded files.
    async fn write_back_reference(&self, category: Category, folder_id: FolderId) {
        let Some(collection) = category.collection() else {
            return;
        };
        let blob = json!({
            "hasContent": true,
            "firestoreCollection": collection,
            "firestoreDocId": folder_id.to_string(),
        });
        let path = format!("{}/{METADATA_BLOB_NAME}", category.folder_path(folder_id));
        let bytes = match serde_json::to_vec(&blob) {
            Ok(bytes) => bytes,
            Err(_) => return,
        };
        if let Err(e) = self
            .objects
            .upload(&path, bytes, "application/json", TaskProgress::standalone())
            .await
        {
            warn!(path, error = %e, "could not write back-reference blob");
        }
    }

    /// Commit new content: allocate a folder, upload the files, write one
    /// metadata record.
    ///
    /// `progress` receives the running percentage: the cover upload alone
    /// first, then the batch aggregate.
    pub async fn commit(
        &self,
        category: Category,
        request: CommitRequest,
        progress: Option<watch::Sender<f64>>,
    ) -> Result<ContentRecord> {
        self.validate_commit(category, &request)?;

        let folder_id = self.allocator.next_folder_id(category).await?;

        let cover_url = match &request.cover_image {
            Some(cover) => Some(
                self.upload_cover(category, folder_id, cover, progress.as_ref())
                    .await?,
            ),
            None => None,
        };

        let uploaded = self
            .upload_batch(category, folder_id, &request.files, progress.as_ref())
            .await?;

        let mut record = ContentRecord::new(category, folder_id, request.name.trim());
        record.description = request
            .description
            .into_iter()
            .filter(|d| !d.trim().is_empty())
            .collect();
        record.paragraphs = request
            .paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        record.content_image = cover_url;
        record.location_link = request.location_link;
        record.order = request.order;
        for (kind, url) in &uploaded {
            match kind {
                FileKind::Image => record.images.push(url.clone()),
                FileKind::Audio => record.audios.push(url.clone()),
                FileKind::Other => record.files.push(url.clone()),
            }
        }

        // The one metadata write. Failures here leave the uploaded objects
        // orphaned, which is reported distinctly from an upload failure.
        self.repository
            .write_to(category, &record, true)
            .await
            .map_err(|e| ZiyaratError::MetadataCommit(e.to_string()))?;

        if !uploaded.is_empty() || record.content_image.is_some() {
            self.write_back_reference(category, folder_id).await;
        }

        self.allocator.mark_committed(category, folder_id);
        info!(
            category = %category,
            folder_id,
            files = uploaded.len(),
            "committed content"
        );
        Ok(record)
    }

    /// Edit existing content: upload any new files and merge-write the
    /// record, appending to the stored URL lists.
    pub async fn update(
        &self,
        category: Category,
        folder_id: FolderId,
        request: UpdateRequest,
        progress: Option<watch::Sender<f64>>,
    ) -> Result<ContentRecord> {
        let mut record = self
            .repository
            .get(category, folder_id)
            .await?
            .ok_or_else(|| ZiyaratError::NotFound("content record".to_string()))?;

        if let Some(cover) = &request.cover_image {
            if !cover.content_type.starts_with("image/") {
                return Err(ZiyaratError::Validation(format!(
                    "{} has type {}, which is not a valid image file",
                    cover.filename, cover.content_type
                )));
            }
            self.validate_file(cover)?;
        }
        for file in &request.files {
            self.validate_file(file)?;
        }

        if let Some(cover) = &request.cover_image {
            let url = self
                .upload_cover(category, folder_id, cover, progress.as_ref())
                .await?;
            record.content_image = Some(url);
        }

        let uploaded = self
            .upload_batch(category, folder_id, &request.files, progress.as_ref())
            .await?;

        if let Some(name) = request.name {
            record.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            record.description = description;
        }
        if let Some(paragraphs) = request.paragraphs {
            record.paragraphs = paragraphs;
        }
        if let Some(link) = request.location_link {
            record.location_link = Some(link);
        }
        if let Some(order) = request.order {
            record.order = order;
        }
        for (kind, url) in &uploaded {
            match kind {
                FileKind::Image => record.images.push(url.clone()),
                FileKind::Audio => record.audios.push(url.clone()),
                FileKind::Other => record.files.push(url.clone()),
            }
        }

        self.repository
            .write_to(category, &record, true)
            .await
            .map_err(|e| ZiyaratError::MetadataCommit(e.to_string()))?;

        info!(category = %category, folder_id, "updated content");
        Ok(record)
    }

    /// List a category's records in the given order.
    pub async fn list(&self, category: Category, order: ListOrder) -> Result<Vec<ContentRecord>> {
        self.repository.list(category, order).await
    }

    /// Read one record.
    pub async fn get(
        &self,
        category: Category,
        folder_id: FolderId,
    ) -> Result<Option<ContentRecord>> {
        self.repository.get(category, folder_id).await
    }

    /// Read-back inventory of a folder's stored files.
    ///
    /// Classification is by filename substring; cover images and metadata
    /// blobs are excluded.
    pub async fn existing_files(
        &self,
        category: Category,
        folder_id: FolderId,
    ) -> Result<FolderFiles> {
        let folder = category.folder_path(folder_id);
        let listing = self.objects.list(&folder).await?;

        let mut files = FolderFiles::default();
        for item in listing.items {
            if is_cover_image(&item) || is_metadata_blob(&item) {
                continue;
            }
            let url = self.objects.download_url(&format!("{folder}/{item}")).await?;
            match FileKind::classify(&item) {
                FileKind::Image => files.images.push(url),
                FileKind::Audio => files.audios.push(url),
                FileKind::Other => files.others.push(url),
            }
        }
        Ok(files)
    }

    /// Delete one content item: the metadata record, then a best-effort sweep
    /// of its storage folder.
    ///
    /// Neither store is transactional with the other, so the order does not
    /// affect correctness. Storage failures are logged and swallowed; the
    /// delete still succeeds and may leave orphaned objects. Deleting an item
    /// whose folder is already empty or missing is fine.
    pub async fn delete(&self, category: Category, folder_id: FolderId) -> Result<()> {
        if category.backend() == Backend::Document {
            self.repository.delete(category, folder_id).await?;
        }

        let folder = category.folder_path(folder_id);
        let listing = match self.objects.list(&folder).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(folder, error = %e, "could not list folder for deletion");
                return Ok(());
            }
        };

        for item in &listing.items {
            let path = format!("{folder}/{item}");
            if let Err(e) = self.objects.delete(&path).await {
                warn!(path, error = %e, "could not delete object");
            }
        }

        // Sub-folders are not expected but tolerated; sweep one level down.
        for prefix in &listing.prefixes {
            let sub = format!("{folder}/{prefix}");
            match self.objects.list(&sub).await {
                Ok(sub_listing) => {
                    for item in sub_listing.items {
                        let path = format!("{sub}/{item}");
                        if let Err(e) = self.objects.delete(&path).await {
                            warn!(path, error = %e, "could not delete object");
                        }
                    }
                }
                Err(e) => {
                    warn!(sub, error = %e, "could not list sub-folder for deletion");
                }
            }
        }

        info!(category = %category, folder_id, "deleted content");
        Ok(())
    }

    /// Publish a bulletin for a blob-backed category, with an optional image.
    pub async fn post_bulletin(
        &self,
        category: Category,
        title: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        order: i64,
        image: Option<UploadFile>,
        progress: Option<watch::Sender<f64>>,
    ) -> Result<BulletinRecord> {
        let (title, date, description) = (title.into(), date.into(), description.into());
        if title.trim().is_empty() || date.trim().is_empty() || description.trim().is_empty() {
            return Err(ZiyaratError::Validation(
                "title, date and description are required".to_string(),
            ));
        }
        if let Some(image) = &image {
            if !image.content_type.starts_with("image/") {
                return Err(ZiyaratError::Validation(format!(
                    "{} has type {}, which is not a valid image file",
                    image.filename, image.content_type
                )));
            }
            self.validate_file(image)?;
        }

        let folder_id = self.allocator.next_folder_id(category).await?;

        let mut record = BulletinRecord::new(folder_id, title, date, description);
        record.order = order;

        if let Some(image) = &image {
            let uploaded = self
                .upload_batch(category, folder_id, std::slice::from_ref(image), progress.as_ref())
                .await?;
            record.image_url = uploaded.into_iter().next().map(|(_, url)| url);
        }

        self.bulletins
            .write(category, &record)
            .await
            .map_err(|e| ZiyaratError::MetadataCommit(e.to_string()))?;

        self.allocator.mark_committed(category, folder_id);
        info!(category = %category, folder_id, "posted bulletin");
        Ok(record)
    }

    /// List a blob-backed category's bulletins, folder id ascending.
    pub async fn list_bulletins(&self, category: Category) -> Result<Vec<BulletinRecord>> {
        self.bulletins.list(category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalDocumentStore, LocalObjectStore};
    use tempfile::TempDir;

    fn service() -> (TempDir, TempDir, PublishService, Arc<LocalObjectStore>) {
        let objects_dir = TempDir::new().unwrap();
        let documents_dir = TempDir::new().unwrap();
        let objects = Arc::new(LocalObjectStore::new(objects_dir.path()).unwrap());
        let documents = Arc::new(LocalDocumentStore::new(documents_dir.path()).unwrap());
        let service = PublishService::new(objects.clone(), documents);
        (objects_dir, documents_dir, service, objects)
    }

    fn image(name: &str) -> UploadFile {
        UploadFile::image(name, "image/jpeg", b"jpeg bytes".to_vec())
    }

    #[tokio::test]
    async fn test_commit_requires_name() {
        let (_o, _d, service, _) = service();
        let result = service
            .commit(Category::Demo, CommitRequest::new("   "), None)
            .await;
        assert!(matches!(result, Err(ZiyaratError::Validation(_))));
    }

    #[tokio::test]
    async fn test_commit_rejects_mismatched_kind() {
        let (_o, _d, service, _) = service();
        let request = CommitRequest::new("Arafat").with_file(UploadFile::audio(
            "talk.pdf",
            "application/pdf",
            b"pdf".to_vec(),
        ));
        let result = service.commit(Category::Demo, request, None).await;
        assert!(matches!(result, Err(ZiyaratError::Validation(_))));
    }

    #[tokio::test]
    async fn test_commit_rejects_oversized_file() {
        let (_o, _d, service, _) = service();
        let service = service.with_max_upload_size(10);
        let request = CommitRequest::new("Arafat").with_file(UploadFile::other(
            "big.bin",
            "application/octet-stream",
            vec![0u8; 64],
        ));
        let result = service.commit(Category::Demo, request, None).await;
        assert!(matches!(result, Err(ZiyaratError::Validation(_))));
    }

    #[tokio::test]
    async fn test_commit_rejects_blob_category() {
        let (_o, _d, service, _) = service();
        let result = service
            .commit(Category::LiveUpdates, CommitRequest::new("x"), None)
            .await;
        assert!(matches!(result, Err(ZiyaratError::Validation(_))));
    }

    #[tokio::test]
    async fn test_commit_stores_files_under_allocated_folder() {
        let (_o, _d, service, objects) = service();
        let request = CommitRequest::new("Mount Arafat")
            .with_cover_image(image("cover.jpg"))
            .with_file(image("photo.jpg"))
            .with_file(UploadFile::audio("dua.mp3", "audio/mpeg", b"mp3".to_vec()));

        let record = service.commit(Category::Demo, request, None).await.unwrap();
        assert_eq!(record.folder_id, 1);
        assert!(record.content_image.is_some());
        assert_eq!(record.images.len(), 1);
        assert_eq!(record.audios.len(), 1);

        let listing = objects.list("demo/1").await.unwrap();
        assert!(listing
            .items
            .iter()
            .any(|name| name.starts_with("content_image_") && name.ends_with(".jpg")));
        assert!(listing.items.iter().any(|name| name.starts_with("image_")));
        assert!(listing
            .items
            .iter()
            .any(|name| name.starts_with("audio_") && name.ends_with(".mp3")));
        assert!(listing.items.iter().any(|name| name == METADATA_BLOB_NAME));
    }

    #[tokio::test]
    async fn test_commit_filters_empty_description_and_paragraphs() {
        let (_o, _d, service, _) = service();
        let request = CommitRequest::new("Quba")
            .with_description(vec!["First mosque.".to_string(), "  ".to_string()])
            .with_paragraphs(vec![Paragraph::default(), Paragraph::new("History", "…")]);

        let record = service.commit(Category::Demo, request, None).await.unwrap();
        assert_eq!(record.description.len(), 1);
        assert_eq!(record.paragraphs.len(), 1);
    }

    #[tokio::test]
    async fn test_text_only_commit_writes_no_back_reference() {
        let (_o, _d, service, objects) = service();
        let record = service
            .commit(Category::Demo, CommitRequest::new("Plain"), None)
            .await
            .unwrap();

        let listing = objects.list(&format!("demo/{}", record.folder_id)).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_commits_advance_folder_id() {
        let (_o, _d, service, _) = service();
        let first = service
            .commit(Category::Demo, CommitRequest::new("one"), None)
            .await
            .unwrap();
        let second = service
            .commit(Category::Demo, CommitRequest::new("two"), None)
            .await
            .unwrap();
        assert_eq!(first.folder_id, 1);
        assert_eq!(second.folder_id, 2);
    }

    #[tokio::test]
    async fn test_update_appends_urls_and_replaces_scalars() {
        let (_o, _d, service, _) = service();
        let request = CommitRequest::new("Uhud").with_file(image("a.jpg"));
        let record = service.commit(Category::Demo, request, None).await.unwrap();
        assert_eq!(record.images.len(), 1);

        let update = UpdateRequest {
            name: Some("Mount Uhud".to_string()),
            order: Some(4),
            files: vec![image("b.jpg")],
            ..UpdateRequest::default()
        };
        let updated = service
            .update(Category::Demo, record.folder_id, update, None)
            .await
            .unwrap();

        assert_eq!(updated.name, "Mount Uhud");
        assert_eq!(updated.order, 4);
        assert_eq!(updated.images.len(), 2);

        let stored = service.get(Category::Demo, record.folder_id).await.unwrap().unwrap();
        assert_eq!(stored.images.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let (_o, _d, service, _) = service();
        let result = service
            .update(Category::Demo, 99, UpdateRequest::default(), None)
            .await;
        assert!(matches!(result, Err(ZiyaratError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_existing_files_classification() {
        let (_o, _d, service, objects) = service();
        for (name, content_type) in [
            ("demo/1/content_image_1700000000000.jpg", "image/jpeg"),
            ("demo/1/image_1700000000001.jpg", "image/jpeg"),
            ("demo/1/audio_1700000000002.mp3", "audio/mpeg"),
            ("demo/1/file_1700000000003.pdf", "application/pdf"),
            ("demo/1/content_metadata.json", "application/json"),
        ] {
            objects
                .upload(name, b"x".to_vec(), content_type, crate::store::TaskProgress::standalone())
                .await
                .unwrap();
        }

        let files = service.existing_files(Category::Demo, 1).await.unwrap();
        assert_eq!(files.images.len(), 1);
        assert_eq!(files.audios.len(), 1);
        assert_eq!(files.others.len(), 1);
    }

    #[tokio::test]
    async fn test_post_bulletin_requires_all_fields() {
        let (_o, _d, service, _) = service();
        let result = service
            .post_bulletin(Category::LiveUpdates, "t", "", "d", 0, None, None)
            .await;
        assert!(matches!(result, Err(ZiyaratError::Validation(_))));
    }

    #[tokio::test]
    async fn test_post_bulletin_roundtrip() {
        let (_o, _d, service, _) = service();
        let posted = service
            .post_bulletin(
                Category::LiveUpdates,
                "Tawaf level closed",
                "2026-08-07",
                "Mataf upper deck closed for maintenance.",
                0,
                Some(image("notice.jpg")),
                None,
            )
            .await
            .unwrap();
        assert_eq!(posted.folder_id, 1);
        assert!(posted.image_url.is_some());

        let bulletins = service.list_bulletins(Category::LiveUpdates).await.unwrap();
        assert_eq!(bulletins.len(), 1);
        assert_eq!(bulletins[0].title, "Tawaf level closed");
    }
}
