//! Folder allocation and the upload-commit pipeline.

mod allocator;
mod service;

pub use allocator::FolderAllocator;
pub use service::{
    CommitRequest, FolderFiles, PublishService, UpdateRequest, UploadFile,
};

/// Maximum length for a content name (in characters).
pub const MAX_NAME_LENGTH: usize = 200;

/// Default maximum upload size (50MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;
