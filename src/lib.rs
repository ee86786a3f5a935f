//! ziyarat - content backend for a pilgrimage information portal.
//!
//! Operators publish structured content (historic places, rituals, live
//! updates, travel advisories, events): text with attached media is uploaded
//! into integer-named storage folders and described by one metadata record
//! per folder. This crate owns the folder-id allocation and upload-commit
//! protocol plus the symmetric listing/edit/delete path; the browser UI is a
//! separate consumer.

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod publish;
pub mod store;

pub use auth::Authenticator;
pub use config::{Config, LoggingConfig, ServiceConfig, StorageConfig};
pub use content::{
    Backend, BulletinRecord, BulletinStore, Category, ContentRecord, ContentRepository, FileKind,
    FolderId, ListOrder, Paragraph,
};
pub use error::{Result, ZiyaratError};
pub use publish::{
    CommitRequest, FolderAllocator, FolderFiles, PublishService, UpdateRequest, UploadFile,
};
pub use store::{
    BatchProgress, DocumentStore, FirebaseDocumentStore, FirebaseObjectStore, LocalDocumentStore,
    LocalObjectStore, ObjectListing, ObjectStore, QueryOrder, TaskProgress,
};
