//! Content model and persistence for the portal feature areas.

mod bulletin;
mod record;
mod repository;

pub use bulletin::{BulletinRecord, BulletinStore};
pub use record::{
    batch_stored_name, cover_stored_name, extract_extension, is_cover_image, is_metadata_blob,
    Backend, Category, ContentRecord, FileKind, FolderId, Paragraph,
};
pub use repository::{ContentRepository, ListOrder};

/// Leaf name of the back-reference blob written next to uploaded files.
pub const METADATA_BLOB_NAME: &str = "content_metadata.json";
