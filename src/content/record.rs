//! Content record types shared by every portal feature area.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Positive integer identifying one content item's storage folder and
/// metadata document within a category.
pub type FolderId = u64;

/// Persistence backend for a feature area.
///
/// The two backends are distinct and non-interoperable: a category reads and
/// writes exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Metadata lives in a document-store collection keyed by folder id.
    Document,
    /// The whole record lives as a JSON blob inside the storage folder.
    Blob,
}

/// Closed set of category tags partitioning storage paths and metadata
/// collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hajj,
    Umrah,
    Madina,
    Demo,
    HistoricMakkah,
    HistoricMadina,
    TravelAdvisories,
    LiveUpdates,
    UpcomingEvents,
}

impl Category {
    /// Object-store path segment under which this category's folders live.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            Category::Hajj => "hajj",
            Category::Umrah => "umrah",
            Category::Madina => "madina",
            Category::Demo => "demo",
            Category::HistoricMakkah => "historic_places_makkah",
            Category::HistoricMadina => "historic_places_madina",
            Category::TravelAdvisories => "travel_advisories",
            Category::LiveUpdates => "live_updates",
            Category::UpcomingEvents => "upcoming_events",
        }
    }

    /// Document-store collection holding this category's records.
    ///
    /// Blob-backed categories have no collection and return `None`.
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            Category::Hajj => Some("hajj_uploads"),
            Category::Umrah => Some("umrah_uploads"),
            Category::Madina => Some("madina_uploads"),
            Category::Demo => Some("demo_uploads"),
            Category::HistoricMakkah => Some("historic_places_makkah"),
            Category::HistoricMadina => Some("historic_places_madina"),
            Category::TravelAdvisories => Some("travel_advisories"),
            Category::LiveUpdates | Category::UpcomingEvents => None,
        }
    }

    /// Which persistence backend this feature area uses.
    pub fn backend(&self) -> Backend {
        match self {
            Category::LiveUpdates | Category::UpcomingEvents => Backend::Blob,
            _ => Backend::Document,
        }
    }

    /// Leaf name of the JSON blob for blob-backed categories.
    pub fn blob_slug(&self) -> Option<&'static str> {
        match self {
            Category::LiveUpdates => Some("update_data"),
            Category::UpcomingEvents => Some("event_data"),
            _ => None,
        }
    }

    /// Short tag stored inside records (`category` field).
    pub fn record_tag(&self) -> &'static str {
        match self {
            Category::HistoricMakkah => "makkah",
            Category::HistoricMadina => "madina",
            other => other.storage_prefix(),
        }
    }

    /// Storage path of one content folder: `{prefix}/{folderId}`.
    pub fn folder_path(&self, folder_id: FolderId) -> String {
        format!("{}/{}", self.storage_prefix(), folder_id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_prefix())
    }
}

/// One titled paragraph with its ordered description blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph title.
    pub title: String,
    /// Ordered description blocks.
    #[serde(default)]
    pub description: Vec<String>,
}

impl Paragraph {
    /// Create a paragraph with a title and one description block.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: vec![description.into()],
        }
    }

    /// True when both the title and every description block are blank.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.iter().all(|d| d.trim().is_empty())
    }
}

/// Kind of an uploaded file, used for the stored-filename prefix and for the
/// partitioned URL lists on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Audio,
    Other,
}

impl FileKind {
    /// Stored-filename prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Audio => "audio",
            FileKind::Other => "file",
        }
    }

    /// Derive the kind from a declared MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            FileKind::Image
        } else if content_type.starts_with("audio/") {
            FileKind::Audio
        } else {
            FileKind::Other
        }
    }

    /// Whether a declared MIME type is acceptable for this kind.
    ///
    /// Image and audio slots only accept their own types; the other slot
    /// accepts anything.
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        match self {
            FileKind::Image => content_type.starts_with("image/"),
            FileKind::Audio => content_type.starts_with("audio/"),
            FileKind::Other => true,
        }
    }

    /// Classify a stored leaf name by substring match.
    ///
    /// Stored data carries no kind field, so read-back classification follows
    /// the filename convention. Cover images and metadata blobs must be
    /// filtered out with [`is_cover_image`] / [`is_metadata_blob`] first.
    pub fn classify(stored_name: &str) -> Self {
        if stored_name.contains("image_") && !is_cover_image(stored_name) {
            FileKind::Image
        } else if stored_name.contains("audio_")
            || stored_name.ends_with(".mp3")
            || stored_name.ends_with(".wav")
        {
            FileKind::Audio
        } else {
            FileKind::Other
        }
    }
}

/// True when a stored leaf name is the folder's cover image.
pub fn is_cover_image(stored_name: &str) -> bool {
    stored_name.contains("content_image_")
}

/// True when a stored leaf name is the back-reference metadata blob.
pub fn is_metadata_blob(stored_name: &str) -> bool {
    stored_name.contains("content_metadata")
}

/// Extract the file extension from a filename. Returns "bin" when missing.
pub fn extract_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin")
}

/// Stored leaf name for a cover image: `content_image_{millis}.{ext}`,
/// lowercase. The millisecond timestamp avoids collisions within one folder.
pub fn cover_stored_name(epoch_millis: i64, original_name: &str) -> String {
    let ext = extract_extension(original_name);
    format!("content_image_{epoch_millis}.{ext}").to_lowercase()
}

/// Stored leaf name for a batch file: `{kind}_{millis}.{ext}`, lowercase.
///
/// Callers add the file's index to the timestamp to disambiguate files picked
/// up in the same millisecond.
pub fn batch_stored_name(kind: FileKind, epoch_millis: i64, original_name: &str) -> String {
    let ext = extract_extension(original_name);
    format!("{}_{epoch_millis}.{ext}", kind.prefix()).to_lowercase()
}

/// Persisted metadata for one content item.
///
/// The serialized shape matches the stored documents field for field, so
/// records written by earlier frontends read back without migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Display name.
    pub name: String,
    /// Free-text description blocks, in order.
    #[serde(default)]
    pub description: Vec<String>,
    /// Titled paragraphs, in order.
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    /// Cover image URL, when one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_image: Option<String>,
    /// Uploaded image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Uploaded audio URLs.
    #[serde(default)]
    pub audios: Vec<String>,
    /// Uploaded other-file URLs.
    #[serde(default)]
    pub files: Vec<String>,
    /// Map or location URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_link: Option<String>,
    /// Record tag of the owning category.
    pub category: String,
    /// Manual sort order; lower sorts first.
    #[serde(default)]
    pub order: i64,
    /// Creation time, ISO-8601.
    pub timestamp: DateTime<Utc>,
    /// Owning folder id.
    #[serde(rename = "folderId")]
    pub folder_id: FolderId,
}

impl ContentRecord {
    /// Create a record with the required fields.
    pub fn new(category: Category, folder_id: FolderId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Vec::new(),
            paragraphs: Vec::new(),
            content_image: None,
            images: Vec::new(),
            audios: Vec::new(),
            files: Vec::new(),
            location_link: None,
            category: category.record_tag().to_string(),
            order: 0,
            timestamp: Utc::now(),
            folder_id,
        }
    }

    /// Document id for this record.
    pub fn doc_id(&self) -> String {
        self.folder_id.to_string()
    }
}
