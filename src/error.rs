//! Error types for ziyarat.

use thiserror::Error;

/// Common error type for ziyarat operations.
#[derive(Error, Debug)]
pub enum ZiyaratError {
    /// Required service credentials are missing or placeholders.
    ///
    /// Surfaced once at startup; the crate degrades to local-only behavior
    /// instead of crashing.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anonymous sign-in failed.
    ///
    /// Non-fatal: upload operations remain callable and fail downstream.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The folder-id listing failed, so no folder id can be allocated.
    ///
    /// Callers must not start uploads and should retry the whole operation.
    #[error("folder allocator unavailable: {0}")]
    AllocatorUnavailable(String),

    /// One file's transfer reached a terminal failure state.
    ///
    /// Reported per file. Sibling uploads already in flight are not cancelled,
    /// and objects they stored are not rolled back.
    #[error("upload failed for {filename}: {reason}")]
    UploadFailed { filename: String, reason: String },

    /// The metadata record write failed after every upload succeeded.
    ///
    /// The uploaded objects remain in storage with no record referencing them.
    #[error("metadata commit failed: {0}")]
    MetadataCommit(String),

    /// Required form fields empty, or a file's declared type does not match
    /// the expected kind. Rejected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Object store error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Document store error.
    #[error("document store error: {0}")]
    Document(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ziyarat operations.
pub type Result<T> = std::result::Result<T, ZiyaratError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ZiyaratError::Config("api_key is a placeholder".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: api_key is a placeholder"
        );
    }

    #[test]
    fn test_allocator_error_display() {
        let err = ZiyaratError::AllocatorUnavailable("listing timed out".to_string());
        assert_eq!(
            err.to_string(),
            "folder allocator unavailable: listing timed out"
        );
    }

    #[test]
    fn test_upload_failed_display() {
        let err = ZiyaratError::UploadFailed {
            filename: "image_1700000000000.jpg".to_string(),
            reason: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "upload failed for image_1700000000000.jpg: connection reset"
        );
    }

    #[test]
    fn test_metadata_commit_distinct_from_upload_failed() {
        let commit = ZiyaratError::MetadataCommit("write denied".to_string());
        assert!(matches!(commit, ZiyaratError::MetadataCommit(_)));
        assert!(!matches!(commit, ZiyaratError::UploadFailed { .. }));
        assert_eq!(commit.to_string(), "metadata commit failed: write denied");
    }

    #[test]
    fn test_not_found_display() {
        let err = ZiyaratError::NotFound("content record".to_string());
        assert_eq!(err.to_string(), "content record not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ZiyaratError = io_err.into();
        assert!(matches!(err, ZiyaratError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(7)
        }

        fn sample_err() -> Result<i32> {
            Err(ZiyaratError::Validation("name is required".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 7);
        assert!(sample_err().is_err());
    }
}
