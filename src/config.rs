//! Configuration module for ziyarat.

use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::{Result, ZiyaratError};

/// Placeholder marker left in unconfigured credential values.
const PLACEHOLDER_MARKER: &str = "YOUR_";

/// Remote service credentials.
///
/// Read once at startup. When any value is a placeholder the crate degrades to
/// local-only behavior: authentication is skipped and the remote store
/// constructors refuse with a configuration error.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// API key for the identity and storage services.
    #[serde(default)]
    pub api_key: String,
    /// Authentication domain.
    #[serde(default)]
    pub auth_domain: String,
    /// Project identifier.
    #[serde(default)]
    pub project_id: String,
    /// Object storage bucket name.
    #[serde(default)]
    pub storage_bucket: String,
    /// Messaging sender id.
    #[serde(default)]
    pub messaging_sender_id: String,
    /// Application id.
    #[serde(default)]
    pub app_id: String,
}

impl ServiceConfig {
    /// Whether every credential has an actual value.
    pub fn is_configured(&self) -> bool {
        [
            &self.api_key,
            &self.auth_domain,
            &self.project_id,
            &self.storage_bucket,
            &self.messaging_sender_id,
            &self.app_id,
        ]
        .iter()
        .all(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
    }

    /// Error unless the service is fully configured.
    pub fn require_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ZiyaratError::Config(
                "service credentials missing or placeholder".to_string(),
            ))
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_domain: String::new(),
            project_id: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
        }
    }
}

/// Local storage configuration (degraded mode and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base directory for the local object store.
    #[serde(default = "default_objects_path")]
    pub objects_path: String,
    /// Base directory for the local document store.
    #[serde(default = "default_documents_path")]
    pub documents_path: String,
}

fn default_objects_path() -> String {
    "data/objects".to_string()
}

fn default_documents_path() -> String {
    "data/documents".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            objects_path: default_objects_path(),
            documents_path: default_documents_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/ziyarat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote service credentials.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Local storage paths.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ZiyaratError::Config(format!("failed to parse config: {e}")))
    }

    /// Build configuration from `FIREBASE_*` environment variables.
    ///
    /// Missing variables become empty strings, which count as placeholders.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).unwrap_or_default();

        Self {
            service: ServiceConfig {
                api_key: var("FIREBASE_API_KEY"),
                auth_domain: var("FIREBASE_AUTH_DOMAIN"),
                project_id: var("FIREBASE_PROJECT_ID"),
                storage_bucket: var("FIREBASE_STORAGE_BUCKET"),
                messaging_sender_id: var("FIREBASE_MESSAGING_SENDER_ID"),
                app_id: var("FIREBASE_APP_ID"),
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_service() -> ServiceConfig {
        ServiceConfig {
            api_key: "AIzaTest".to_string(),
            auth_domain: "test.firebaseapp.com".to_string(),
            project_id: "test-project".to_string(),
            storage_bucket: "test-project.appspot.com".to_string(),
            messaging_sender_id: "1234567890".to_string(),
            app_id: "1:1234567890:web:abc".to_string(),
        }
    }

    #[test]
    fn test_default_is_not_configured() {
        assert!(!ServiceConfig::default().is_configured());
    }

    #[test]
    fn test_full_config_is_configured() {
        assert!(full_service().is_configured());
    }

    #[test]
    fn test_placeholder_value_is_not_configured() {
        let mut service = full_service();
        service.api_key = "YOUR_API_KEY".to_string();
        assert!(!service.is_configured());
    }

    #[test]
    fn test_empty_value_is_not_configured() {
        let mut service = full_service();
        service.storage_bucket = String::new();
        assert!(!service.is_configured());
    }

    #[test]
    fn test_require_configured_error() {
        let result = ServiceConfig::default().require_configured();
        assert!(matches!(result, Err(ZiyaratError::Config(_))));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[service]
api_key = "AIzaTest"
project_id = "test-project"

[storage]
objects_path = "/tmp/objects"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.api_key, "AIzaTest");
        assert_eq!(config.service.project_id, "test-project");
        // Unset credentials default to empty, so the service is unconfigured.
        assert!(!config.service.is_configured());
        assert_eq!(config.storage.objects_path, "/tmp/objects");
        assert_eq!(config.storage.documents_path, "data/documents");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.objects_path, "data/objects");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/ziyarat.log");
    }
}
