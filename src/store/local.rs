//! Local filesystem backends.
//!
//! Used when the remote service is unconfigured (degraded mode) and by tests.
//! The on-disk layout mirrors the remote path convention exactly:
//! `{base}/{category}/{folderId}/{leaf}` for objects and
//! `{base}/{collection}/{id}.json` for documents.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use crate::store::document::{DocumentStore, QueryOrder};
use crate::store::object::{ObjectListing, ObjectStore};
use crate::store::progress::TaskProgress;
use crate::{Result, ZiyaratError};

/// Disk-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        let base_path = std::fs::canonicalize(&base_path)?;
        Ok(Self { base_path })
    }

    /// Base directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path.trim_matches('/'))
    }

    fn file_url(&self, path: &str) -> String {
        format!("file://{}", self.object_path(path).display())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list(&self, prefix: &str) -> Result<ObjectListing> {
        let dir = self.object_path(prefix);
        let mut listing = ObjectListing::default();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // A path with no children lists as empty, same as the remote API.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(listing),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                listing.prefixes.push(name);
            } else {
                listing.items.push(name);
            }
        }
        listing.prefixes.sort();
        listing.items.sort();
        Ok(listing)
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        progress: TaskProgress,
    ) -> Result<String> {
        let file_path = self.object_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file_path, &bytes).await?;
        progress.finish();
        Ok(self.file_url(path))
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        match fs::read(self.object_path(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ZiyaratError::NotFound(format!("object {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let file_path = self.object_path(path);
        match fs::try_exists(&file_path).await {
            Ok(true) => Ok(self.file_url(path)),
            Ok(false) => Err(ZiyaratError::NotFound(format!("object {path}"))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.object_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ZiyaratError::NotFound(format!("object {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Disk-backed document store, one JSON file per document.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    base_path: PathBuf,
}

impl LocalDocumentStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base_path.join(collection).join(format!("{id}.json"))
    }
}

/// Lay the top-level fields of `incoming` over `existing`.
fn merge_documents(existing: Value, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut base), Value::Object(update)) => {
            for (key, value) in update {
                base.insert(key.clone(), value.clone());
            }
            Value::Object(base)
        }
        (_, incoming) => incoming.clone(),
    }
}

/// Order two documents by a field, mirroring the remote query semantics:
/// numbers compare numerically, strings lexicographically, missing fields
/// sort first.
fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let av = a.get(field);
    let bv = b.get(field);
    match (av, bv) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn set(&self, collection: &str, id: &str, value: &Value, merge: bool) -> Result<()> {
        let path = self.doc_path(collection, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let document = if merge {
            match fs::read(&path).await {
                Ok(bytes) => {
                    let existing: Value = serde_json::from_slice(&bytes).map_err(|e| {
                        ZiyaratError::Document(format!("corrupt document {collection}/{id}: {e}"))
                    })?;
                    merge_documents(existing, value)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => value.clone(),
                Err(e) => return Err(e.into()),
            }
        } else {
            value.clone()
        };

        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| ZiyaratError::Document(format!("encode {collection}/{id}: {e}")))?;
        fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        match fs::read(self.doc_path(collection, id)).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    ZiyaratError::Document(format!("corrupt document {collection}/{id}: {e}"))
                })?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn query(&self, collection: &str, order: &QueryOrder) -> Result<Vec<(String, Value)>> {
        let dir = self.base_path.join(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(id) = name.strip_suffix(".json") else {
                continue;
            };
            let bytes = fs::read(entry.path()).await?;
            let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                ZiyaratError::Document(format!("corrupt document {collection}/{id}: {e}"))
            })?;
            documents.push((id.to_string(), value));
        }

        documents.sort_by(|(_, a), (_, b)| compare_field(a, b, &order.field));
        if order.descending {
            documents.reverse();
        }
        Ok(documents)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        match fs::remove_file(self.doc_path(collection, id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
