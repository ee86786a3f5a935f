//! Remote REST backends for the production service.
//!
//! `FirebaseObjectStore` talks to the storage API
//! (`firebasestorage.googleapis.com/v0`), `FirebaseDocumentStore` to the
//! document API (`firestore.googleapis.com/v1`). Both attach the anonymous
//! bearer token when one is cached and refuse to construct from a placeholder
//! configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::Authenticator;
use crate::config::ServiceConfig;
use crate::store::document::{DocumentStore, QueryOrder};
use crate::store::object::{ObjectListing, ObjectStore};
use crate::store::progress::TaskProgress;
use crate::{Result, ZiyaratError};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds; uploads can be large.
const TOTAL_TIMEOUT_SECS: u64 = 300;

/// User agent for the portal backend.
const USER_AGENT: &str = "ziyarat/0.1";

fn build_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ZiyaratError::Storage(format!("failed to create HTTP client: {e}")))
}

fn leaf_name(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    prefixes: Vec<String>,
    #[serde(default)]
    items: Vec<ItemRef>,
}

#[derive(Debug, Deserialize)]
struct ItemRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(default, rename = "downloadTokens")]
    download_tokens: Option<String>,
}

/// Storage REST backend.
pub struct FirebaseObjectStore {
    http: Client,
    bucket: String,
    auth: Arc<Authenticator>,
}

impl FirebaseObjectStore {
    /// Create a store for the configured bucket.
    pub fn new(config: &ServiceConfig, auth: Arc<Authenticator>) -> Result<Self> {
        config.require_configured()?;
        Ok(Self {
            http: build_client()?,
            bucket: config.storage_bucket.clone(),
            auth,
        })
    }

    fn objects_endpoint(&self) -> String {
        format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o",
            self.bucket
        )
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.objects_endpoint(),
            urlencoding::encode(path)
        )
    }

    fn media_url(&self, path: &str, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("{}?alt=media&token={token}", self.object_url(path)),
            None => format!("{}?alt=media", self.object_url(path)),
        }
    }

    async fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.bearer().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for FirebaseObjectStore {
    async fn list(&self, prefix: &str) -> Result<ObjectListing> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        let request = self
            .http
            .get(self.objects_endpoint())
            .query(&[("prefix", prefix.as_str()), ("delimiter", "/")]);
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("list {prefix}: {e}")))?;

        if !response.status().is_success() {
            return Err(ZiyaratError::Storage(format!(
                "list {prefix}: HTTP {}",
                response.status()
            )));
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("list {prefix}: {e}")))?;

        Ok(ObjectListing {
            prefixes: body.prefixes.iter().map(|p| leaf_name(p)).collect(),
            items: body.items.iter().map(|i| leaf_name(&i.name)).collect(),
        })
    }

    /// Single-request upload; per-file progress moves 0 -> 1 at the terminal
    /// state. The aggregate math upstream is unaffected.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: TaskProgress,
    ) -> Result<String> {
        progress.set(0.0);
        let request = self
            .http
            .post(self.objects_endpoint())
            .query(&[("name", path), ("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("upload {path}: {e}")))?;

        if !response.status().is_success() {
            return Err(ZiyaratError::Storage(format!(
                "upload {path}: HTTP {}",
                response.status()
            )));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("upload {path}: {e}")))?;

        progress.finish();
        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next());
        Ok(self.media_url(path, token))
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let request = self.http.get(self.media_url(path, None));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("fetch {path}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ZiyaratError::NotFound(format!("object {path}")));
        }
        if !response.status().is_success() {
            return Err(ZiyaratError::Storage(format!(
                "fetch {path}: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("fetch {path}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let request = self.http.get(self.object_url(path));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("metadata {path}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ZiyaratError::NotFound(format!("object {path}")));
        }
        if !response.status().is_success() {
            return Err(ZiyaratError::Storage(format!(
                "metadata {path}: HTTP {}",
                response.status()
            )));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("metadata {path}: {e}")))?;
        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next());
        Ok(self.media_url(path, token))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.http.delete(self.object_url(path));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Storage(format!("delete {path}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ZiyaratError::NotFound(format!("object {path}")));
        }
        if !response.status().is_success() {
            return Err(ZiyaratError::Storage(format!(
                "delete {path}: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

/// Encode a JSON value into the document API's typed value representation.
fn to_api_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Integers travel as strings in the wire format.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_api_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": { "fields": encode_fields(map) }
        }),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    let mut fields = Map::new();
    for (key, value) in map {
        fields.insert(key.clone(), to_api_value(value));
    }
    Value::Object(fields)
}

/// Decode one typed API value back into plain JSON.
fn from_api_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    if map.contains_key("nullValue") {
        Value::Null
    } else if let Some(b) = map.get("booleanValue") {
        b.clone()
    } else if let Some(i) = map.get("integerValue") {
        i.as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(|n| json!(n))
            .unwrap_or(Value::Null)
    } else if let Some(d) = map.get("doubleValue") {
        d.clone()
    } else if let Some(s) = map.get("stringValue") {
        s.clone()
    } else if let Some(ts) = map.get("timestampValue") {
        ts.clone()
    } else if let Some(array) = map.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(from_api_value).collect())
            .unwrap_or_default();
        Value::Array(values)
    } else if let Some(inner) = map.get("mapValue") {
        decode_fields(inner.get("fields"))
    } else {
        Value::Null
    }
}

fn decode_fields(fields: Option<&Value>) -> Value {
    let mut out = Map::new();
    if let Some(Value::Object(map)) = fields {
        for (key, value) in map {
            out.insert(key.clone(), from_api_value(value));
        }
    }
    Value::Object(out)
}

/// Document REST backend.
pub struct FirebaseDocumentStore {
    http: Client,
    project_id: String,
    auth: Arc<Authenticator>,
}

impl FirebaseDocumentStore {
    /// Create a store for the configured project.
    pub fn new(config: &ServiceConfig, auth: Arc<Authenticator>) -> Result<Self> {
        config.require_configured()?;
        Ok(Self {
            http: build_client()?,
            project_id: config.project_id.clone(),
            auth,
        })
    }

    fn documents_endpoint(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_endpoint())
    }

    async fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.bearer().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirebaseDocumentStore {
    async fn set(&self, collection: &str, id: &str, value: &Value, merge: bool) -> Result<()> {
        let fields = value.as_object().ok_or_else(|| {
            ZiyaratError::Document(format!("document {collection}/{id} must be an object"))
        })?;

        let mut query: Vec<(String, String)> = Vec::new();
        if merge {
            // An update mask limited to the written fields leaves the rest of
            // the document untouched.
            for key in fields.keys() {
                query.push(("updateMask.fieldPaths".to_string(), key.clone()));
            }
        }

        let request = self
            .http
            .patch(self.doc_url(collection, id))
            .query(&query)
            .json(&json!({ "fields": encode_fields(fields) }));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Document(format!("set {collection}/{id}: {e}")))?;

        if !response.status().is_success() {
            return Err(ZiyaratError::Document(format!(
                "set {collection}/{id}: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let request = self.http.get(self.doc_url(collection, id));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Document(format!("get {collection}/{id}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ZiyaratError::Document(format!(
                "get {collection}/{id}: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Document(format!("get {collection}/{id}: {e}")))?;
        Ok(Some(decode_fields(body.get("fields"))))
    }

    async fn query(&self, collection: &str, order: &QueryOrder) -> Result<Vec<(String, Value)>> {
        let direction = if order.descending { "desc" } else { "asc" };
        let request = self
            .http
            .get(format!("{}/{collection}", self.documents_endpoint()))
            .query(&[
                ("orderBy", format!("{} {direction}", order.field)),
                ("pageSize", "300".to_string()),
            ]);
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Document(format!("query {collection}: {e}")))?;

        if !response.status().is_success() {
            return Err(ZiyaratError::Document(format!(
                "query {collection}: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Document(format!("query {collection}: {e}")))?;

        let mut documents = Vec::new();
        if let Some(items) = body.get("documents").and_then(Value::as_array) {
            for item in items {
                let id = item
                    .get("name")
                    .and_then(Value::as_str)
                    .map(leaf_name)
                    .unwrap_or_default();
                documents.push((id, decode_fields(item.get("fields"))));
            }
        }
        Ok(documents)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let request = self.http.delete(self.doc_url(collection, id));
        let response = self
            .authed(request)
            .await
            .send()
            .await
            .map_err(|e| ZiyaratError::Document(format!("delete {collection}/{id}: {e}")))?;

        // Deleting a missing document is a no-op, like the SDK.
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(ZiyaratError::Document(format!(
            "delete {collection}/{id}: HTTP {}",
            response.status()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("demo/1/"), "1");
        assert_eq!(leaf_name("demo/1/image_1.jpg"), "image_1.jpg");
        assert_eq!(
            leaf_name("projects/p/databases/(default)/documents/demo_uploads/4"),
            "4"
        );
        assert_eq!(leaf_name("plain"), "plain");
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(to_api_value(&json!(null)), json!({ "nullValue": null }));
        assert_eq!(to_api_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(
            to_api_value(&json!(42)),
            json!({ "integerValue": "42" })
        );
        assert_eq!(
            to_api_value(&json!(2.5)),
            json!({ "doubleValue": 2.5 })
        );
        assert_eq!(
            to_api_value(&json!("makkah")),
            json!({ "stringValue": "makkah" })
        );
    }

    #[test]
    fn test_codec_roundtrip_record_shape() {
        let original = json!({
            "name": "Cave of Hira",
            "folderId": 3,
            "order": 0,
            "images": ["https://example.com/a.jpg", "https://example.com/b.jpg"],
            "paragraphs": [
                { "title": "History", "description": ["First revelation."] }
            ],
            "content_image": "https://example.com/cover.jpg",
            "timestamp": "2026-02-01T10:00:00Z"
        });

        let encoded = to_api_value(&original);
        let decoded = from_api_value(&encoded);
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_timestamp_value() {
        let api = json!({ "timestampValue": "2026-02-01T10:00:00Z" });
        assert_eq!(from_api_value(&api), json!("2026-02-01T10:00:00Z"));
    }

    #[test]
    fn test_decode_missing_fields_is_empty_object() {
        assert_eq!(decode_fields(None), json!({}));
    }

    #[test]
    fn test_constructors_refuse_placeholder_config() {
        let config = ServiceConfig::default();
        let auth = Arc::new(Authenticator::new(&config).unwrap());
        assert!(matches!(
            FirebaseObjectStore::new(&config, Arc::clone(&auth)),
            Err(ZiyaratError::Config(_))
        ));
        assert!(matches!(
            FirebaseDocumentStore::new(&config, auth),
            Err(ZiyaratError::Config(_))
        ));
    }
}
