//! Storage backends for the portal.
//!
//! Two collaborator interfaces, each with a local filesystem backend for
//! degraded mode and tests and a remote REST backend for production:
//! - [`ObjectStore`] — hierarchical binary objects with resumable-style
//!   progress reporting
//! - [`DocumentStore`] — JSON records addressed by (collection, id)

mod document;
mod firebase;
mod local;
mod object;
mod progress;

pub use document::{DocumentStore, QueryOrder};
pub use firebase::{FirebaseDocumentStore, FirebaseObjectStore};
pub use local::{LocalDocumentStore, LocalObjectStore};
pub use object::{ObjectListing, ObjectStore};
pub use progress::{BatchProgress, TaskProgress};
