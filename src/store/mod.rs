/*!
 * Document store access.
 *
 * All jobs talk to the database through the `DocumentStore` trait:
 * - `sqlite`: local SQLite file, the default backend
 * - `memory`: in-process maps for tests and dry runs
 * - `firestore`: Cloud Firestore over its REST API
 *
 * A store handle is opened once by the caller with `open_store` and passed
 * explicitly to every job that needs it.
 */

use async_trait::async_trait;
use log::info;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::app_config::{StoreBackend, StoreConfig};
use crate::errors::StoreError;

pub mod batch;
pub mod firestore;
pub mod memory;
pub mod sqlite;

pub use batch::{BatchSummary, BatchWriter};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Maximum number of writes a single batch may carry
pub const MAX_BATCH_WRITES: usize = 500;

/// Top-level fields of a document
pub type Fields = Map<String, Value>;

/// Reference to a collection, e.g. `Courses` or `Courses/toeic1/Lessons`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    /// Top-level collection
    pub fn root(name: &str) -> Self {
        Self {
            path: name.to_string(),
        }
    }

    /// Parse a slash-separated collection path (odd number of segments)
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments = split_segments(path)?;
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{}' does not name a collection",
                path
            )));
        }
        Ok(Self {
            path: segments.join("/"),
        })
    }

    /// Document inside this collection
    pub fn doc(&self, id: &str) -> DocRef {
        DocRef {
            path: format!("{}/{}", self.path, id),
        }
    }

    /// Full slash-separated path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Reference to a document, e.g. `Courses/toeic1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocRef {
    path: String,
}

impl DocRef {
    /// Parse a slash-separated document path (even number of segments)
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments = split_segments(path)?;
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{}' does not name a document",
                path
            )));
        }
        Ok(Self {
            path: segments.join("/"),
        })
    }

    /// Sub-collection of this document
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef {
            path: format!("{}/{}", self.path, name),
        }
    }

    /// Collection holding this document
    pub fn parent(&self) -> CollectionRef {
        let (parent, _) = self.path.rsplit_once('/').unwrap_or(("", &self.path));
        CollectionRef {
            path: parent.to_string(),
        }
    }

    /// Document id (last path segment)
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Full slash-separated path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

fn split_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath(format!("'{}' has an empty segment", path)));
    }
    Ok(segments)
}

/// A stored document: its id and top-level fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// String field, if present and a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Integer field, if present and numeric
    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    /// Array field, if present and an array
    pub fn array_field(&self, key: &str) -> Option<&Vec<Value>> {
        self.fields.get(key).and_then(Value::as_array)
    }
}

/// Convert a serializable value into document fields
///
/// Fails unless the value serializes to a JSON object.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// One operation inside a write batch
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set { doc: DocRef, fields: Fields },
    Delete { doc: DocRef },
}

/// Group of writes committed together
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full-document write
    pub fn set(&mut self, doc: DocRef, fields: Fields) -> Result<(), StoreError> {
        self.push(Write::Set { doc, fields })
    }

    /// Queue a delete
    pub fn delete(&mut self, doc: DocRef) -> Result<(), StoreError> {
        self.push(Write::Delete { doc })
    }

    fn push(&mut self, write: Write) -> Result<(), StoreError> {
        if self.writes.len() >= MAX_BATCH_WRITES {
            return Err(StoreError::BatchLimitExceeded {
                limit: MAX_BATCH_WRITES,
            });
        }
        self.writes.push(write);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Common interface of every document store backend
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document, `None` if it does not exist
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError>;

    /// Create or replace a document
    async fn set(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError>;

    /// Merge top-level fields into an existing document
    ///
    /// Fails with `StoreError::NotFound` when the document does not exist.
    async fn update(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document; deleting a missing document is not an error
    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError>;

    /// All documents of one collection, ordered by id
    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError>;

    /// Apply every write of the batch
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to a store backend
pub type StoreHandle = Arc<dyn DocumentStore>;

/// Open the backend selected in the configuration
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<StoreHandle> {
    let store: StoreHandle = match config.backend {
        StoreBackend::Sqlite => {
            let path = match &config.sqlite_path {
                Some(path) => path.clone(),
                None => SqliteStore::default_database_path()?,
            };
            Arc::new(SqliteStore::open(&path)?)
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Firestore => Arc::new(FirestoreStore::from_config(config)?),
    };

    info!("Using {} document store", store.backend_name());
    Ok(store)
}
