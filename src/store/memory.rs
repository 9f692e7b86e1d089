/*!
 * In-memory document store.
 *
 * Keeps collections in ordered maps behind a mutex. Used by the test suite
 * and by `--dry-run`, where nothing should reach a real database.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::{CollectionRef, DocRef, Document, DocumentStore, Fields, Write, WriteBatch};
use crate::errors::StoreError;

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

/// Document store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.collections.lock().values().map(BTreeMap::len).sum()
    }

    fn apply(collections: &mut Collections, write: Write) {
        match write {
            Write::Set { doc, fields } => {
                collections
                    .entry(doc.parent().path().to_string())
                    .or_default()
                    .insert(doc.id().to_string(), fields);
            }
            Write::Delete { doc } => {
                if let Some(documents) = collections.get_mut(doc.parent().path()) {
                    documents.remove(doc.id());
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock();
        Ok(collections
            .get(doc.parent().path())
            .and_then(|documents| documents.get(doc.id()))
            .map(|fields| Document {
                id: doc.id().to_string(),
                fields: fields.clone(),
            }))
    }

    async fn set(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        Self::apply(
            &mut self.collections.lock(),
            Write::Set {
                doc: doc.clone(),
                fields,
            },
        );
        Ok(())
    }

    async fn update(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(doc.parent().path())
            .and_then(|documents| documents.get_mut(doc.id()))
            .ok_or_else(|| StoreError::NotFound(doc.to_string()))?;

        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError> {
        Self::apply(&mut self.collections.lock(), Write::Delete { doc: doc.clone() });
        Ok(())
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock();
        Ok(collections
            .get(collection.path())
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut collections = self.collections.lock();
        for write in batch.into_writes() {
            Self::apply(&mut collections, write);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
