/*!
 * SQLite-backed document store.
 *
 * Every document is one row of the `documents` table, its fields kept as
 * JSON text. A write batch commits inside a single transaction.
 */

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::{CollectionRef, DocRef, Document, DocumentStore, Fields, Write, WriteBatch};
use crate::errors::StoreError;

pub mod connection;
pub mod schema;

pub use connection::DatabaseConnection;

/// Document store persisted in a local SQLite file
#[derive(Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self {
            db: DatabaseConnection::new(path)?,
        })
    }

    /// Store backed by an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: DatabaseConnection::new_in_memory()?,
        })
    }

    /// Default database location under the user's data directory
    pub fn default_database_path() -> Result<PathBuf, StoreError> {
        DatabaseConnection::default_database_path()
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn get_sync(conn: &Connection, doc: &DocRef) -> Result<Option<Fields>, StoreError> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![doc.parent().path(), doc.id()],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn set_sync(conn: &Connection, doc: &DocRef, fields: &Fields) -> Result<(), StoreError> {
        let data = serde_json::to_string(fields)?;
        conn.execute(
            r#"
            INSERT INTO documents (collection, id, data, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(collection, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            params![doc.parent().path(), doc.id(), data],
        )?;
        Ok(())
    }

    fn delete_sync(conn: &Connection, doc: &DocRef) -> Result<(), StoreError> {
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![doc.parent().path(), doc.id()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError> {
        let doc = doc.clone();

        self.db
            .execute_async(move |conn| {
                Ok(Self::get_sync(conn, &doc)?.map(|fields| Document {
                    id: doc.id().to_string(),
                    fields,
                }))
            })
            .await
    }

    async fn set(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        let doc = doc.clone();

        self.db
            .execute_async(move |conn| Self::set_sync(conn, &doc, &fields))
            .await
    }

    async fn update(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        let doc = doc.clone();

        self.db
            .transaction_async(move |tx| {
                let mut existing = Self::get_sync(tx, &doc)?
                    .ok_or_else(|| StoreError::NotFound(doc.to_string()))?;
                existing.extend(fields);
                Self::set_sync(tx, &doc, &existing)
            })
            .await
    }

    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError> {
        let doc = doc.clone();

        self.db
            .execute_async(move |conn| Self::delete_sync(conn, &doc))
            .await
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let collection = collection.path().to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, data FROM documents WHERE collection = ?1 ORDER BY id",
                )?;

                let rows = stmt.query_map(params![collection], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut documents = Vec::new();
                for row in rows {
                    let (id, data) = row?;
                    documents.push(Document {
                        id,
                        fields: serde_json::from_str(&data)?,
                    });
                }

                debug!("Listed {} documents from {}", documents.len(), collection);
                Ok(documents)
            })
            .await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let writes = batch.into_writes();

        self.db
            .transaction_async(move |tx| {
                for write in &writes {
                    match write {
                        Write::Set { doc, fields } => Self::set_sync(tx, doc, fields)?,
                        Write::Delete { doc } => Self::delete_sync(tx, doc)?,
                    }
                }
                Ok(())
            })
            .await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
