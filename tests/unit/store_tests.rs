/*!
 * Tests for the document store backends
 */

use anyhow::Result;
use serde_json::json;
use std::time::Duration;
use vocabkit::app_config::{StoreBackend, StoreConfig};
use vocabkit::errors::StoreError;
use vocabkit::store::firestore::codec;
use vocabkit::store::{
    BatchWriter, CollectionRef, DocumentStore, FirestoreStore, MemoryStore, SqliteStore,
    WriteBatch, open_store,
};
use crate::common::{self, fields};

/// Test that documents written to a SQLite file survive a reopen
#[tokio::test]
async fn test_sqliteStore_withFile_shouldPersistAcrossOpen() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("vocabkit.db");
    let doc = CollectionRef::root("Courses").doc("toeic1");

    {
        let store = SqliteStore::open(&db_path)?;
        store
            .set(&doc, fields(json!({"title": "TOEIC 1: Contracts", "favoriteCount": 321})))
            .await?;
    }

    let store = SqliteStore::open(&db_path)?;
    let loaded = store.get(&doc).await?.expect("document should exist");
    assert_eq!(loaded.str_field("title"), Some("TOEIC 1: Contracts"));
    assert_eq!(loaded.i64_field("favoriteCount"), Some(321));

    Ok(())
}

/// Test that SQLite lists only direct children, ordered by id
#[tokio::test]
async fn test_sqliteStore_list_shouldReturnDirectChildrenInOrder() -> Result<()> {
    let store = SqliteStore::new_in_memory()?;
    let lessons = CollectionRef::root("Courses").doc("toeic1").collection("Lessons");

    store.set(&lessons.doc("toeic1_lesson_2"), fields(json!({}))).await?;
    store.set(&lessons.doc("toeic1_lesson_1"), fields(json!({}))).await?;
    store
        .set(
            &lessons.doc("toeic1_lesson_1").collection("Vocabulary").doc("desk"),
            fields(json!({"english": "desk"})),
        )
        .await?;

    let ids: Vec<String> = store.list(&lessons).await?.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["toeic1_lesson_1", "toeic1_lesson_2"]);

    Ok(())
}

/// Test that update merges fields and refuses missing documents
#[tokio::test]
async fn test_sqliteStore_update_shouldMergeFields() -> Result<()> {
    let store = SqliteStore::new_in_memory()?;
    let doc = CollectionRef::root("Tests").doc("toeic1_test");

    let missing = store.update(&doc, fields(json!({"videoUrl": "x"}))).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    store.set(&doc, fields(json!({"title": "T", "videoUrl": "old"}))).await?;
    store.update(&doc, fields(json!({"videoUrl": "new"}))).await?;

    let loaded = store.get(&doc).await?.expect("document should exist");
    assert_eq!(loaded.str_field("title"), Some("T"));
    assert_eq!(loaded.str_field("videoUrl"), Some("new"));

    Ok(())
}

/// Test that a committed batch applies sets and deletes together
#[tokio::test]
async fn test_commit_withMixedBatch_shouldApplyAllWrites() -> Result<()> {
    let store = SqliteStore::new_in_memory()?;
    let vocabulary = CollectionRef::root("Vocabulary");
    store.set(&vocabulary.doc("stale"), fields(json!({}))).await?;

    let mut batch = WriteBatch::new();
    batch.set(vocabulary.doc("a"), fields(json!({"english": "a"})))?;
    batch.set(vocabulary.doc("b"), fields(json!({"english": "b"})))?;
    batch.delete(vocabulary.doc("stale"))?;
    store.commit(batch).await?;

    let ids: Vec<String> = store.list(&vocabulary).await?.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    Ok(())
}

/// Test that the batch writer commits ceil(n / size) batches
#[tokio::test]
async fn test_batchWriter_shouldSplitWritesIntoBatches() -> Result<()> {
    let store = MemoryStore::new();
    let vocabulary = CollectionRef::root("Vocabulary");
    let mut writer = BatchWriter::new(&store, 4, Duration::ZERO);

    for i in 0..10 {
        writer.set(vocabulary.doc(&format!("word_{}", i)), fields(json!({}))).await?;
    }
    let summary = writer.finish().await?;

    assert_eq!(summary.writes, 10);
    assert_eq!(summary.batches, 3);
    assert_eq!(store.document_count(), 10);

    Ok(())
}

/// Test that open_store honors the configured backend
#[tokio::test]
async fn test_openStore_shouldSelectBackend() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let memory = open_store(&StoreConfig {
        backend: StoreBackend::Memory,
        ..StoreConfig::default()
    })
    .await?;
    assert_eq!(memory.backend_name(), "memory");

    let sqlite = open_store(&StoreConfig {
        backend: StoreBackend::Sqlite,
        sqlite_path: Some(temp_dir.path().join("store.db")),
        ..StoreConfig::default()
    })
    .await?;
    assert_eq!(sqlite.backend_name(), "sqlite");
    assert!(temp_dir.path().join("store.db").exists());

    Ok(())
}

/// Test that Firestore requires a project id
#[test]
fn test_firestoreStore_withoutProject_shouldFailAuthentication() {
    let result = FirestoreStore::from_config(&StoreConfig {
        backend: StoreBackend::Firestore,
        ..StoreConfig::default()
    });

    assert!(matches!(result, Err(StoreError::Authentication(_))));
}

/// Test that the emulator host drives the REST URLs
#[test]
fn test_firestoreStore_withEmulator_shouldAddressEmulator() -> Result<()> {
    let store = FirestoreStore::from_config(&StoreConfig {
        backend: StoreBackend::Firestore,
        project_id: "vocab-app".to_string(),
        emulator_host: Some("localhost:8080".to_string()),
        ..StoreConfig::default()
    })?;

    let url = store.resource_url("Courses/toeic1")?;
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/v1/projects/vocab-app/databases/(default)/documents/Courses/toeic1"
    );
    assert_eq!(
        store.document_name("Courses/toeic1"),
        "projects/vocab-app/databases/(default)/documents/Courses/toeic1"
    );

    Ok(())
}

/// Test that typed Firestore fields decode into plain JSON
#[test]
fn test_decodeFields_withTypedValues_shouldReturnPlainJson() -> Result<()> {
    let raw = json!({
        "title": {"stringValue": "Meetings - Lesson 1"},
        "lessonNumber": {"integerValue": "1"},
        "isLocked": {"booleanValue": false},
        "vocabularyItems": {"arrayValue": {"values": [
            {"mapValue": {"fields": {"english": {"stringValue": "Agenda"}}}}
        ]}},
        "empty": {"arrayValue": {}},
    });

    let decoded = codec::decode_fields(raw.as_object().expect("object"))?;

    assert_eq!(
        serde_json::Value::Object(decoded),
        json!({
            "title": "Meetings - Lesson 1",
            "lessonNumber": 1,
            "isLocked": false,
            "vocabularyItems": [{"english": "Agenda"}],
            "empty": [],
        })
    );

    Ok(())
}

/// Test that an untyped value is rejected
#[test]
fn test_decodeValue_withUntypedValue_shouldFail() {
    let result = codec::decode_value(&json!("plain"));

    assert!(matches!(result, Err(StoreError::Serialization(_))));
}
