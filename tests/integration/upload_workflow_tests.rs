/*!
 * Integration tests for the dataset to store upload workflow
 */

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use vocabkit::app_config::{Config, CourseConfig};
use vocabkit::catalog::VocabularyItem;
use vocabkit::jobs::upload::{UploadOptions, run_upload};
use vocabkit::jobs::verify::verify_catalog;
use vocabkit::store::{CollectionRef, DocumentStore, MemoryStore, SqliteStore};
use vocabkit::{Controller, Topic};
use crate::common;

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.batch.write_delay_ms = 0;
    config.batch.batch_pause_ms = 0;
    config
}

/// Test that uploading the sample dataset writes courses, lessons and tests
#[tokio::test]
async fn test_runUpload_withSampleDataset_shouldWriteCatalog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = common::create_test_dataset(temp_dir.path())?;
    let store = MemoryStore::new();
    let options = UploadOptions {
        dataset,
        ..UploadOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(10);

    let report = run_upload(&store, &options, &CourseConfig::default(), Duration::ZERO, &mut rng).await?;

    assert_eq!(report.courses, 3);
    assert_eq!(report.lessons, 4);
    assert_eq!(report.vocabulary_items, 9);
    assert_eq!(report.tests, 3);

    let courses = CollectionRef::root("Courses");
    let course = store.get(&courses.doc("toeic1")).await?.expect("course uploaded");
    assert_eq!(course.str_field("title"), Some("TOEIC 1: Contracts"));
    assert!(course.fields.get("lessons").is_none());

    let lesson = store
        .get(&courses.doc("toeic1").collection("Lessons").doc("toeic1_lesson_1"))
        .await?
        .expect("lesson uploaded");
    assert!(lesson.fields.get("vocabulary").is_none());
    let items: Vec<VocabularyItem> =
        serde_json::from_value(lesson.fields["vocabularyItems"].clone())?;
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].id, "agreement");
    assert_eq!(lesson.i64_field("vocabulary_count"), Some(5));

    let test = store
        .get(&CollectionRef::root("Tests").doc("toeic2_test"))
        .await?
        .expect("test uploaded");
    assert_eq!(test.i64_field("passScore"), Some(70));
    assert_eq!(test.fields["questions"]["writing"].as_array().map(Vec::len), Some(2));

    Ok(())
}

/// Test that the verification report reflects an upload
#[tokio::test]
async fn test_verifyCatalog_afterUpload_shouldSummarizeEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = common::create_test_dataset(temp_dir.path())?;
    let store = MemoryStore::new();
    let options = UploadOptions {
        dataset,
        ..UploadOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(11);
    run_upload(&store, &options, &CourseConfig::default(), Duration::ZERO, &mut rng).await?;

    let report = verify_catalog(&store).await?;

    assert_eq!(report.courses.len(), 3);
    let contracts = &report.courses[0];
    assert_eq!(contracts.course_id, "toeic1");
    assert_eq!(contracts.category, "TOEIC Vocabulary");
    assert_eq!(contracts.lessons.len(), 2);
    assert_eq!(contracts.lessons[0].vocabulary_count, Some(5));
    assert_eq!(contracts.lessons[0].samples.len(), 2);
    assert_eq!(contracts.lessons[1].samples.len(), 1);

    assert_eq!(report.tests.len(), 3);
    let counts = &report.tests[0].question_counts;
    assert_eq!(counts["listening"], 6);
    assert_eq!(counts["speaking"], 6);

    Ok(())
}

/// Test that skipping the upload still exports the catalog
#[tokio::test]
async fn test_runUpload_withSkipUpload_shouldOnlyExport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = common::create_test_dataset(temp_dir.path())?;
    let export_path = temp_dir.path().join("out/catalog.json");
    let store = MemoryStore::new();
    let options = UploadOptions {
        dataset,
        export_path: Some(export_path.clone()),
        skip_upload: true,
    };
    let mut rng = StdRng::seed_from_u64(12);

    let report = run_upload(&store, &options, &CourseConfig::default(), Duration::ZERO, &mut rng).await?;

    assert_eq!(report.courses, 3);
    assert_eq!(report.vocabulary_items, 9);
    assert_eq!(store.document_count(), 0);

    let exported: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&export_path)?)?;
    assert_eq!(exported["courses"].as_array().map(Vec::len), Some(3));
    assert_eq!(exported["courses"][0]["lessons"][0]["vocabulary"][0]["english"], "agreement");
    assert_eq!(exported["tests"][0]["testId"], "toeic1_test");

    Ok(())
}

/// Test that uploading twice replaces documents instead of duplicating them
#[tokio::test]
async fn test_runUpload_twice_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = common::create_test_dataset(temp_dir.path())?;
    let store = SqliteStore::new_in_memory()?;
    let options = UploadOptions {
        dataset,
        ..UploadOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(13);

    run_upload(&store, &options, &CourseConfig::default(), Duration::ZERO, &mut rng).await?;
    let first = store.connection().document_count()?;
    run_upload(&store, &options, &CourseConfig::default(), Duration::ZERO, &mut rng).await?;

    assert_eq!(store.connection().document_count()?, first);
    // 3 courses, 4 lessons, 3 tests
    assert_eq!(first, 10);

    Ok(())
}

/// Test the controller's segment and upload commands against a SQLite file
#[tokio::test]
async fn test_controller_segmentThenUpload_shouldPersistToSqlite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = common::create_test_dataset(temp_dir.path())?;
    let topics_path = temp_dir.path().join("topics.json");
    let store = SqliteStore::open(temp_dir.path().join("vocabkit.db"))?;
    let controller = Controller::with_store(quiet_config(), Arc::new(store));

    let topics = controller.segment(&dataset, Some(topics_path.as_path()))?;
    assert_eq!(topics.len(), 3);
    let saved: Vec<Topic> = serde_json::from_str(&std::fs::read_to_string(&topics_path)?)?;
    assert_eq!(saved, topics);

    let report = controller
        .upload(&UploadOptions {
            dataset,
            ..UploadOptions::default()
        })
        .await?;
    assert_eq!(report.lessons, 4);

    let verification = controller.verify().await?;
    assert_eq!(verification.courses.len(), 3);
    assert_eq!(verification.courses[2].title, "TOEIC 3: TOEIC Topic 3");

    Ok(())
}

/// Test that a missing dataset leaves the store untouched
#[tokio::test]
async fn test_controller_upload_withMissingDataset_shouldFail() {
    let controller = Controller::new_for_test();

    let result = controller
        .upload(&UploadOptions {
            dataset: "/nonexistent/dataset.txt".into(),
            ..UploadOptions::default()
        })
        .await;

    assert!(result.is_err());
    let courses = controller
        .store()
        .await
        .unwrap()
        .list(&CollectionRef::root("Courses"))
        .await
        .unwrap();
    assert!(courses.is_empty());
}
