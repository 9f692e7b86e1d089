/*!
 * Integration tests for cleanup, video URL rewrite and verification
 */

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vocabkit::Controller;
use vocabkit::app_config::Config;
use vocabkit::errors::StoreError;
use vocabkit::jobs::cleanup::{delete_duplicate_lessons, relocate_vocabulary, run_cleanup};
use vocabkit::jobs::verify::verify_catalog;
use vocabkit::jobs::video_urls::update_video_urls;
use vocabkit::store::{
    CollectionRef, DocRef, Document, DocumentStore, Fields, MemoryStore, WriteBatch,
};
use crate::common::{self, fields};

const TARGET_URL: &str = "https://www.youtube.com/watch?v=kFYgLjdSkXE";

fn duplicates() -> Vec<String> {
    Config::default().maintenance.duplicate_lessons
}

fn question_collections() -> Vec<String> {
    Config::default().maintenance.question_collections
}

fn log_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "log") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Test that duplicate lessons are deleted only where they exist
#[tokio::test]
async fn test_deleteDuplicateLessons_shouldRemoveListedLessons() -> Result<()> {
    let store = common::seeded_store().await?;

    let deleted = delete_duplicate_lessons(&store, &duplicates()).await?;

    assert_eq!(deleted, 1);
    let lessons = store
        .list(&CollectionRef::root("Courses").doc("toeic1").collection("Lessons"))
        .await?;
    let ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["toeic1_lesson_1"]);

    Ok(())
}

/// Test that vocabulary is copied with lesson-scoped ids and tags
#[tokio::test]
async fn test_relocateVocabulary_shouldTagAndRenameItems() -> Result<()> {
    let store = common::seeded_store().await?;

    let summary = relocate_vocabulary(&store, 500, Duration::ZERO).await?;

    // the item without an id is skipped
    assert_eq!(summary.writes, 3);
    assert_eq!(summary.batches, 1);

    let vocabulary = CollectionRef::root("Vocabulary");
    let ids: Vec<String> = store.list(&vocabulary).await?.into_iter().map(|d| d.id).collect();
    assert_eq!(
        ids,
        vec!["toeic1_lesson_1_agreement", "toeic1_lesson_1_and_or", "toeic38_lesson_2_Minutes"]
    );

    let moved = store
        .get(&vocabulary.doc("toeic38_lesson_2_Minutes"))
        .await?
        .expect("item relocated");
    assert_eq!(moved.str_field("courseId"), Some("toeic38"));
    assert_eq!(moved.str_field("lessonId"), Some("toeic38_lesson_2"));
    assert_eq!(moved.str_field("phonetic"), Some("/ˈmɪnɪts/"));

    Ok(())
}

/// Test that a small batch size splits the relocation into several commits
#[tokio::test]
async fn test_runCleanup_withSmallBatches_shouldCommitCeilBatches() -> Result<()> {
    let store = common::seeded_store().await?;

    let report = run_cleanup(&store, &duplicates(), 2, Duration::ZERO).await?;

    assert_eq!(report.deleted_lessons, 1);
    assert_eq!(report.relocated.writes, 3);
    assert_eq!(report.relocated.batches, 2);

    Ok(())
}

/// Test that a second cleanup deletes nothing and rewrites the same ids
#[tokio::test]
async fn test_runCleanup_twice_shouldBeIdempotent() -> Result<()> {
    let store = common::seeded_store().await?;

    run_cleanup(&store, &duplicates(), 500, Duration::ZERO).await?;
    let count = store.document_count();
    let report = run_cleanup(&store, &duplicates(), 500, Duration::ZERO).await?;

    assert_eq!(report.deleted_lessons, 0);
    assert_eq!(report.relocated.writes, 3);
    assert_eq!(store.document_count(), count);

    Ok(())
}

/// Test that every lesson and test question ends up on the target video
#[tokio::test]
async fn test_updateVideoUrls_shouldRewriteLessonsAndQuestions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = common::seeded_store().await?;

    let report = update_video_urls(&store, TARGET_URL, &question_collections(), temp_dir.path(), Duration::ZERO).await?;

    assert_eq!(report.courses, 2);
    assert_eq!(report.lessons_checked, 4);
    assert_eq!(report.lessons_updated, 4);
    // one top-level test document plus two nested questions
    assert_eq!(report.questions_checked, 3);
    assert_eq!(report.questions_updated, 1);
    assert_eq!(report.tests_rewritten, 1);
    assert_eq!(report.total_updated(), 5);

    let lesson = store
        .get(&CollectionRef::root("Courses").doc("toeic38").collection("Lessons").doc("toeic38_lesson_1"))
        .await?
        .expect("lesson exists");
    assert_eq!(lesson.str_field("videoUrl"), Some(TARGET_URL));
    assert_eq!(lesson.str_field("title"), Some("Meetings - Lesson 1"));

    let test = store
        .get(&CollectionRef::root("Tests").doc("toeic1_test"))
        .await?
        .expect("test exists");
    assert_eq!(test.fields["partQuestions"][0][0]["videoUrl"], TARGET_URL);
    assert!(test.fields["partQuestions"][0][1].get("videoUrl").is_none());
    assert!(test.fields.get("videoUrl").is_none());

    let log = std::fs::read_to_string(&report.log_file)?;
    assert!(report.log_file.starts_with(temp_dir.path()));
    assert!(log.contains(&format!("Target URL: {}", TARGET_URL)));
    assert!(log.contains("Old URL: https://www.youtube.com/watch?v=example1_1"));
    assert!(log.contains("Added URL:"));
    assert!(log.contains("Old URL: https://www.youtube.com/watch?v=old"));
    assert!(log.contains("Test: toeic1_test"));
    assert!(log.contains("Total items updated: 5"));

    Ok(())
}

/// Test that documents already on the target are left alone
#[tokio::test]
async fn test_updateVideoUrls_secondRun_shouldUpdateNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = common::seeded_store().await?;
    update_video_urls(&store, TARGET_URL, &question_collections(), temp_dir.path(), Duration::ZERO).await?;

    let second_dir = temp_dir.path().join("second");
    let report = update_video_urls(&store, TARGET_URL, &question_collections(), &second_dir, Duration::ZERO).await?;

    assert_eq!(report.lessons_checked, 4);
    assert_eq!(report.total_updated(), 0);
    assert_eq!(report.tests_rewritten, 0);
    let log = std::fs::read_to_string(&report.log_file)?;
    assert!(!log.contains("Test: toeic1_test"));

    Ok(())
}

/// Test that top-level question documents only change when they carry a video
#[tokio::test]
async fn test_updateVideoUrls_withQuestionCollection_shouldOnlyTouchVideoQuestions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = MemoryStore::new();
    let questions = CollectionRef::root("Questions");
    store.set(&questions.doc("q1"), fields(json!({"videoUrl": "https://youtu.be/old"}))).await?;
    store.set(&questions.doc("q2"), fields(json!({"text": "no video"}))).await?;

    let report = update_video_urls(&store, TARGET_URL, &question_collections(), temp_dir.path(), Duration::ZERO).await?;

    assert_eq!(report.questions_checked, 2);
    assert_eq!(report.questions_updated, 1);
    let q1 = store.get(&questions.doc("q1")).await?.expect("q1 exists");
    assert_eq!(q1.str_field("videoUrl"), Some(TARGET_URL));
    let q2 = store.get(&questions.doc("q2")).await?.expect("q2 exists");
    assert!(q2.fields.get("videoUrl").is_none());

    Ok(())
}

/// Test that a URL without a video id is rejected before anything is written
#[tokio::test]
async fn test_updateVideoUrls_withInvalidUrl_shouldFailWithoutLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = common::seeded_store().await?;

    let result = update_video_urls(
        &store,
        "https://example.com/video.mp4",
        &question_collections(),
        temp_dir.path(),
        Duration::ZERO,
    )
    .await;

    assert!(result.is_err());
    assert!(log_files(temp_dir.path())?.is_empty());

    Ok(())
}

/// Store whose partial updates always fail
struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError> {
        self.inner.get(doc).await
    }

    async fn set(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        self.inner.set(doc, fields).await
    }

    async fn update(&self, _doc: &DocRef, _fields: Fields) -> Result<(), StoreError> {
        Err(StoreError::Api {
            status_code: 503,
            message: "Service unavailable".to_string(),
        })
    }

    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError> {
        self.inner.delete(doc).await
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.inner.commit(batch).await
    }

    fn backend_name(&self) -> &'static str {
        "read-only"
    }
}

/// Test that a store failure is propagated and recorded in the log
#[tokio::test]
async fn test_updateVideoUrls_withFailingStore_shouldLogError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ReadOnlyStore {
        inner: common::seeded_store().await?,
    };

    let result = update_video_urls(&store, TARGET_URL, &question_collections(), temp_dir.path(), Duration::ZERO).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Service unavailable"));

    let logs = log_files(temp_dir.path())?;
    assert_eq!(logs.len(), 1);
    let log = std::fs::read_to_string(&logs[0])?;
    assert!(log.contains("ERROR:"));
    assert!(!log.contains("Final Summary"));

    Ok(())
}

/// Test the verification report on the seeded store
#[tokio::test]
async fn test_verifyCatalog_withSeededStore_shouldReportCoursesAndTests() -> Result<()> {
    let store = common::seeded_store().await?;

    let report = verify_catalog(&store).await?;

    assert_eq!(report.courses.len(), 2);
    let contracts = &report.courses[0];
    assert_eq!(contracts.title, "TOEIC 1: Contracts");
    assert_eq!(contracts.lessons[0].lesson_id, "toeic1_lesson_1");
    assert_eq!(contracts.lessons[0].samples[1].english, "and/or");
    assert_eq!(contracts.lessons[1].lesson_id, "toeic_lesson_1_1");
    assert!(contracts.lessons[1].samples.is_empty());
    assert_eq!(contracts.lessons[1].vocabulary_count, None);

    let test = &report.tests[0];
    assert_eq!(test.pass_score, Some(70));
    assert_eq!(test.question_counts["reading"], 2);

    Ok(())
}

/// Test the controller's maintenance commands with configured settings
#[tokio::test]
async fn test_controller_maintenanceCommands_shouldUseConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.batch.batch_pause_ms = 0;
    config.batch.write_delay_ms = 0;
    config.batch.max_batch_size = 1;
    config.maintenance.log_dir = temp_dir.path().join("logs");
    let controller = Controller::with_store(config, Arc::new(common::seeded_store().await?));

    let cleanup = controller.cleanup().await?;
    assert_eq!(cleanup.deleted_lessons, 1);
    assert_eq!(cleanup.relocated.batches, 3);

    let videos = controller.update_videos(Some("https://youtu.be/abc123")).await?;
    assert_eq!(videos.lessons_updated, 3);
    assert!(videos.log_file.starts_with(temp_dir.path().join("logs")));

    let report = controller.verify().await?;
    assert_eq!(report.courses.len(), 2);

    Ok(())
}
