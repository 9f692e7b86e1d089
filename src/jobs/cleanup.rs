use anyhow::Result;
use log::{error, info, warn};
use serde_json::Value;
use std::time::Duration;

use crate::store::{BatchSummary, BatchWriter, CollectionRef, DocumentStore};

// @module: Duplicate lesson removal and vocabulary relocation

/// Counts reported by a cleanup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub deleted_lessons: usize,
    pub relocated: BatchSummary,
}

/// Delete the given lesson ids from every course
///
/// Existence is checked first; a failing lesson is logged and skipped.
pub async fn delete_duplicate_lessons(store: &dyn DocumentStore, duplicates: &[String]) -> Result<usize> {
    let courses_ref = CollectionRef::root("Courses");
    let courses = store.list(&courses_ref).await?;
    let mut deleted = 0;

    for course in &courses {
        info!("Checking course: {}", course.id);
        let lessons_ref = courses_ref.doc(&course.id).collection("Lessons");

        for lesson_id in duplicates {
            let lesson_doc = lessons_ref.doc(lesson_id);
            let result = match store.get(&lesson_doc).await {
                Ok(Some(_)) => store.delete(&lesson_doc).await.map(|_| true),
                Ok(None) => Ok(false),
                Err(e) => Err(e),
            };

            match result {
                Ok(true) => {
                    info!("Deleted lesson: {} from course: {}", lesson_id, course.id);
                    deleted += 1;
                }
                Ok(false) => {}
                Err(e) => error!("Error checking/deleting lesson {}: {}", lesson_id, e),
            }
        }
    }

    info!("Total deleted lessons: {}", deleted);
    Ok(deleted)
}

/// Id of a relocated vocabulary document: `<lesson>_<word>` without slashes
pub fn relocated_id(lesson_id: &str, vocabulary_id: &str) -> String {
    format!("{}_{}", lesson_id, vocabulary_id).replace('/', "_")
}

/// Copy every lesson's `vocabularyItems` into the top-level `Vocabulary` collection
///
/// Items without an `id` are skipped. Copies are tagged with `courseId` and
/// `lessonId` and written through a batch writer.
pub async fn relocate_vocabulary(
    store: &dyn DocumentStore,
    batch_size: usize,
    pause: Duration,
) -> Result<BatchSummary> {
    let courses_ref = CollectionRef::root("Courses");
    let vocabulary_ref = CollectionRef::root("Vocabulary");
    let courses = store.list(&courses_ref).await?;

    let progress = super::progress_bar(courses.len() as u64, "courses");
    let mut writer = BatchWriter::new(store, batch_size, pause);

    for course in &courses {
        progress.set_message(course.id.clone());
        let lessons = store
            .list(&courses_ref.doc(&course.id).collection("Lessons"))
            .await?;

        for lesson in &lessons {
            let Some(items) = lesson.array_field("vocabularyItems").filter(|items| !items.is_empty()) else {
                continue;
            };
            info!("Found {} vocabulary items in lesson: {}", items.len(), lesson.id);

            for item in items {
                let Some(mut fields) = item.as_object().cloned() else {
                    warn!("Skipping non-object vocabulary item in lesson {}", lesson.id);
                    continue;
                };
                let vocab_id = match fields.get("id").and_then(Value::as_str) {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => continue,
                };

                fields.insert("courseId".to_string(), Value::String(course.id.clone()));
                fields.insert("lessonId".to_string(), Value::String(lesson.id.clone()));
                writer
                    .set(vocabulary_ref.doc(&relocated_id(&lesson.id, &vocab_id)), fields)
                    .await?;
            }
        }
        progress.inc(1);
    }

    let summary = writer.finish().await?;
    progress.finish_with_message("Relocation complete");
    info!(
        "Total vocabulary items moved: {} in {} batches",
        summary.writes, summary.batches
    );
    Ok(summary)
}

/// Delete duplicates, then relocate vocabulary
pub async fn run_cleanup(
    store: &dyn DocumentStore,
    duplicates: &[String],
    batch_size: usize,
    pause: Duration,
) -> Result<CleanupReport> {
    info!("Deleting duplicate lessons...");
    let deleted_lessons = delete_duplicate_lessons(store, duplicates).await?;

    info!("Moving vocabulary to Vocabulary collection...");
    let relocated = relocate_vocabulary(store, batch_size, pause).await?;

    Ok(CleanupReport {
        deleted_lessons,
        relocated,
    })
}
