/*!
 * Course vocabulary fetch.
 *
 * Collects one course's vocabulary grouped by lesson. The store is tried
 * first, lesson by lesson, through three locations:
 *
 * 1. `Courses/<course>/Lessons/<lesson>/Vocabulary`
 * 2. `Lessons/<lesson>/Vocabulary`
 * 3. the lesson document's own `vocabularyItems` array
 *
 * When the store has nothing, local JSON files are tried, then a built-in
 * list of meeting vocabulary.
 */

use anyhow::Result;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::app_config::ExportConfig;
use crate::catalog::{LessonVocabulary, LessonWords, VocabularyItem};
use crate::file_utils::FileManager;
use crate::store::{CollectionRef, Document, DocumentStore};

/// Where fetched vocabulary came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularySource {
    Store,
    LocalFile(PathBuf),
    BuiltIn,
}

/// Result of a fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub source: VocabularySource,
    pub lessons: LessonVocabulary,
}

/// Essential meeting vocabulary used when no other source has data
pub fn meeting_vocabulary() -> Vec<VocabularyItem> {
    [
        ("Schedule", "Lịch trình", "/ˈʃɛdjuːl/"),
        ("Agenda", "Chương trình nghị sự", "/əˈdʒɛndə/"),
        ("Conference Call", "Cuộc gọi hội nghị", "/ˈkɒnfərəns kɔːl/"),
        ("Minutes", "Biên bản", "/ˈmɪnɪts/"),
        ("Deadline", "Hạn chót", "/ˈdɛdlaɪn/"),
        ("Meeting Room", "Phòng họp", "/ˈmiːtɪŋ ruːm/"),
        ("Appointment", "Cuộc hẹn", "/əˈpɔɪntmənt/"),
        ("Reschedule", "Sắp xếp lại lịch", "/riːˈʃɛdjuːl/"),
    ]
    .iter()
    .map(|(english, vietnamese, phonetic)| VocabularyItem::with_phonetic(english, vietnamese, phonetic))
    .collect()
}

fn items_from_documents(documents: Vec<Document>) -> Vec<VocabularyItem> {
    documents
        .into_iter()
        .filter_map(|document| {
            serde_json::from_value(Value::Object(document.fields))
                .map_err(|e| warn!("Skipping vocabulary document {}: {}", document.id, e))
                .ok()
        })
        .collect()
}

fn items_from_array(values: &[Value]) -> Vec<VocabularyItem> {
    values
        .iter()
        .filter_map(|value| serde_json::from_value(value.clone()).ok())
        .collect()
}

/// Vocabulary of one lesson from the first location that has any
async fn fetch_lesson_vocabulary(
    store: &dyn DocumentStore,
    course_id: &str,
    lesson: &Document,
) -> Result<Vec<VocabularyItem>> {
    let nested = CollectionRef::root("Courses")
        .doc(course_id)
        .collection("Lessons")
        .doc(&lesson.id)
        .collection("Vocabulary");
    let items = items_from_documents(store.list(&nested).await?);
    if !items.is_empty() {
        debug!("Found {} vocabulary items for lesson {} under Courses", items.len(), lesson.id);
        return Ok(items);
    }

    let top_level = CollectionRef::root("Lessons").doc(&lesson.id).collection("Vocabulary");
    let items = items_from_documents(store.list(&top_level).await?);
    if !items.is_empty() {
        debug!("Found {} vocabulary items for lesson {} under Lessons", items.len(), lesson.id);
        return Ok(items);
    }

    let items = lesson
        .array_field("vocabularyItems")
        .map(|values| items_from_array(values))
        .unwrap_or_default();
    debug!("Found {} vocabulary items in lesson {} itself", items.len(), lesson.id);
    Ok(items)
}

/// Lesson vocabulary of a course from the store
///
/// `None` when the course document does not exist. Lessons are ordered by
/// `lessonNumber`; lessons without vocabulary are left out.
pub async fn fetch_course_vocabulary(
    store: &dyn DocumentStore,
    course_id: &str,
) -> Result<Option<LessonVocabulary>> {
    let course_doc = CollectionRef::root("Courses").doc(course_id);
    let Some(course) = store.get(&course_doc).await? else {
        warn!("Course {} not found in the store", course_id);
        return Ok(None);
    };
    info!("Course: {}", course.str_field("title").unwrap_or(course_id));

    let mut lessons = store.list(&course_doc.collection("Lessons")).await?;
    lessons.sort_by_key(|lesson| lesson.i64_field("lessonNumber").unwrap_or(0));
    info!("Found {} lessons for course {}", lessons.len(), course_id);

    let mut result = LessonVocabulary::new();
    for lesson in &lessons {
        let vocabulary = fetch_lesson_vocabulary(store, course_id, lesson).await?;
        if vocabulary.is_empty() {
            continue;
        }

        let title = match lesson.str_field("title") {
            Some(title) => title.to_string(),
            None => format!(
                "Lesson {}",
                lesson
                    .i64_field("lessonNumber")
                    .map_or_else(|| "?".to_string(), |n| n.to_string())
            ),
        };
        result.insert(lesson.id.clone(), LessonWords { title, vocabulary });
    }

    Ok(Some(result))
}

/// Items of `course_id` from one local file
///
/// Two layouts are accepted: a list of items tagged with `courseId`, or a
/// map `{course: {lessons: {lesson: {vocabulary: [...]}}}}`.
fn parse_local_vocabulary(data: &Value, course_id: &str) -> Vec<VocabularyItem> {
    match data {
        Value::Array(items) => items
            .iter()
            .filter(|item| item.get("courseId").and_then(Value::as_str) == Some(course_id))
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        Value::Object(courses) => {
            let Some(lessons) = courses
                .get(course_id)
                .and_then(|course| course.get("lessons"))
                .and_then(Value::as_object)
            else {
                return Vec::new();
            };

            let mut items = Vec::new();
            for (lesson_id, lesson) in lessons {
                let Some(vocabulary) = lesson.get("vocabulary").and_then(Value::as_array) else {
                    continue;
                };
                for mut item in items_from_array(vocabulary) {
                    item.lesson_id = Some(lesson_id.clone());
                    items.push(item);
                }
            }
            items
        }
        _ => Vec::new(),
    }
}

/// Items of `course_id` from the first local file that has any
pub fn load_local_vocabulary(files: &[PathBuf], course_id: &str) -> Option<(PathBuf, Vec<VocabularyItem>)> {
    for path in files {
        if !FileManager::file_exists(path) {
            continue;
        }

        match FileManager::read_json::<Value, _>(path) {
            Ok(data) => {
                let items = parse_local_vocabulary(&data, course_id);
                if !items.is_empty() {
                    info!("Loaded {} vocabulary items from {}", items.len(), path.display());
                    return Some((path.clone(), items));
                }
            }
            Err(e) => warn!("Error loading vocabulary from {}: {}", path.display(), e),
        }
    }
    None
}

fn fallback(settings: &ExportConfig) -> FetchOutcome {
    if let Some((path, items)) = load_local_vocabulary(&settings.fallback_files, &settings.course_id) {
        return FetchOutcome {
            source: VocabularySource::LocalFile(path),
            lessons: LessonVocabulary::group_by_lesson(items),
        };
    }

    info!("Using built-in meeting vocabulary");
    FetchOutcome {
        source: VocabularySource::BuiltIn,
        lessons: LessonVocabulary::group_by_lesson(meeting_vocabulary()),
    }
}

fn log_lessons(lessons: &LessonVocabulary) {
    for (lesson_id, words) in lessons.iter() {
        info!("{} ({}):", words.title, lesson_id);
        for item in &words.vocabulary {
            info!("  {} - {} ({})", item.english, item.vietnamese, item.phonetic);
        }
    }
}

/// Fetch the configured course and save it when it came from the store
pub async fn run_fetch(store: &dyn DocumentStore, settings: &ExportConfig) -> Result<FetchOutcome> {
    let outcome = match fetch_course_vocabulary(store, &settings.course_id).await? {
        Some(lessons) if !lessons.is_empty() => FetchOutcome {
            source: VocabularySource::Store,
            lessons,
        },
        Some(_) => {
            warn!("No vocabulary found in the store for course {}", settings.course_id);
            fallback(settings)
        }
        None => fallback(settings),
    };

    log_lessons(&outcome.lessons);

    if outcome.source == VocabularySource::Store {
        save_lesson_vocabulary(&outcome.lessons, &settings.vocabulary_file)?;
    }

    Ok(outcome)
}

/// Write the lesson vocabulary map
pub fn save_lesson_vocabulary(lessons: &LessonVocabulary, path: &Path) -> Result<()> {
    FileManager::write_json(path, lessons)?;
    info!("Vocabulary data saved to {}", path.display());
    Ok(())
}
