/*!
 * Video URL rewrite.
 *
 * Points every lesson, every top-level question document and every nested
 * test question at one target video. Each change is appended to a
 * timestamped log file so a run can be audited afterwards.
 */

use anyhow::{Result, anyhow};
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::file_utils::FileManager;
use crate::store::{CollectionRef, DocumentStore, Fields};
use crate::youtube;

const VIDEO_URL: &str = "videoUrl";
const PART_QUESTIONS: &str = "partQuestions";

/// Counts reported by a video URL rewrite
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoUpdateReport {
    pub courses: usize,
    pub lessons_checked: usize,
    pub lessons_updated: usize,
    pub questions_checked: usize,
    pub questions_updated: usize,
    pub tests_rewritten: usize,
    pub log_file: PathBuf,
}

impl VideoUpdateReport {
    pub fn total_updated(&self) -> usize {
        self.lessons_updated + self.questions_updated
    }
}

struct UpdateLog {
    path: PathBuf,
}

impl UpdateLog {
    fn create(dir: &Path, target_url: &str) -> Result<Self> {
        let log = Self {
            path: FileManager::timestamped_log_path(dir, "video_url_updates"),
        };
        log.write(&format!("Video URL Update Log - {}", FileManager::log_timestamp()))?;
        log.write(&format!("Target URL: {}\n", target_url))?;
        Ok(log)
    }

    fn write(&self, line: &str) -> Result<()> {
        FileManager::append_to_log_file(&self.path, line)
    }
}

fn single_field(key: &str, value: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(key.to_string(), Value::String(value.to_string()));
    fields
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn update_lessons(
    store: &dyn DocumentStore,
    target_url: &str,
    log: &UpdateLog,
    delay: Duration,
    report: &mut VideoUpdateReport,
) -> Result<()> {
    log.write("\n===== LESSONS =====")?;
    let courses_ref = CollectionRef::root("Courses");

    for course in store.list(&courses_ref).await? {
        report.courses += 1;
        let name = course
            .str_field("title")
            .or_else(|| course.str_field("name"))
            .unwrap_or("Unknown");
        info!("Processing course: {} - {}", course.id, name);
        log.write(&format!("Course: {} - {}", course.id, name))?;

        let lessons_ref = courses_ref.doc(&course.id).collection("Lessons");
        for lesson in store.list(&lessons_ref).await? {
            report.lessons_checked += 1;
            let lesson_doc = lessons_ref.doc(&lesson.id);

            match lesson.fields.get(VIDEO_URL) {
                Some(current) if current.as_str() == Some(target_url) => continue,
                Some(current) => {
                    let old_url = current.as_str().map_or_else(|| current.to_string(), str::to_string);
                    debug!("Updating lesson {} from {}", lesson.id, old_url);
                    store.update(&lesson_doc, single_field(VIDEO_URL, target_url)).await?;
                    log.write(&format!(
                        "  - Lesson: {}\n    Old URL: {}\n    New URL: {}",
                        lesson.id, old_url, target_url
                    ))?;
                }
                None => {
                    debug!("Adding videoUrl to lesson {}", lesson.id);
                    store.update(&lesson_doc, single_field(VIDEO_URL, target_url)).await?;
                    log.write(&format!("  - Lesson: {}\n    Added URL: {}", lesson.id, target_url))?;
                }
            }

            report.lessons_updated += 1;
            pause(delay).await;
        }
    }

    log.write(&format!(
        "\nLesson Summary:\nTotal courses processed: {}\nTotal lessons found: {}\nLessons updated: {}",
        report.courses, report.lessons_checked, report.lessons_updated
    ))?;
    info!(
        "Lessons updated: {} of {} in {} courses",
        report.lessons_updated, report.lessons_checked, report.courses
    );
    Ok(())
}

/// Rewrite differing `videoUrl`s inside `partQuestions`, a list of question lists
///
/// Returns the number of questions seen and the changes made.
fn rewrite_part_questions(parts: &mut [Value], target_url: &str) -> (usize, Vec<(usize, usize, String)>) {
    let mut checked = 0;
    let mut changes = Vec::new();

    for (part_index, part) in parts.iter_mut().enumerate() {
        let Some(questions) = part.as_array_mut() else {
            continue;
        };
        for (question_index, question) in questions.iter_mut().enumerate() {
            checked += 1;
            let Some(current) = question.get_mut(VIDEO_URL) else {
                continue;
            };
            if current.as_str() == Some(target_url) {
                continue;
            }
            let old_url = current.as_str().map_or_else(|| current.to_string(), str::to_string);
            *current = Value::String(target_url.to_string());
            changes.push((part_index + 1, question_index + 1, old_url));
        }
    }

    (checked, changes)
}

async fn update_questions(
    store: &dyn DocumentStore,
    target_url: &str,
    collections: &[String],
    log: &UpdateLog,
    delay: Duration,
    report: &mut VideoUpdateReport,
) -> Result<()> {
    log.write("\n===== QUESTIONS =====")?;

    for name in collections {
        info!("Checking collection: {}", name);
        log.write(&format!("\nCollection: {}", name))?;
        let collection = CollectionRef::root(name);

        for question in store.list(&collection).await? {
            report.questions_checked += 1;
            let Some(current) = question.fields.get(VIDEO_URL) else {
                continue;
            };
            if current.as_str() == Some(target_url) {
                continue;
            }

            let old_url = current.as_str().map_or_else(|| current.to_string(), str::to_string);
            store
                .update(&collection.doc(&question.id), single_field(VIDEO_URL, target_url))
                .await?;
            report.questions_updated += 1;
            log.write(&format!(
                "  - Question: {}\n    Old URL: {}\n    New URL: {}",
                question.id, old_url, target_url
            ))?;
            pause(delay).await;
        }
    }

    info!("Checking for questions inside test models...");
    log.write("\nTest Models with Questions:")?;
    let tests_ref = CollectionRef::root("Tests");

    for test in store.list(&tests_ref).await? {
        let Some(Value::Array(parts)) = test.fields.get(PART_QUESTIONS) else {
            continue;
        };
        let mut parts = parts.clone();
        let (checked, changes) = rewrite_part_questions(&mut parts, target_url);
        report.questions_checked += checked;
        if changes.is_empty() {
            continue;
        }

        log.write(&format!("Test: {}", test.id))?;
        for (part, index, old_url) in &changes {
            log.write(&format!(
                "  - Question in part {}, index {}\n    Old URL: {}\n    New URL: {}",
                part, index, old_url, target_url
            ))?;
        }

        let mut fields = Fields::new();
        fields.insert(PART_QUESTIONS.to_string(), Value::Array(parts));
        store.update(&tests_ref.doc(&test.id), fields).await?;
        report.questions_updated += changes.len();
        report.tests_rewritten += 1;
        info!("Updated test: {}", test.id);
        pause(delay * 2).await;
    }

    log.write(&format!(
        "\nQuestion Summary:\nTotal questions checked: {}\nQuestions updated: {}",
        report.questions_checked, report.questions_updated
    ))?;
    info!(
        "Questions updated: {} of {}",
        report.questions_updated, report.questions_checked
    );
    Ok(())
}

/// Point every lesson and question at `target_url`
///
/// The target must be a YouTube URL with an extractable video id. Lessons
/// already on the target are left untouched; lessons without a video get
/// one. Only question documents that already carry a `videoUrl` change.
pub async fn update_video_urls(
    store: &dyn DocumentStore,
    target_url: &str,
    question_collections: &[String],
    log_dir: &Path,
    delay: Duration,
) -> Result<VideoUpdateReport> {
    let video_id = youtube::extract_video_id(target_url)
        .ok_or_else(|| anyhow!("Not a YouTube video URL: {}", target_url))?;
    info!("Updating all videoUrl fields to {} (video {})", target_url, video_id);

    let log = UpdateLog::create(log_dir, target_url)?;
    let mut report = VideoUpdateReport {
        log_file: log.path.clone(),
        ..VideoUpdateReport::default()
    };

    let result: Result<()> = async {
        update_lessons(store, target_url, &log, delay, &mut report).await?;
        update_questions(store, target_url, question_collections, &log, delay, &mut report).await
    }
    .await;

    if let Err(e) = &result {
        log.write(&format!("\nERROR: {:#}", e))?;
        return Err(anyhow!("Video URL update failed: {:#}", e));
    }

    log.write(&format!(
        "\nFinal Summary:\nTotal items updated: {}\nCompleted at: {}",
        report.total_updated(),
        FileManager::log_timestamp()
    ))?;
    info!(
        "Update complete! Total items updated: {}. Log file: {}",
        report.total_updated(),
        report.log_file.display()
    );

    Ok(report)
}
