use anyhow::Result;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::VocabularyItem;
use crate::store::{CollectionRef, Document, DocumentStore};

// @module: Store content verification report

const SAMPLE_WORDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonSummary {
    pub lesson_id: String,
    pub title: String,
    pub duration: String,
    pub vocabulary_count: Option<i64>,
    /// First vocabulary items of the lesson
    pub samples: Vec<VocabularyItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub lessons: Vec<LessonSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub test_id: String,
    pub title: String,
    pub duration: String,
    pub pass_score: Option<i64>,
    /// Question count per question type
    pub question_counts: BTreeMap<String, usize>,
}

/// What the store holds for courses and tests
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VerificationReport {
    pub courses: Vec<CourseSummary>,
    pub tests: Vec<TestSummary>,
}

fn text(document: &Document, key: &str) -> String {
    document.str_field(key).unwrap_or_default().to_string()
}

fn summarize_lesson(lesson: &Document) -> LessonSummary {
    let samples = lesson
        .array_field("vocabularyItems")
        .map(|items| {
            items
                .iter()
                .take(SAMPLE_WORDS)
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    LessonSummary {
        lesson_id: lesson.str_field("lessonId").unwrap_or(&lesson.id).to_string(),
        title: text(lesson, "title"),
        duration: text(lesson, "duration"),
        vocabulary_count: lesson.i64_field("vocabulary_count"),
        samples,
    }
}

fn summarize_test(test: &Document) -> TestSummary {
    let question_counts = match test.fields.get("questions") {
        Some(Value::Object(groups)) => groups
            .iter()
            .map(|(kind, questions)| (kind.clone(), questions.as_array().map_or(0, Vec::len)))
            .collect(),
        _ => BTreeMap::new(),
    };

    TestSummary {
        test_id: test.str_field("testId").unwrap_or(&test.id).to_string(),
        title: text(test, "title"),
        duration: text(test, "duration"),
        pass_score: test.i64_field("passScore"),
        question_counts,
    }
}

/// Summarize every course with its lessons, and every test
pub async fn verify_catalog(store: &dyn DocumentStore) -> Result<VerificationReport> {
    let courses_ref = CollectionRef::root("Courses");
    let mut report = VerificationReport::default();

    for course in store.list(&courses_ref).await? {
        let lessons = store
            .list(&courses_ref.doc(&course.id).collection("Lessons"))
            .await?;

        report.courses.push(CourseSummary {
            course_id: course.str_field("courseId").unwrap_or(&course.id).to_string(),
            title: text(&course, "title"),
            description: text(&course, "description"),
            category: text(&course, "category"),
            duration: text(&course, "duration"),
            lessons: lessons.iter().map(summarize_lesson).collect(),
        });
    }

    for test in store.list(&CollectionRef::root("Tests")).await? {
        report.tests.push(summarize_test(&test));
    }

    log_report(&report);
    Ok(report)
}

fn log_report(report: &VerificationReport) {
    info!("=== COURSES ({}) ===", report.courses.len());
    for course in &report.courses {
        info!("Course {}: {} [{}, {}]", course.course_id, course.title, course.category, course.duration);
        info!("  --- Lessons ({}) ---", course.lessons.len());
        for lesson in &course.lessons {
            info!(
                "  {}: {} ({}), {} words",
                lesson.lesson_id,
                lesson.title,
                lesson.duration,
                lesson.vocabulary_count.map_or_else(|| "?".to_string(), |n| n.to_string())
            );
            for (index, item) in lesson.samples.iter().enumerate() {
                info!("    {}. {} - {}", index + 1, item.english, item.vietnamese);
                if !item.example.is_empty() {
                    info!("       Example: {}", item.example);
                }
            }
        }
    }

    info!("=== TESTS ({}) ===", report.tests.len());
    for test in &report.tests {
        info!("Test {}: {} ({})", test.test_id, test.title, test.duration);
        for (kind, count) in &test.question_counts {
            info!("  {} questions: {}", kind, count);
        }
    }
}
