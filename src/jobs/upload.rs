use anyhow::{Context, Result};
use log::{debug, info};
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::CourseConfig;
use crate::catalog::{Course, CourseTest, build_course_tests, build_courses};
use crate::file_utils::FileManager;
use crate::segmenter::segment_file;
use crate::store::{CollectionRef, DocumentStore, to_fields};

// @module: Dataset to store upload pipeline

/// Courses and tests built from one dataset
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub tests: Vec<CourseTest>,
}

/// Counts reported after an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadReport {
    pub courses: usize,
    pub lessons: usize,
    pub vocabulary_items: usize,
    pub tests: usize,
}

/// Segment the dataset and build its courses and tests
///
/// Fails before anything else when the dataset file does not exist.
pub fn prepare_catalog<R: Rng + ?Sized>(
    dataset: &Path,
    settings: &CourseConfig,
    rng: &mut R,
) -> Result<Catalog> {
    info!("Parsing dataset: {}", dataset.display());
    let topics = segment_file(dataset)?;
    info!("Found {} topics with vocabulary", topics.len());

    let courses = build_courses(&topics, settings, rng);
    info!("Created {} courses", courses.len());

    let tests = build_course_tests(&courses, rng);
    info!("Created {} tests", tests.len());

    Ok(Catalog { courses, tests })
}

/// Write the catalog as pretty JSON
pub fn export_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    FileManager::write_json(path, catalog)
        .with_context(|| format!("Failed to export catalog to {}", path.display()))?;
    info!("Catalog exported to {}", path.display());
    Ok(())
}

/// Upload courses, their lessons and the course tests
///
/// Course documents omit `lessons`; lesson documents carry their words as
/// `vocabularyItems` instead of `vocabulary`. `write_delay` is slept after
/// every course.
pub async fn upload_catalog(
    store: &dyn DocumentStore,
    catalog: &Catalog,
    write_delay: Duration,
) -> Result<UploadReport> {
    let courses_ref = CollectionRef::root("Courses");
    let tests_ref = CollectionRef::root("Tests");
    let mut report = UploadReport::default();

    let progress = super::progress_bar((catalog.courses.len() + catalog.tests.len()) as u64, "documents");

    for course in &catalog.courses {
        let course_doc = courses_ref.doc(&course.course_id);

        let mut fields = to_fields(course)?;
        fields.remove("lessons");
        store
            .set(&course_doc, fields)
            .await
            .with_context(|| format!("Failed to upload course {}", course.course_id))?;
        debug!("Uploaded course: {}", course.course_id);
        report.courses += 1;

        let lessons_ref = course_doc.collection("Lessons");
        for lesson in &course.lessons {
            let items = lesson.vocabulary_items();
            let mut fields = to_fields(lesson)?;
            fields.remove("vocabulary");
            fields.insert("vocabularyItems".to_string(), serde_json::to_value(&items)?);

            store
                .set(&lessons_ref.doc(&lesson.lesson_id), fields)
                .await
                .with_context(|| format!("Failed to upload lesson {}", lesson.lesson_id))?;
            debug!("Uploaded lesson {} with {} vocabulary items", lesson.lesson_id, items.len());

            report.lessons += 1;
            report.vocabulary_items += items.len();
        }

        progress.inc(1);
        progress.set_message(course.course_id.clone());
        if !write_delay.is_zero() {
            tokio::time::sleep(write_delay).await;
        }
    }

    for test in &catalog.tests {
        store
            .set(&tests_ref.doc(&test.test_id), to_fields(test)?)
            .await
            .with_context(|| format!("Failed to upload test {}", test.test_id))?;
        debug!("Uploaded test: {}", test.test_id);
        report.tests += 1;
        progress.inc(1);
    }

    progress.finish_with_message("Upload complete");
    info!(
        "Uploaded {} courses, {} lessons, {} vocabulary items and {} tests",
        report.courses, report.lessons, report.vocabulary_items, report.tests
    );

    Ok(report)
}

/// Options of the upload command
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Dataset text file
    pub dataset: PathBuf,
    /// Also write the built catalog here
    pub export_path: Option<PathBuf>,
    /// Build and export only
    pub skip_upload: bool,
}

/// Segment, build, optionally export, then upload
pub async fn run_upload<R: Rng + ?Sized>(
    store: &dyn DocumentStore,
    options: &UploadOptions,
    settings: &CourseConfig,
    write_delay: Duration,
    rng: &mut R,
) -> Result<UploadReport> {
    let catalog = prepare_catalog(&options.dataset, settings, rng)?;

    if let Some(path) = &options.export_path {
        export_catalog(&catalog, path)?;
    }

    if options.skip_upload {
        info!("Skipping upload");
        return Ok(UploadReport {
            courses: catalog.courses.len(),
            lessons: catalog.courses.iter().map(|c| c.lessons.len()).sum(),
            vocabulary_items: catalog.courses.iter().map(|c| c.all_vocabulary().count()).sum(),
            tests: catalog.tests.len(),
        });
    }

    info!("Uploading to {} store", store.backend_name());
    upload_catalog(store, &catalog, write_delay).await
}
