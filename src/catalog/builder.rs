use chrono::Local;
use log::debug;
use rand::Rng;

use super::models::{Course, Lesson};
use crate::app_config::CourseConfig;
use crate::segmenter::Topic;

// @module: Course and lesson generation from segmented topics

/// Build one course per topic, in topic order
///
/// Course `N` (1-based) gets id `toeic<N>`; its vocabulary is cut into
/// consecutive lessons of `settings.lesson_size` entries.
pub fn build_courses<R: Rng + ?Sized>(
    topics: &[Topic],
    settings: &CourseConfig,
    rng: &mut R,
) -> Vec<Course> {
    let last_updated = Local::now().format("%B %Y").to_string();

    topics
        .iter()
        .enumerate()
        .map(|(index, topic)| build_course(index + 1, topic, settings, &last_updated, rng))
        .collect()
}

fn build_course<R: Rng + ?Sized>(
    number: usize,
    topic: &Topic,
    settings: &CourseConfig,
    last_updated: &str,
    rng: &mut R,
) -> Course {
    let course_id = format!("toeic{}", number);
    let lesson_size = settings.lesson_size.max(1);

    let lessons: Vec<Lesson> = topic
        .vocabulary
        .chunks(lesson_size)
        .enumerate()
        .map(|(index, chunk)| {
            let lesson_number = index + 1;
            Lesson {
                lesson_id: format!("{}_lesson_{}", course_id, lesson_number),
                lesson_number,
                title: format!("{} - Lesson {}", topic.name, lesson_number),
                description: format!(
                    "Learn {} essential TOEIC vocabulary words for {}",
                    lesson_size, topic.name
                ),
                duration: format!("{}:00", settings.lesson_minutes),
                is_locked: false,
                course_id: course_id.clone(),
                video_url: format!(
                    "https://www.youtube.com/watch?v=example{}_{}",
                    number, lesson_number
                ),
                vocabulary: chunk.to_vec(),
                vocabulary_count: chunk.len(),
            }
        })
        .collect();

    debug!(
        "Built course {} with {} lessons from topic '{}'",
        course_id,
        lessons.len(),
        topic.name
    );

    Course {
        title: format!("TOEIC {}: {}", number, topic.name),
        description: format!(
            "Master essential vocabulary for {} in this comprehensive TOEIC course.",
            topic.name
        ),
        category: settings.category.clone(),
        image_url: format!("https://example.com/images/toeic_{}.jpg", number),
        duration: format!("{} minutes", lessons.len() * settings.lesson_minutes),
        instructor: settings.instructor.clone(),
        language: settings.language.clone(),
        level: settings.level.clone(),
        last_updated: last_updated.to_string(),
        favorite_count: rng.random_range(200..=500),
        course_id,
        lessons,
    }
}
