/*!
 * Tests for course, course test and practice test generation
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use vocabkit::app_config::CourseConfig;
use vocabkit::catalog::{
    LessonVocabulary, PracticeTestSettings, QuestionType, VocabularyItem, build_course_tests,
    build_courses, build_practice_test,
};
use vocabkit::segment;
use crate::common;

/// Test that the sample dataset becomes three courses with chunked lessons
#[test]
fn test_buildCourses_withSampleDataset_shouldChunkLessons() {
    let topics = segment(common::SAMPLE_DATASET);
    let mut rng = StdRng::seed_from_u64(1);

    let courses = build_courses(&topics, &CourseConfig::default(), &mut rng);

    assert_eq!(courses.len(), 3);
    let ids: Vec<&str> = courses.iter().map(|c| c.course_id.as_str()).collect();
    assert_eq!(ids, vec!["toeic1", "toeic2", "toeic3"]);

    let contracts = &courses[0];
    assert_eq!(contracts.lessons.len(), 2);
    assert_eq!(contracts.lessons[0].vocabulary_count, 5);
    assert_eq!(contracts.lessons[1].vocabulary_count, 1);
    assert_eq!(contracts.lessons[1].vocabulary[0].english, "establish");
    assert_eq!(contracts.duration, "30 minutes");
    assert_eq!(contracts.category, "TOEIC Vocabulary");
    assert_eq!(contracts.instructor, "Amanda Peterson");

    assert_eq!(courses[2].title, "TOEIC 3: TOEIC Topic 3");
}

/// Test that a custom lesson size is honored
#[test]
fn test_buildCourses_withCustomLessonSize_shouldUseIt() {
    let topics = segment(common::SAMPLE_DATASET);
    let settings = CourseConfig {
        lesson_size: 3,
        lesson_minutes: 10,
        ..CourseConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(2);

    let courses = build_courses(&topics, &settings, &mut rng);

    assert_eq!(courses[0].lessons.len(), 2);
    assert_eq!(courses[0].duration, "20 minutes");
    assert_eq!(courses[0].lessons[0].duration, "10:00");
    assert!(courses[0].lessons[0].description.starts_with("Learn 3 essential"));
}

/// Test that lesson documents serialize with the client's field names
#[test]
fn test_lesson_serialization_shouldUseClientFieldNames() {
    let topics = segment(common::SAMPLE_DATASET);
    let mut rng = StdRng::seed_from_u64(3);
    let courses = build_courses(&topics, &CourseConfig::default(), &mut rng);

    let value = serde_json::to_value(&courses[0].lessons[0]).unwrap();

    assert_eq!(value["lessonId"], "toeic1_lesson_1");
    assert_eq!(value["lessonNumber"], 1);
    assert_eq!(value["isLocked"], false);
    assert_eq!(value["vocabulary_count"], 5);
    assert_eq!(value["videoUrl"], "https://www.youtube.com/watch?v=example1_1");
}

/// Test that every course gets one test with a question per word and skill
#[test]
fn test_buildCourseTests_withSampleCourses_shouldCoverEveryWord() {
    let topics = segment(common::SAMPLE_DATASET);
    let mut rng = StdRng::seed_from_u64(4);
    let courses = build_courses(&topics, &CourseConfig::default(), &mut rng);

    let tests = build_course_tests(&courses, &mut rng);

    assert_eq!(tests.len(), 3);
    let contracts = &tests[0];
    assert_eq!(contracts.test_id, "toeic1_test");
    assert_eq!(contracts.questions.listening.len(), 6);
    assert_eq!(contracts.questions.writing[0].correct_answer, "agreement");
    assert_eq!(contracts.questions.speaking[0].word_to_speak, "agreement");

    // A single-word course has no distractors
    let single = &tests[2];
    assert_eq!(single.questions.listening[0].options, vec!["(v) tiêu thụ".to_string()]);
}

fn meeting_lessons() -> LessonVocabulary {
    let items = [
        ("Schedule", "Lịch trình", "toeic38_lesson_1"),
        ("Agenda", "Chương trình nghị sự", "toeic38_lesson_1"),
        ("Minutes", "Biên bản", "toeic38_lesson_1"),
        ("Deadline", "Hạn chót", "toeic38_lesson_2"),
        ("Appointment", "Cuộc hẹn", "toeic38_lesson_2"),
        ("Reschedule", "Sắp xếp lại lịch", "toeic38_lesson_2"),
    ]
    .iter()
    .map(|(english, vietnamese, lesson)| {
        let mut item = VocabularyItem::with_phonetic(english, vietnamese, "");
        item.lesson_id = Some(lesson.to_string());
        item
    })
    .collect();

    LessonVocabulary::group_by_lesson(items)
}

/// Test that each practice part is capped by the vocabulary size
#[test]
fn test_buildPracticeTest_withSmallVocabulary_shouldCapQuestions() {
    let lessons = meeting_lessons();
    let mut rng = StdRng::seed_from_u64(5);

    let test = build_practice_test(&lessons, &PracticeTestSettings::default(), &mut rng);

    assert_eq!(test.name_test, "TOEIC38 Vocabulary Practice Test");
    let keys: Vec<&str> = test.parts.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["part_1", "part_2", "part_3", "part_4"]);

    for part in test.parts.values() {
        assert_eq!(part.questions.len(), 6);
    }
    assert!(test.parts["part_3"]
        .questions
        .iter()
        .all(|q| q.question_type == QuestionType::Writing));
}

/// Test that the configured question count is honored
#[test]
fn test_buildPracticeTest_withFewerQuestions_shouldSample() {
    let lessons = meeting_lessons();
    let settings = PracticeTestSettings {
        questions_per_part: 2,
        ..PracticeTestSettings::default()
    };
    let mut rng = StdRng::seed_from_u64(6);

    let test = build_practice_test(&lessons, &settings, &mut rng);

    for part in test.parts.values() {
        assert_eq!(part.questions.len(), 2);
        for question in &part.questions {
            assert!(question.correct_answer < question.options.len());
        }
    }
}

/// Test that an empty vocabulary gives empty parts
#[test]
fn test_buildPracticeTest_withEmptyVocabulary_shouldGiveEmptyParts() {
    let mut rng = StdRng::seed_from_u64(7);

    let test = build_practice_test(&LessonVocabulary::new(), &PracticeTestSettings::default(), &mut rng);

    assert_eq!(test.parts.len(), 4);
    assert!(test.parts.values().all(|part| part.questions.is_empty()));
}

/// Test that practice questions serialize with camelCase names and lowercase types
#[test]
fn test_practiceQuestion_serialization_shouldMatchClientShape() {
    let lessons = meeting_lessons();
    let mut rng = StdRng::seed_from_u64(8);
    let test = build_practice_test(&lessons, &PracticeTestSettings::default(), &mut rng);

    let value = serde_json::to_value(&test).unwrap();

    assert!(value.get("nameTest").is_some());
    let question = &value["parts"]["part_1"]["questions"][0];
    assert_eq!(question["questionType"], "listening");
    assert!(question.get("correctAnswer").unwrap().is_u64());
    assert!(question.get("phoneticText").is_some());
}
