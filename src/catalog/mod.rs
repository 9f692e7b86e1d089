/*!
 * Course catalog generation.
 *
 * Turns segmented topics into the documents the mobile client reads:
 * - `builder`: courses made of fixed-size lessons
 * - `quiz`: one test per course with listening, reading, speaking and
 *   writing questions
 * - `practice`: the four-part practice test built from a lesson
 *   vocabulary export
 *
 * Randomness is injected so callers can seed it.
 */

pub mod builder;
pub mod models;
pub mod practice;
pub mod quiz;

pub use builder::build_courses;
pub use models::{
    ChoiceQuestion, Course, CourseTest, Lesson, LessonVocabulary, LessonWords, PracticePart,
    PracticeQuestion, PracticeTest, QuestionType, SpeakingQuestion, TestQuestions,
    VocabularyItem, WritingQuestion, vocabulary_id,
};
pub use practice::{PracticeTestSettings, build_practice_test};
pub use quiz::build_course_tests;
