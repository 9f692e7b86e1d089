use rand::Rng;
use rand::seq::SliceRandom;

use super::models::{
    ChoiceQuestion, Course, CourseTest, SpeakingQuestion, TestQuestions, WritingQuestion,
    vocabulary_id,
};
use crate::segmenter::VocabularyEntry;

// @module: Per-course test generation

const DISTRACTORS: usize = 3;

/// Build one test per course covering every word of its lessons
pub fn build_course_tests<R: Rng + ?Sized>(courses: &[Course], rng: &mut R) -> Vec<CourseTest> {
    courses.iter().map(|course| build_course_test(course, rng)).collect()
}

fn build_course_test<R: Rng + ?Sized>(course: &Course, rng: &mut R) -> CourseTest {
    let vocabulary: Vec<&VocabularyEntry> = course.all_vocabulary().collect();

    let mut questions = TestQuestions::default();

    for (index, entry) in vocabulary.iter().enumerate() {
        let word_id = vocabulary_id(&entry.english);
        let options = choice_options(&vocabulary, index, |e| e.vietnamese.as_str(), rng);
        questions.listening.push(ChoiceQuestion {
            question_id: format!("listening_{}", word_id),
            question_text: format!("Listen and choose the correct meaning for: {}", entry.english),
            audio_url: Some(format!("https://example.com/audio/{}.mp3", word_id)),
            options,
            correct_answer: entry.vietnamese.clone(),
            explanation: format!(
                "The word '{}' means '{}' in Vietnamese.",
                entry.english, entry.vietnamese
            ),
        });
    }

    for (index, entry) in vocabulary.iter().enumerate() {
        let example = if entry.example.is_empty() {
            format!("This is an example with the word {}.", entry.english)
        } else {
            entry.example.clone()
        };
        let options = choice_options(&vocabulary, index, |e| e.english.as_str(), rng);
        questions.reading.push(ChoiceQuestion {
            question_id: format!("reading_{}", vocabulary_id(&entry.english)),
            question_text: format!(
                "Choose the correct word to complete the sentence: {}",
                example.replace(&entry.english, "_____")
            ),
            audio_url: None,
            options,
            correct_answer: entry.english.clone(),
            explanation: format!(
                "The correct word is '{}', which means '{}' in Vietnamese.",
                entry.english, entry.vietnamese
            ),
        });
    }

    for entry in &vocabulary {
        let word_id = vocabulary_id(&entry.english);
        questions.speaking.push(SpeakingQuestion {
            question_id: format!("speaking_{}", word_id),
            question_text: format!("Pronounce the word: {}", entry.english),
            word_to_speak: entry.english.clone(),
            audio_url_reference: format!("https://example.com/audio/{}_reference.mp3", word_id),
            explanation: format!("Practice pronouncing '{}' correctly.", entry.english),
        });
    }

    for entry in &vocabulary {
        questions.writing.push(WritingQuestion {
            question_id: format!("writing_{}", vocabulary_id(&entry.english)),
            question_text: format!("Write the English word for: {}", entry.vietnamese),
            correct_answer: entry.english.clone(),
            explanation: format!(
                "The English word for '{}' is '{}'.",
                entry.vietnamese, entry.english
            ),
        });
    }

    CourseTest {
        test_id: format!("{}_test", course.course_id),
        course_id: course.course_id.clone(),
        title: format!("Test for {}", course.title),
        description: format!("Comprehensive test covering vocabulary from {}", course.title),
        duration: "30:00".to_string(),
        pass_score: 70,
        questions,
    }
}

/// The answer of entry `index` plus up to three answers of other entries, shuffled
fn choice_options<R, F>(vocabulary: &[&VocabularyEntry], index: usize, field: F, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
    F: Fn(&VocabularyEntry) -> &str,
{
    let target = vocabulary[index];
    let mut wrong: Vec<&str> = vocabulary
        .iter()
        .filter(|entry| **entry != target)
        .map(|entry| field(entry))
        .collect();
    wrong.shuffle(rng);

    let mut options: Vec<String> = std::iter::once(field(target))
        .chain(wrong.into_iter().take(DISTRACTORS))
        .map(str::to_string)
        .collect();
    options.shuffle(rng);
    options
}
