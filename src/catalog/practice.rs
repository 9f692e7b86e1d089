/*!
 * Four-part practice test generation.
 *
 * Each part draws its own random sample of the course vocabulary. Answers
 * are stored as an index into `options`, the shape the mobile client's
 * test screens expect.
 */

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::BTreeMap;

use super::models::{
    LessonVocabulary, PracticePart, PracticeQuestion, PracticeTest, QuestionType, VocabularyItem,
};

const DISTRACTORS: usize = 3;

/// Titles and descriptions of the generated test
#[derive(Debug, Clone)]
pub struct PracticeTestSettings {
    pub name: String,
    pub description: String,
    pub questions_per_part: usize,
}

impl Default for PracticeTestSettings {
    fn default() -> Self {
        Self {
            name: "TOEIC38 Vocabulary Practice Test".to_string(),
            description: "Luyện tập từ vựng TOEIC về Business Meetings".to_string(),
            questions_per_part: 10,
        }
    }
}

/// Build the listening, reading, writing and speaking parts
pub fn build_practice_test<R: Rng + ?Sized>(
    lessons: &LessonVocabulary,
    settings: &PracticeTestSettings,
    rng: &mut R,
) -> PracticeTest {
    let pool: Vec<&VocabularyItem> = lessons.all_items().filter(|item| item.is_complete()).collect();
    let count = settings.questions_per_part;

    let mut parts = BTreeMap::new();
    parts.insert(
        "part_1".to_string(),
        PracticePart {
            title: "Listening Practice".to_string(),
            description: "Listen to the word and select the correct meaning".to_string(),
            questions: sample(&pool, count, rng)
                .into_iter()
                .map(|item| listening_question(item, &pool, rng))
                .collect(),
        },
    );
    parts.insert(
        "part_2".to_string(),
        PracticePart {
            title: "Reading Practice".to_string(),
            description: "Read and understand the vocabulary meaning".to_string(),
            questions: sample(&pool, count, rng)
                .into_iter()
                .map(|item| reading_question(item, &pool, rng))
                .collect(),
        },
    );
    parts.insert(
        "part_3".to_string(),
        PracticePart {
            title: "Writing Practice".to_string(),
            description: "Complete sentences with appropriate vocabulary".to_string(),
            questions: sample(&pool, count, rng)
                .into_iter()
                .map(|item| writing_question(item, &pool, rng))
                .collect(),
        },
    );
    parts.insert(
        "part_4".to_string(),
        PracticePart {
            title: "Speaking Practice".to_string(),
            description: "Practice pronunciation and using vocabulary in context".to_string(),
            questions: sample(&pool, count, rng)
                .into_iter()
                .map(|item| speaking_question(item, rng))
                .collect(),
        },
    );

    PracticeTest {
        name_test: settings.name.clone(),
        description: settings.description.clone(),
        parts,
    }
}

fn sample<'a, R: Rng + ?Sized>(
    pool: &[&'a VocabularyItem],
    count: usize,
    rng: &mut R,
) -> Vec<&'a VocabularyItem> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Up to three distinct values other than `answer`, drawn from the pool
fn distractors<'a, R, F>(pool: &[&'a VocabularyItem], answer: &str, field: F, rng: &mut R) -> Vec<&'a str>
where
    R: Rng + ?Sized,
    F: Fn(&'a VocabularyItem) -> &'a str,
{
    let mut candidates: Vec<&str> = Vec::new();
    for item in pool {
        let value = field(*item);
        if value != answer && !candidates.contains(&value) {
            candidates.push(value);
        }
    }
    candidates.shuffle(rng);
    candidates.truncate(DISTRACTORS);
    candidates
}

/// Shuffle the answer in with its distractors, returning options and answer index
fn shuffled_options<'a, R: Rng + ?Sized>(
    answer: &'a str,
    wrong: Vec<&'a str>,
    rng: &mut R,
) -> (Vec<String>, usize) {
    let mut options: Vec<String> = std::iter::once(answer)
        .chain(wrong)
        .map(str::to_string)
        .collect();
    options.shuffle(rng);
    let index = options.iter().position(|option| option == answer).unwrap_or(0);
    (options, index)
}

fn listening_question<R: Rng + ?Sized>(
    item: &VocabularyItem,
    pool: &[&VocabularyItem],
    rng: &mut R,
) -> PracticeQuestion {
    let wrong = distractors(pool, &item.english, |v| v.english.as_str(), rng);
    let (options, correct_answer) = shuffled_options(&item.english, wrong, rng);

    PracticeQuestion {
        question_text: "Bạn nghe từ. Chọn từ tiếng Anh đúng với từ bạn vừa nghe.".to_string(),
        options,
        correct_answer,
        audio_url: Some(String::new()),
        explanation: format!(
            "Từ bạn nghe là '{}' ({}) có nghĩa là '{}'.",
            item.english, item.phonetic, item.vietnamese
        ),
        word: item.english.clone(),
        phonetic_text: item.phonetic.clone(),
        example_text: None,
        question_type: QuestionType::Listening,
    }
}

fn reading_question<R: Rng + ?Sized>(
    item: &VocabularyItem,
    pool: &[&VocabularyItem],
    rng: &mut R,
) -> PracticeQuestion {
    let wrong = distractors(pool, &item.vietnamese, |v| v.vietnamese.as_str(), rng);
    let (options, correct_answer) = shuffled_options(&item.vietnamese, wrong, rng);

    PracticeQuestion {
        question_text: format!("Đâu là nghĩa của '{}' ({})?", item.english, item.phonetic),
        options,
        correct_answer,
        audio_url: None,
        explanation: format!(
            "'{}' ({}) có nghĩa là '{}'.",
            item.english, item.phonetic, item.vietnamese
        ),
        word: item.english.clone(),
        phonetic_text: item.phonetic.clone(),
        example_text: None,
        question_type: QuestionType::Reading,
    }
}

const WRITING_TEMPLATES: [&str; 5] = [
    "We need to _____ a meeting with the clients next week.",
    "Please _____ the document before sending it to the manager.",
    "The team will _____ the new project next month.",
    "Can you _____ this information in your report?",
    "Our company needs to _____ new employees for the project.",
];

fn writing_question<R: Rng + ?Sized>(
    item: &VocabularyItem,
    pool: &[&VocabularyItem],
    rng: &mut R,
) -> PracticeQuestion {
    let sentence = WRITING_TEMPLATES.choose(rng).copied().unwrap_or(WRITING_TEMPLATES[0]);
    let wrong = distractors(pool, &item.english, |v| v.english.as_str(), rng);
    let (options, correct_answer) = shuffled_options(&item.english, wrong, rng);

    PracticeQuestion {
        question_text: format!("Hoàn thành câu sau bằng từ vựng phù hợp: '{}'", sentence),
        options,
        correct_answer,
        audio_url: None,
        explanation: format!(
            "Từ '{}' ({}) có nghĩa là '{}' và phù hợp để điền vào chỗ trống.",
            item.english, item.phonetic, item.vietnamese
        ),
        word: item.english.clone(),
        phonetic_text: item.phonetic.clone(),
        example_text: Some(sentence.replace("_____", &item.english)),
        question_type: QuestionType::Writing,
    }
}

fn speaking_question<R: Rng + ?Sized>(item: &VocabularyItem, rng: &mut R) -> PracticeQuestion {
    let word = item.english.to_lowercase();
    let contexts = [
        format!("Please {} the meeting for tomorrow.", word),
        format!("We need to {} our strategy before the deadline.", word),
        format!("The {} will be held in the main conference room.", word),
        format!("Can you {} this information to the team?", word),
        format!("Our company {} requires approval from management.", word),
    ];
    let example = contexts.choose(rng).cloned().unwrap_or_default();

    // Self-assessment answers; the first one is always marked correct
    let options = vec![
        format!("I can pronounce '{}' correctly.", item.english),
        "I need more practice with this word.".to_string(),
        format!("Let me try again with '{}'.", item.english),
        format!("I understand how to use '{}' in a sentence.", item.english),
    ];

    PracticeQuestion {
        question_text: format!(
            "Hãy phát âm từ '{}' ({}) và sử dụng nó trong câu sau: '{}'",
            item.english, item.phonetic, example
        ),
        options,
        correct_answer: 0,
        audio_url: Some(String::new()),
        explanation: format!(
            "'{}' ({}) có nghĩa là '{}'.",
            item.english, item.phonetic, item.vietnamese
        ),
        word: item.english.clone(),
        phonetic_text: item.phonetic.clone(),
        example_text: Some(example),
        question_type: QuestionType::Speaking,
    }
}
