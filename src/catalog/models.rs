/*!
 * Catalog document shapes.
 *
 * Field names follow the camelCase layout the mobile client reads from the
 * store and from exported JSON files.
 */

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::segmenter::VocabularyEntry;

/// Document id of a vocabulary word: its english text with spaces as `_`
pub fn vocabulary_id(english: &str) -> String {
    english.replace(' ', "_")
}

/// Read a string field where `null` means empty
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A vocabulary word as stored in lessons and exported files
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub english: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vietnamese: String,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub example: String,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub phonetic: String,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
}

impl VocabularyItem {
    /// Stored form of a segmented entry
    pub fn from_entry(entry: &VocabularyEntry) -> Self {
        Self {
            english: entry.english.clone(),
            vietnamese: entry.vietnamese.clone(),
            example: entry.example.clone(),
            id: vocabulary_id(&entry.english),
            ..Self::default()
        }
    }

    /// Built-in entry with a phonetic transcription
    pub fn with_phonetic(english: &str, vietnamese: &str, phonetic: &str) -> Self {
        Self {
            english: english.to_string(),
            vietnamese: vietnamese.to_string(),
            phonetic: phonetic.to_string(),
            ..Self::default()
        }
    }

    /// True when both the word and its meaning are present
    pub fn is_complete(&self) -> bool {
        !self.english.trim().is_empty() && !self.vietnamese.trim().is_empty()
    }
}

/// One lesson: a fixed-size slice of a topic's vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub lesson_id: String,
    pub lesson_number: usize,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub is_locked: bool,
    pub course_id: String,
    pub video_url: String,
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(rename = "vocabulary_count")]
    pub vocabulary_count: usize,
}

impl Lesson {
    /// Stored vocabulary items, each with its id
    pub fn vocabulary_items(&self) -> Vec<VocabularyItem> {
        self.vocabulary.iter().map(VocabularyItem::from_entry).collect()
    }
}

/// A course built from one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub duration: String,
    pub instructor: String,
    pub language: String,
    pub level: String,
    pub last_updated: String,
    pub favorite_count: u32,
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Every entry of every lesson, in lesson order
    pub fn all_vocabulary(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.lessons.iter().flat_map(|lesson| lesson.vocabulary.iter())
    }
}

/// Multiple choice question with the answer given as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    pub question_id: String,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingQuestion {
    pub question_id: String,
    pub question_text: String,
    pub word_to_speak: String,
    pub audio_url_reference: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingQuestion {
    pub question_id: String,
    pub question_text: String,
    pub correct_answer: String,
    pub explanation: String,
}

/// Questions of a course test, grouped by skill
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestQuestions {
    pub listening: Vec<ChoiceQuestion>,
    pub reading: Vec<ChoiceQuestion>,
    pub speaking: Vec<SpeakingQuestion>,
    pub writing: Vec<WritingQuestion>,
}

/// Test covering every word of one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTest {
    pub test_id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub pass_score: u32,
    pub questions: TestQuestions,
}

/// Skill exercised by a practice question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Listening,
    Reading,
    Writing,
    Speaking,
}

/// Practice question whose answer is an index into `options`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub explanation: String,
    pub word: String,
    pub phonetic_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_text: Option<String>,
    pub question_type: QuestionType,
}

impl PracticeQuestion {
    /// Text of the option marked correct
    pub fn answer(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticePart {
    pub title: String,
    pub description: String,
    pub questions: Vec<PracticeQuestion>,
}

/// Four-part practice test keyed `part_1` to `part_4`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeTest {
    pub name_test: String,
    pub description: String,
    pub parts: BTreeMap<String, PracticePart>,
}

/// Vocabulary of one lesson in the exported lesson map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonWords {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
}

/// Lesson id to vocabulary map, kept in lesson order
///
/// Serialized as a JSON object; lesson order survives a write and read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LessonVocabulary {
    lessons: Vec<(String, LessonWords)>,
}

impl LessonVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lesson, replacing an earlier one with the same id
    pub fn insert(&mut self, lesson_id: impl Into<String>, words: LessonWords) {
        let lesson_id = lesson_id.into();
        match self.lessons.iter_mut().find(|(id, _)| *id == lesson_id) {
            Some((_, existing)) => *existing = words,
            None => self.lessons.push((lesson_id, words)),
        }
    }

    pub fn get(&self, lesson_id: &str) -> Option<&LessonWords> {
        self.lessons
            .iter()
            .find(|(id, _)| id == lesson_id)
            .map(|(_, words)| words)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LessonWords)> {
        self.lessons.iter().map(|(id, words)| (id.as_str(), words))
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Every item of every lesson, in lesson order
    pub fn all_items(&self) -> impl Iterator<Item = &VocabularyItem> {
        self.lessons.iter().flat_map(|(_, words)| words.vocabulary.iter())
    }

    /// Group loose items by their `lessonId`, first appearance first
    pub fn group_by_lesson(items: Vec<VocabularyItem>) -> Self {
        let mut grouped = Self::new();
        for item in items {
            let lesson_id = item.lesson_id.clone().unwrap_or_else(|| "unknown".to_string());
            match grouped.lessons.iter_mut().find(|(id, _)| *id == lesson_id) {
                Some((_, words)) => words.vocabulary.push(item),
                None => {
                    let words = LessonWords {
                        title: lesson_id.clone(),
                        vocabulary: vec![item],
                    };
                    grouped.lessons.push((lesson_id, words));
                }
            }
        }
        grouped
    }
}

impl Serialize for LessonVocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lessons.len()))?;
        for (lesson_id, words) in &self.lessons {
            map.serialize_entry(lesson_id, words)?;
        }
        map.end()
    }
}

struct LessonVocabularyVisitor;

impl<'de> Visitor<'de> for LessonVocabularyVisitor {
    type Value = LessonVocabulary;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of lesson ids to lesson vocabulary")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut lessons = LessonVocabulary::new();
        while let Some((lesson_id, words)) = access.next_entry::<String, LessonWords>()? {
            lessons.insert(lesson_id, words);
        }
        Ok(lessons)
    }
}

impl<'de> Deserialize<'de> for LessonVocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LessonVocabularyVisitor)
    }
}
