use anyhow::Result;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog::{LessonVocabulary, VocabularyItem};
use crate::errors::SegmentError;
use crate::file_utils::FileManager;

// @module: Mobile client vocabulary assets

/// Word as the mobile client's vocabulary screen reads it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWord {
    pub english: String,
    pub vietnamese: String,
    pub phonetic: String,
    pub is_selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl AssetWord {
    /// Trimmed copy of a complete item, `None` if english or meaning is missing
    fn from_item(item: &VocabularyItem) -> Option<Self> {
        if item.english.is_empty() || item.vietnamese.is_empty() {
            return None;
        }
        Some(Self {
            english: item.english.trim().to_string(),
            vietnamese: item.vietnamese.trim().to_string(),
            phonetic: item.phonetic.trim().to_string(),
            is_selected: false,
            lesson_id: None,
            course_id: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonAsset<'a> {
    lesson_id: &'a str,
    course_id: &'a str,
    title: &'a str,
    vocabulary: &'a [AssetWord],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseAsset<'a> {
    course_id: &'a str,
    title: &'a str,
    vocabulary: &'a [AssetWord],
}

/// Files and word counts written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidExportReport {
    pub lesson_files: Vec<PathBuf>,
    pub combined_file: PathBuf,
    pub words: usize,
}

/// Write one asset per lesson plus a combined course asset
pub fn export_lessons(
    lessons: &LessonVocabulary,
    assets_dir: &Path,
    course_id: &str,
    course_title: &str,
) -> Result<AndroidExportReport> {
    FileManager::ensure_dir(assets_dir)?;

    let mut lesson_files = Vec::new();
    let mut all_words = Vec::new();

    for (lesson_id, words) in lessons.iter() {
        let vocabulary: Vec<AssetWord> = words.vocabulary.iter().filter_map(AssetWord::from_item).collect();
        let title = match words.title.trim() {
            "" => format!("Lesson {}", lesson_id),
            title => title.to_string(),
        };

        let path = assets_dir.join(format!("{}_vocabulary.json", lesson_id));
        FileManager::write_json(
            &path,
            &LessonAsset {
                lesson_id,
                course_id,
                title: &title,
                vocabulary: &vocabulary,
            },
        )?;
        info!("Created vocabulary file for {} with {} words", title, vocabulary.len());
        lesson_files.push(path);

        all_words.extend(vocabulary.into_iter().map(|word| AssetWord {
            lesson_id: Some(lesson_id.to_string()),
            course_id: Some(course_id.to_string()),
            ..word
        }));
    }

    let combined_file = assets_dir.join(format!("{}_all_vocabulary.json", course_id));
    FileManager::write_json(
        &combined_file,
        &CourseAsset {
            course_id,
            title: course_title,
            vocabulary: &all_words,
        },
    )?;
    info!("Created combined vocabulary file with {} words", all_words.len());

    Ok(AndroidExportReport {
        lesson_files,
        combined_file,
        words: all_words.len(),
    })
}

/// Read the lesson vocabulary file and export it to the assets directory
pub fn run_android_export(
    vocabulary_file: &Path,
    assets_dir: &Path,
    course_id: &str,
    course_title: &str,
) -> Result<AndroidExportReport> {
    if !FileManager::file_exists(vocabulary_file) {
        return Err(SegmentError::InputNotFound(vocabulary_file.to_path_buf()).into());
    }

    let lessons: LessonVocabulary = FileManager::read_json(vocabulary_file)?;
    info!("Loaded vocabulary data for {} lessons", lessons.len());

    export_lessons(&lessons, assets_dir, course_id, course_title)
}
