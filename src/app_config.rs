use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::youtube;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Document store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Write batching and throttling
    #[serde(default)]
    pub batch: BatchConfig,

    /// Course and lesson generation
    #[serde(default)]
    pub course: CourseConfig,

    /// Course vocabulary fetch and export
    #[serde(default)]
    pub export: ExportConfig,

    /// Maintenance jobs
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Document store backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    // @backend: Local SQLite file
    #[default]
    Sqlite,
    // @backend: Cloud Firestore REST API
    Firestore,
    // @backend: Process memory, discarded on exit
    Memory,
}

impl StoreBackend {
    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Sqlite => "sqlite".to_string(),
            Self::Firestore => "firestore".to_string(),
            Self::Memory => "memory".to_string(),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(anyhow!("Invalid store backend: {}", s)),
        }
    }
}

/// Store connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    // @field: Backend type
    #[serde(default)]
    pub backend: StoreBackend,

    // @field: SQLite file, defaults to the user data directory
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,

    // @field: Firestore project id
    #[serde(default = "String::new")]
    pub project_id: String,

    // @field: Firestore database id
    #[serde(default = "default_database")]
    pub database: String,

    // @field: Firestore REST endpoint
    #[serde(default = "default_firestore_endpoint")]
    pub endpoint: String,

    // @field: Bearer token, falls back to FIRESTORE_ACCESS_TOKEN
    #[serde(default = "String::new")]
    pub access_token: String,

    // @field: Emulator host:port, falls back to FIRESTORE_EMULATOR_HOST
    #[serde(default)]
    pub emulator_host: Option<String>,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            sqlite_path: None,
            project_id: String::new(),
            database: default_database(),
            endpoint: default_firestore_endpoint(),
            access_token: String::new(),
            emulator_host: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Write batching settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Writes per committed batch (at most 500)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Pause after each committed batch, in milliseconds
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Pause after each single-document write, in milliseconds
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            write_delay_ms: default_write_delay_ms(),
        }
    }
}

/// Course generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CourseConfig {
    /// Vocabulary entries per lesson
    #[serde(default = "default_lesson_size")]
    pub lesson_size: usize,

    /// Minutes counted per lesson in the course duration
    #[serde(default = "default_lesson_minutes")]
    pub lesson_minutes: usize,

    #[serde(default = "default_instructor")]
    pub instructor: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            lesson_size: default_lesson_size(),
            lesson_minutes: default_lesson_minutes(),
            instructor: default_instructor(),
            category: default_category(),
            language: default_language(),
            level: default_level(),
        }
    }
}

/// Fetch and export settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Course whose vocabulary is fetched and exported
    #[serde(default = "default_course_id")]
    pub course_id: String,

    /// Title of the combined vocabulary file
    #[serde(default = "default_course_title")]
    pub course_title: String,

    /// Lesson vocabulary JSON written by fetch and read by later jobs
    #[serde(default = "default_vocabulary_file")]
    pub vocabulary_file: PathBuf,

    /// Local files tried when the store has no vocabulary
    #[serde(default = "default_fallback_files")]
    pub fallback_files: Vec<PathBuf>,

    /// Mobile client assets directory
    #[serde(default = "default_android_assets_dir")]
    pub android_assets_dir: PathBuf,

    /// Practice test JSON file
    #[serde(default = "default_practice_test_file")]
    pub practice_test_file: PathBuf,

    /// Questions generated per practice test part
    #[serde(default = "default_questions_per_part")]
    pub questions_per_part: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            course_id: default_course_id(),
            course_title: default_course_title(),
            vocabulary_file: default_vocabulary_file(),
            fallback_files: default_fallback_files(),
            android_assets_dir: default_android_assets_dir(),
            practice_test_file: default_practice_test_file(),
            questions_per_part: default_questions_per_part(),
        }
    }
}

/// Maintenance job settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MaintenanceConfig {
    /// Lesson ids removed from every course by cleanup
    #[serde(default = "default_duplicate_lessons")]
    pub duplicate_lessons: Vec<String>,

    /// Video URL written by update-videos
    #[serde(default = "default_video_url")]
    pub video_url: String,

    /// Top-level collections whose documents may carry a videoUrl
    #[serde(default = "default_question_collections")]
    pub question_collections: Vec<String>,

    /// Directory for update logs
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            duplicate_lessons: default_duplicate_lessons(),
            video_url: default_video_url(),
            question_collections: default_question_collections(),
            log_dir: default_log_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_firestore_endpoint() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_batch_size() -> usize {
    500 // Firestore's per-batch write limit
}

fn default_batch_pause_ms() -> u64 {
    1000
}

fn default_write_delay_ms() -> u64 {
    100
}

fn default_lesson_size() -> usize {
    5
}

fn default_lesson_minutes() -> usize {
    15
}

fn default_instructor() -> String {
    "Amanda Peterson".to_string()
}

fn default_category() -> String {
    "TOEIC Vocabulary".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_level() -> String {
    "Beginner to Intermediate".to_string()
}

fn default_course_id() -> String {
    "toeic38".to_string()
}

fn default_course_title() -> String {
    "TOEIC Advanced: Essential Meeting Vocabulary".to_string()
}

fn default_vocabulary_file() -> PathBuf {
    PathBuf::from("toeic38_vocabulary.json")
}

fn default_fallback_files() -> Vec<PathBuf> {
    vec![
        PathBuf::from("vocabulary_data.json"),
        PathBuf::from("lessons_with_vocabulary.json"),
    ]
}

fn default_android_assets_dir() -> PathBuf {
    PathBuf::from("app/src/main/assets")
}

fn default_practice_test_file() -> PathBuf {
    PathBuf::from("toeic38_test_data.json")
}

fn default_questions_per_part() -> usize {
    10
}

fn default_duplicate_lessons() -> Vec<String> {
    vec![
        "toeic_lesson_1_1".to_string(),
        "toeic_lesson_1_2".to_string(),
        "toeic_lesson_1_3".to_string(),
    ]
}

fn default_video_url() -> String {
    "https://www.youtube.com/watch?v=kFYgLjdSkXE".to_string()
}

fn default_question_collections() -> Vec<String> {
    vec![
        "Tests".to_string(),
        "Questions".to_string(),
        "examQuestions".to_string(),
    ]
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    AppError::Config(message.into()).into()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.course.lesson_size == 0 {
            return Err(config_error("course.lesson_size must be at least 1"));
        }

        if self.batch.max_batch_size == 0 || self.batch.max_batch_size > crate::store::MAX_BATCH_WRITES {
            return Err(config_error(format!(
                "batch.max_batch_size must be between 1 and {}",
                crate::store::MAX_BATCH_WRITES
            )));
        }

        if self.export.course_id.trim().is_empty() {
            return Err(config_error("export.course_id must not be empty"));
        }

        if youtube::extract_video_id(&self.maintenance.video_url).is_none() {
            return Err(config_error(format!(
                "maintenance.video_url is not a YouTube video URL: {}",
                self.maintenance.video_url
            )));
        }

        // The emulator also addresses documents by project
        if self.store.backend == StoreBackend::Firestore && self.store.project_id.trim().is_empty() {
            return Err(config_error("store.project_id is required for the Firestore backend"));
        }

        Ok(())
    }
}
