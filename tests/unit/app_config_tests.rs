/*!
 * Tests for app configuration
 */

use anyhow::Result;
use std::str::FromStr;
use vocabkit::app_config::{Config, LogLevel, StoreBackend};
use vocabkit::errors::AppError;
use crate::common;

/// Test that the default configuration is valid
#[test]
fn test_default_shouldBeValid() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.export.course_id, "toeic38");
    assert_eq!(config.maintenance.duplicate_lessons.len(), 3);
    assert_eq!(config.batch.max_batch_size, 500);
}

/// Test that a config file with only some sections is filled with defaults
#[test]
fn test_fromFile_withPartialConfig_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "course": {"lesson_size": 8},
            "maintenance": {"video_url": "https://youtu.be/abc123"},
            "log_level": "warn"
        }"#,
    )?;

    let config: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(config.course.lesson_size, 8);
    assert_eq!(config.course.lesson_minutes, 15);
    assert_eq!(config.maintenance.video_url, "https://youtu.be/abc123");
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());

    Ok(())
}

/// Test that a zero lesson size is rejected
#[test]
fn test_validate_withZeroLessonSize_shouldFail() {
    let mut config = Config::default();
    config.course.lesson_size = 0;

    let err = config.validate().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Config(message)) if message.contains("lesson_size")
    ));
}

/// Test that batches above the store limit are rejected
#[test]
fn test_validate_withOversizedBatch_shouldFail() {
    let mut config = Config::default();
    config.batch.max_batch_size = 501;

    assert!(config.validate().is_err());
}

/// Test that a non-YouTube video URL is rejected
#[test]
fn test_validate_withNonYoutubeVideo_shouldFail() {
    let mut config = Config::default();
    config.maintenance.video_url = "https://example.com/video.mp4".to_string();

    assert!(config.validate().is_err());
}

/// Test that Firestore needs a project id
#[test]
fn test_validate_withFirestoreWithoutProject_shouldFail() {
    let mut config = Config::default();
    config.store.backend = StoreBackend::Firestore;
    assert!(config.validate().is_err());

    config.store.project_id = "vocab-app".to_string();
    assert!(config.validate().is_ok());
}

/// Test backend name parsing and display
#[test]
fn test_storeBackend_fromStr_shouldBeCaseInsensitive() -> Result<()> {
    assert_eq!(StoreBackend::from_str("SQLite")?, StoreBackend::Sqlite);
    assert_eq!(StoreBackend::from_str("firestore")?, StoreBackend::Firestore);
    assert!(StoreBackend::from_str("mongo").is_err());
    assert_eq!(StoreBackend::Memory.to_string(), "memory");

    Ok(())
}

/// Test that the serialized default config reads back the same
#[test]
fn test_serialize_defaultConfig_shouldReadBack() -> Result<()> {
    let json = serde_json::to_string_pretty(&Config::default())?;
    let restored: Config = serde_json::from_str(&json)?;

    assert_eq!(restored.export.vocabulary_file, Config::default().export.vocabulary_file);
    assert_eq!(restored.store.database, "(default)");

    Ok(())
}

/// Test log level mapping
#[test]
fn test_logLevel_toLevelFilter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
