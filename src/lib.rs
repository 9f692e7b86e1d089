/*!
 * # vocabkit - TOEIC vocabulary dataset tooling
 *
 * A Rust library for turning a flat vocabulary dump into course content and
 * for maintaining that content in a document store.
 *
 * ## Features
 *
 * - Segment `TOPIC N:` / `TOEIC N:` vocabulary text into topics and entries
 * - Build courses of fixed-size lessons, course tests and a practice test
 * - Store documents in SQLite, in memory, or in Cloud Firestore
 * - Batch jobs: upload, fetch, mobile asset export, cleanup, video URL
 *   rewrite and verification
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmenter`: Dataset segmentation with a pluggable line classifier
 * - `catalog`: Course, lesson, test and practice test generation
 * - `store`: Document store trait, references, batching and backends:
 *   - `store::sqlite`: Local SQLite backend
 *   - `store::memory`: In-memory backend
 *   - `store::firestore`: Firestore REST backend
 * - `jobs`: One-shot batch jobs over a store handle
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `youtube`: YouTube URL helpers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod file_utils;
pub mod jobs;
pub mod segmenter;
pub mod store;
pub mod youtube;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, SegmentError, StoreError};
pub use segmenter::{Segmenter, Topic, VocabularyEntry, segment, segment_file};
pub use store::{CollectionRef, DocRef, DocumentStore, StoreHandle, open_store};
