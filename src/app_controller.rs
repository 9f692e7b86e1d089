use anyhow::{Context, Result};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::app_config::{Config, StoreBackend};
use crate::catalog::PracticeTestSettings;
use crate::file_utils::FileManager;
use crate::jobs::android::{AndroidExportReport, run_android_export};
use crate::jobs::cleanup::{CleanupReport, run_cleanup};
use crate::jobs::fetch::{FetchOutcome, run_fetch};
use crate::jobs::practice_test::{PracticeTestReport, run_practice_test};
use crate::jobs::upload::{UploadOptions, UploadReport, run_upload};
use crate::jobs::verify::{VerificationReport, verify_catalog};
use crate::jobs::video_urls::{VideoUpdateReport, update_video_urls};
use crate::segmenter::{Topic, segment_file};
use crate::store::{MemoryStore, StoreHandle, open_store};

// @module: Application controller dispatching the batch jobs

/// Main application controller
///
/// Owns the configuration and one store handle that every job shares. The
/// store is opened on first use, so file-only jobs never touch it.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Document store, opened by the first job that needs it
    store: OnceCell<StoreHandle>,
}

impl Controller {
    /// Controller over an in-memory store with default configuration
    pub fn new_for_test() -> Self {
        Self::with_store(Config::default(), std::sync::Arc::new(MemoryStore::new()))
    }

    // @method: Build a controller that opens the configured store when needed
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    // @method: Build a controller over an already opened store
    pub fn with_store(config: Config, store: StoreHandle) -> Self {
        Self {
            config,
            store: OnceCell::from(store),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The document store, opened from the configuration on first call
    pub async fn store(&self) -> Result<&StoreHandle> {
        self.store
            .get_or_try_init(|| async {
                open_store(&self.config.store)
                    .await
                    .with_context(|| format!("Failed to open {} store", self.config.store.backend))
            })
            .await
    }

    /// True once a job has opened the store
    pub fn is_store_open(&self) -> bool {
        self.store.initialized()
    }

    fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.config.batch.batch_pause_ms)
    }

    fn write_delay(&self) -> Duration {
        Duration::from_millis(self.config.batch.write_delay_ms)
    }

    /// Segment a dataset; write the topics as JSON when `output` is given
    pub fn segment(&self, dataset: &Path, output: Option<&Path>) -> Result<Vec<Topic>> {
        let topics = segment_file(dataset)?;
        let words: usize = topics.iter().map(|topic| topic.vocabulary.len()).sum();
        info!("Found {} topics with {} vocabulary entries", topics.len(), words);

        for topic in &topics {
            info!("  {}: {} entries", topic.name, topic.vocabulary.len());
        }

        if let Some(path) = output {
            FileManager::write_json(path, &topics)?;
            info!("Topics saved to {}", path.display());
        }

        Ok(topics)
    }

    /// Build courses and tests from a dataset and upload them
    pub async fn upload(&self, options: &UploadOptions) -> Result<UploadReport> {
        let store = self.store().await?;
        let mut rng = StdRng::from_os_rng();
        run_upload(
            store.as_ref(),
            options,
            &self.config.course,
            self.write_delay(),
            &mut rng,
        )
        .await
    }

    /// Fetch the configured course's vocabulary
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        run_fetch(self.store().await?.as_ref(), &self.config.export).await
    }

    /// Write the mobile client assets from the lesson vocabulary file
    pub fn export_android(&self, assets_dir: Option<PathBuf>) -> Result<AndroidExportReport> {
        let export = &self.config.export;
        let assets_dir = assets_dir.unwrap_or_else(|| export.android_assets_dir.clone());
        run_android_export(
            &export.vocabulary_file,
            &assets_dir,
            &export.course_id,
            &export.course_title,
        )
    }

    /// Generate the practice test and upload it unless `local_only`
    pub async fn practice_test(&self, local_only: bool) -> Result<PracticeTestReport> {
        let export = &self.config.export;
        let settings = PracticeTestSettings {
            questions_per_part: export.questions_per_part,
            ..PracticeTestSettings::default()
        };
        let store = if local_only { None } else { Some(self.store().await?.as_ref()) };
        let mut rng = StdRng::from_os_rng();

        run_practice_test(
            store,
            &export.vocabulary_file,
            &export.practice_test_file,
            &export.course_id,
            &settings,
            &mut rng,
        )
        .await
    }

    /// Delete duplicate lessons and relocate vocabulary
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        run_cleanup(
            self.store().await?.as_ref(),
            &self.config.maintenance.duplicate_lessons,
            self.config.batch.max_batch_size,
            self.batch_pause(),
        )
        .await
    }

    /// Point every lesson and question at one video
    pub async fn update_videos(&self, target_url: Option<&str>) -> Result<VideoUpdateReport> {
        let maintenance = &self.config.maintenance;
        update_video_urls(
            self.store().await?.as_ref(),
            target_url.unwrap_or(&maintenance.video_url),
            &maintenance.question_collections,
            &maintenance.log_dir,
            self.write_delay(),
        )
        .await
    }

    /// Summarize courses and tests
    pub async fn verify(&self) -> Result<VerificationReport> {
        if self.config.store.backend == StoreBackend::Memory {
            warn!("Verifying an in-memory store; it only holds this run's writes");
        }
        verify_catalog(self.store().await?.as_ref()).await
    }
}
