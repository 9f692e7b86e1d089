/*!
 * Throttled batch writing.
 *
 * Bulk jobs queue writes here; every full batch is committed and followed
 * by a short pause so the remote store's rate limits are not hit.
 */

use log::{debug, info};
use std::time::Duration;

use super::{DocRef, DocumentStore, Fields, WriteBatch, MAX_BATCH_WRITES};
use crate::errors::StoreError;

/// Totals reported when a batch writer finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Writes committed
    pub writes: usize,
    /// Batches committed
    pub batches: usize,
}

/// Accumulates writes and commits them in fixed-size groups
pub struct BatchWriter<'a> {
    store: &'a dyn DocumentStore,
    batch: WriteBatch,
    batch_size: usize,
    pause: Duration,
    summary: BatchSummary,
}

impl<'a> BatchWriter<'a> {
    /// Create a writer; `batch_size` is clamped to `1..=MAX_BATCH_WRITES`
    pub fn new(store: &'a dyn DocumentStore, batch_size: usize, pause: Duration) -> Self {
        Self {
            store,
            batch: WriteBatch::new(),
            batch_size: batch_size.clamp(1, MAX_BATCH_WRITES),
            pause,
            summary: BatchSummary::default(),
        }
    }

    /// Queue a full-document write
    pub async fn set(&mut self, doc: DocRef, fields: Fields) -> Result<(), StoreError> {
        self.batch.set(doc, fields)?;
        self.after_push().await
    }

    /// Queue a delete
    pub async fn delete(&mut self, doc: DocRef) -> Result<(), StoreError> {
        self.batch.delete(doc)?;
        self.after_push().await
    }

    /// Writes queued so far, committed or not
    pub fn queued(&self) -> usize {
        self.summary.writes + self.batch.len()
    }

    async fn after_push(&mut self) -> Result<(), StoreError> {
        if self.batch.len() >= self.batch_size {
            self.flush().await?;
            info!(
                "Committed batch of {} writes (total: {})",
                self.batch_size, self.summary.writes
            );
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.batch);
        let count = batch.len();
        self.store.commit(batch).await?;

        self.summary.writes += count;
        self.summary.batches += 1;
        debug!("Batch {} committed with {} writes", self.summary.batches, count);
        Ok(())
    }

    /// Commit whatever is left and report totals
    pub async fn finish(mut self) -> Result<BatchSummary, StoreError> {
        self.flush().await?;
        Ok(self.summary)
    }
}
