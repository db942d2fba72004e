//! Batch orchestration.
//!
//! Drives one batch of source images through the pipeline and accumulates
//! the results in a fresh [`ArchiveBuilder`].
//!
//! ## Per-file flow
//!
//! ```text
//! 001_front.png ─┬─ group_key ──────────────────────── "001"
//!                └─ create_variants ─┬─ thumbnail 480x320 ─┐
//!                      (rayon::join) └─ medium    640x480 ─┴─ 001/001_thumbnail.jpg
//!                                                             001/001.jpg
//! ```
//!
//! Files run one after another in input order; only the two variants of a
//! file run concurrently. A file that fails to render is logged, reported as
//! a [`ProcessEvent::FileFailed`] event, and contributes nothing to the
//! archive. It never aborts the batch.
//!
//! ## Status
//!
//! [`BatchStatus`] lives behind an `Arc<Mutex<_>>` so another thread (a UI,
//! a progress printer) can poll it while a batch runs. Only the orchestrator
//! writes it:
//!
//! | Field | Before | During | After |
//! |---|---|---|---|
//! | `processing` | false | true | false |
//! | `done` | unchanged | false | true |
//! | `progress` | 0 | round(successes / total * 100) | 0 |

use crate::archive::ArchiveBuilder;
use crate::config::Config;
use crate::imaging::{
    Dimensions, ImageRasterizer, VariantError, VariantKind, VariantPlan, create_variants,
    get_dimensions,
};
use crate::naming::{GroupKey, find_collisions, group_key};
use crate::types::SourceImage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("A batch is already being processed")]
    Busy,
    #[error("Batch of {count} files exceeds the limit of {limit}")]
    TooManyFiles { count: usize, limit: usize },
}

/// Observable state of the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatus {
    /// A batch is in flight; new batches are refused.
    pub processing: bool,
    /// Percentage of successfully processed files, 0-100.
    pub progress: u8,
    /// The most recent batch ran to completion.
    pub done: bool,
    pub total_files: usize,
    pub succeeded: usize,
}

/// Progress events emitted while a batch runs, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    BatchStarted {
        total_files: usize,
    },
    FileProcessed {
        /// 1-based position in the batch.
        index: usize,
        filename: String,
        key: GroupKey,
        progress: u8,
    },
    FileFailed {
        index: usize,
        filename: String,
        kind: VariantKind,
        error: String,
    },
    /// `filename` overwrote an entry written earlier in the batch.
    KeyCollision {
        filename: String,
        path: String,
    },
    BatchFinished {
        succeeded: usize,
        failed: usize,
    },
}

/// Size limits applied to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLimits {
    /// Batches above this size are processed with a warning.
    pub advisory_limit: usize,
    /// Batches above this size are refused.
    pub max_files: Option<usize>,
    /// Passed to the archive; enforced at serialization.
    pub archive_max_bytes: Option<u64>,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            advisory_limit: 2000,
            max_files: None,
            archive_max_bytes: None,
        }
    }
}

impl BatchLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            advisory_limit: config.batch.advisory_limit,
            max_files: config.batch.max_files,
            archive_max_bytes: config.archive.max_bytes,
        }
    }
}

/// A source image that produced no archive entries.
#[derive(Debug)]
pub struct FailedFile {
    pub filename: String,
    pub error: VariantError,
}

/// Result of a completed batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedFile>,
    /// Every variant written by the batch, ready to serialize.
    pub archive: ArchiveBuilder,
}

/// Processes batches of source images into archives.
pub struct BatchOrchestrator<R: ImageRasterizer> {
    rasterizer: R,
    plan: VariantPlan,
    limits: BatchLimits,
    status: Arc<Mutex<BatchStatus>>,
    events: Option<Sender<ProcessEvent>>,
}

impl<R: ImageRasterizer> BatchOrchestrator<R> {
    pub fn new(rasterizer: R, plan: VariantPlan, limits: BatchLimits) -> Self {
        Self {
            rasterizer,
            plan,
            limits,
            status: Arc::new(Mutex::new(BatchStatus::default())),
            events: None,
        }
    }

    /// Send progress events to `tx` for every subsequent batch.
    pub fn with_events(mut self, tx: Sender<ProcessEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Shared handle for polling status from another thread.
    pub fn status_handle(&self) -> Arc<Mutex<BatchStatus>> {
        Arc::clone(&self.status)
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> BatchStatus {
        self.lock_status().clone()
    }

    /// Process `sources` in order into a fresh archive.
    ///
    /// Returns `Ok(None)` for an empty batch without touching the status.
    /// Per-file failures are folded into the outcome; only refusing to start
    /// the batch is an error.
    pub fn process_batch(
        &self,
        sources: Vec<SourceImage>,
    ) -> Result<Option<BatchOutcome>, BatchError> {
        if sources.is_empty() {
            log::debug!("Empty batch, nothing to do");
            return Ok(None);
        }
        let total = sources.len();
        self.begin(total)?;

        log::info!("Processing batch of {total} files");
        self.emit(ProcessEvent::BatchStarted { total_files: total });

        let mut archive = ArchiveBuilder::with_limit(self.limits.archive_max_bytes);
        let mut succeeded = 0;
        let mut failed = Vec::new();

        for (i, source) in sources.into_iter().enumerate() {
            let index = i + 1;
            let key = group_key(&source.filename);

            match create_variants(&self.rasterizer, &source.bytes, &self.plan) {
                Ok(pair) => {
                    let group = archive.ensure_group(&key);
                    for variant in [pair.medium, pair.thumbnail] {
                        let name = variant.kind.file_name(&key);
                        if archive.add_file(&group, &name, variant.bytes).is_some() {
                            let path = format!("{}/{name}", group.name());
                            log::warn!("{} overwrote existing entry {path}", source.filename);
                            self.emit(ProcessEvent::KeyCollision {
                                filename: source.filename.clone(),
                                path,
                            });
                        }
                    }

                    succeeded += 1;
                    let progress = compute_progress(succeeded, total);
                    {
                        let mut status = self.lock_status();
                        status.succeeded = succeeded;
                        status.progress = progress;
                    }
                    self.emit(ProcessEvent::FileProcessed {
                        index,
                        filename: source.filename,
                        key,
                        progress,
                    });
                }
                Err(error) => {
                    log::error!("Failed to process {}: {error}", source.filename);
                    self.emit(ProcessEvent::FileFailed {
                        index,
                        filename: source.filename.clone(),
                        kind: error.kind,
                        error: error.source.to_string(),
                    });
                    failed.push(FailedFile {
                        filename: source.filename,
                        error,
                    });
                }
            }
        }

        {
            let mut status = self.lock_status();
            status.done = true;
            status.processing = false;
            status.progress = 0;
        }
        log::info!(
            "Batch finished: {succeeded} of {total} succeeded, {} entries in {} folders",
            archive.entry_count(),
            archive.group_count()
        );
        self.emit(ProcessEvent::BatchFinished {
            succeeded,
            failed: failed.len(),
        });

        Ok(Some(BatchOutcome {
            total_files: total,
            succeeded,
            failed,
            archive,
        }))
    }

    /// Check limits and flip the status to processing, atomically.
    fn begin(&self, total: usize) -> Result<(), BatchError> {
        let mut status = self.lock_status();
        if status.processing {
            return Err(BatchError::Busy);
        }
        if let Some(limit) = self.limits.max_files.filter(|&limit| total > limit) {
            return Err(BatchError::TooManyFiles {
                count: total,
                limit,
            });
        }
        if total > self.limits.advisory_limit {
            log::warn!(
                "Batch of {total} files is above the advisory limit of {}; all variants are held in memory",
                self.limits.advisory_limit
            );
        }
        *status = BatchStatus {
            processing: true,
            progress: 0,
            done: false,
            total_files: total,
            succeeded: 0,
        };
        Ok(())
    }

    fn lock_status(&self) -> MutexGuard<'_, BatchStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}

// =============================================================================
// Dry run
// =============================================================================

/// What a batch would do, without rendering anything.
#[derive(Debug)]
pub struct CheckReport {
    pub files: Vec<CheckedFile>,
    /// Keys shared by more than one filename; later files would overwrite earlier ones.
    pub collisions: BTreeMap<GroupKey, Vec<String>>,
}

#[derive(Debug)]
pub struct CheckedFile {
    pub filename: String,
    pub key: GroupKey,
    /// Natural size, or why the file could not be decoded.
    pub dimensions: Result<Dimensions, String>,
}

impl CheckReport {
    pub fn undecodable(&self) -> usize {
        self.files.iter().filter(|f| f.dimensions.is_err()).count()
    }
}

/// Derive keys, decode headers, and find collisions for `sources`.
pub fn check_batch(rasterizer: &impl ImageRasterizer, sources: &[SourceImage]) -> CheckReport {
    let files = sources
        .iter()
        .map(|source| CheckedFile {
            filename: source.filename.clone(),
            key: group_key(&source.filename),
            dimensions: get_dimensions(rasterizer, &source.bytes)
                .map(|(width, height)| Dimensions { width, height })
                .map_err(|e| e.to_string()),
        })
        .collect();
    let collisions = find_collisions(sources.iter().map(|s| s.filename.as_str()));
    CheckReport { files, collisions }
}

/// Percentage of `succeeded` out of `total`, rounded to the nearest integer.
pub fn compute_progress(succeeded: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (succeeded as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
