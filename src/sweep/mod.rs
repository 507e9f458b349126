//! One cleanup pass over the recording server.
//!
//! The sweep lists every recording, asks [`DeletionPolicy`] which ones are
//! stale, and removes the `ts` files of those recordings one by one. A failed
//! listing aborts the pass; a failed deletion is logged and skipped.

use chrono::{DateTime, Utc};

use crate::config::{format_duration, CleanerConfig};
use crate::epgstation::RecordingService;
use crate::error::CleanerResult;
use crate::policy::DeletionPolicy;

/// Results from a single sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of recordings returned by the server.
    pub recordings_fetched: usize,
    /// Number of recordings that satisfied the deletion policy.
    pub recordings_selected: usize,
    /// Number of TS files deleted.
    pub files_deleted: usize,
    /// Number of TS files that would have been deleted in dry-run mode.
    pub files_skipped_dry_run: usize,
    /// Number of TS files whose deletion failed.
    pub files_failed: usize,
}

impl SweepReport {
    /// Check if any deletion failed.
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Runs the retention policy against a [`RecordingService`].
pub struct Sweeper<S> {
    service: S,
    policy: DeletionPolicy,
    dry_run: bool,
}

impl<S: RecordingService> Sweeper<S> {
    pub fn new(service: S, policy: DeletionPolicy, dry_run: bool) -> Self {
        Self {
            service,
            policy,
            dry_run,
        }
    }

    /// Build a sweeper from the loaded configuration.
    pub fn from_config(service: S, config: &CleanerConfig) -> Self {
        Self::new(
            service,
            DeletionPolicy::new(config.retain_duration),
            config.dry_run,
        )
    }

    /// Run a sweep using the current time.
    pub async fn run(&self) -> CleanerResult<SweepReport> {
        self.run_at(Utc::now()).await
    }

    /// Run a sweep as of `now`.
    ///
    /// Returns an error only when the recording list cannot be fetched.
    pub async fn run_at(&self, now: DateTime<Utc>) -> CleanerResult<SweepReport> {
        let mut report = SweepReport::default();

        let records = self.service.list_recordings().await?;
        report.recordings_fetched = records.records.len();
        tracing::debug!(
            fetched = records.records.len(),
            total = records.total,
            "Fetched recorded programs"
        );

        let selected = self.policy.select_for_deletion(&records.records, now);
        report.recordings_selected = selected.len();
        tracing::debug!(
            selected = selected.len(),
            retain = %format_duration(self.policy.retain_duration()),
            "Evaluated deletion policy"
        );

        for record in selected {
            for video_file in record.ts_files() {
                if self.dry_run {
                    tracing::info!(
                        record_id = record.id,
                        video_file_id = video_file.id,
                        filename = %video_file.filename,
                        size = video_file.size,
                        "(Dry Run) Delete videoFile"
                    );
                    report.files_skipped_dry_run += 1;
                    continue;
                }

                tracing::info!(
                    record_id = record.id,
                    video_file_id = video_file.id,
                    filename = %video_file.filename,
                    size = video_file.size,
                    "Delete videoFile"
                );

                match self.service.delete_video_file(video_file.id).await {
                    Ok(()) => {
                        tracing::debug!(video_file_id = video_file.id, "Deleted videoFile");
                        report.files_deleted += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            video_file_id = video_file.id,
                            error_kind = e.kind(),
                            error = %e,
                            "Failed to delete videoFile"
                        );
                        report.files_failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}
