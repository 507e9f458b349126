//! Retention policy for raw recordings.
//!
//! A recording's TS files may be removed once all of the following hold:
//!
//! - the recording is not protected
//! - it has at least one `ts` file (something to delete)
//! - it has at least one `encoded` file (the program survives the deletion)
//! - it started longer ago than the retention threshold
//!
//! Evaluation is pure: the current time is passed in, nothing is mutated.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::format_duration;
use crate::epgstation::RecordedItem;

/// Deletion policy driven by a single retention threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionPolicy {
    retain_duration: Duration,
}

/// Outcome of checking one recording against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEvaluation {
    pub is_protected: bool,
    pub has_ts: bool,
    pub has_encoded: bool,
    /// Milliseconds between the recording start and `now`; negative for
    /// recordings that start in the future.
    pub elapsed_ms: i64,
    pub eligible: bool,
}

impl DeletionPolicy {
    pub fn new(retain_duration: Duration) -> Self {
        Self { retain_duration }
    }

    pub fn retain_duration(&self) -> Duration {
        self.retain_duration
    }

    /// Check a single recording.
    pub fn evaluate(&self, record: &RecordedItem, now: DateTime<Utc>) -> RecordEvaluation {
        let mut has_ts = false;
        let mut has_encoded = false;
        for vf in &record.video_files {
            if vf.is_ts() {
                has_ts = true;
            } else if vf.is_encoded() {
                has_encoded = true;
            }
        }

        let elapsed_ms = now.timestamp_millis().saturating_sub(record.start_at);
        let old_enough = i128::from(elapsed_ms) > self.retain_duration.as_millis() as i128;

        RecordEvaluation {
            is_protected: record.is_protected,
            has_ts,
            has_encoded,
            elapsed_ms,
            eligible: !record.is_protected && has_ts && has_encoded && old_enough,
        }
    }

    /// Recordings whose TS files should be deleted, in input order.
    pub fn select_for_deletion<'a>(
        &self,
        records: &'a [RecordedItem],
        now: DateTime<Utc>,
    ) -> Vec<&'a RecordedItem> {
        records
            .iter()
            .filter(|record| {
                let evaluation = self.evaluate(record, now);
                tracing::debug!(
                    id = record.id,
                    name = %record.name,
                    protected = evaluation.is_protected,
                    has_ts = evaluation.has_ts,
                    has_encoded = evaluation.has_encoded,
                    elapsed = %format_elapsed(evaluation.elapsed_ms),
                    eligible = evaluation.eligible,
                    "Check if record satisfies deletion policy"
                );
                evaluation.eligible
            })
            .collect()
    }
}

fn format_elapsed(elapsed_ms: i64) -> String {
    if elapsed_ms < 0 {
        format!("-{}", format_duration(Duration::from_millis(elapsed_ms.unsigned_abs())))
    } else {
        format_duration(Duration::from_millis(elapsed_ms as u64))
    }
}
