//! EPGStation API access.
//!
//! The cleaner only needs two endpoints: listing recorded programs and
//! deleting a single video file. Both are exposed through the
//! [`RecordingService`] trait so the sweep can run against a fake in tests.

mod client;
pub mod model;

pub use client::EpgStationClient;
pub use model::{RecordedItem, Records, VideoFile, VIDEO_TYPE_ENCODED, VIDEO_TYPE_TS};

use async_trait::async_trait;

use crate::error::CleanerResult;

/// Operations the sweep needs from the recording server.
#[async_trait]
pub trait RecordingService: Send + Sync {
    /// Fetch every recorded program.
    async fn list_recordings(&self) -> CleanerResult<Records>;

    /// Delete one video file by id.
    async fn delete_video_file(&self, video_file_id: i64) -> CleanerResult<()>;
}
