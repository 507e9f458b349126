//! Wire types for the EPGStation recorded-programs API.

use serde::{Deserialize, Serialize};

/// Video file kind for the raw transport stream.
pub const VIDEO_TYPE_TS: &str = "ts";

/// Video file kind for a transcoded derivative.
pub const VIDEO_TYPE_ENCODED: &str = "encoded";

/// Response body of `GET /api/recorded`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    /// Recorded programs.
    #[serde(default)]
    pub records: Vec<RecordedItem>,
    /// Total number of recorded programs on the server.
    #[serde(default)]
    pub total: i64,
}

/// A recorded program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedItem {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_encoding: bool,
    /// Protected recordings are never cleaned up.
    #[serde(default)]
    pub is_protected: bool,
    /// Start of the broadcast, epoch milliseconds.
    pub start_at: i64,
    /// End of the broadcast, epoch milliseconds.
    #[serde(default)]
    pub end_at: i64,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

impl RecordedItem {
    /// Video files holding the raw transport stream.
    pub fn ts_files(&self) -> impl Iterator<Item = &VideoFile> {
        self.video_files.iter().filter(|vf| vf.is_ts())
    }
}

/// A physical media file belonging to a recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filename: String,
    /// Kind tag, `"ts"` or `"encoded"` on current EPGStation releases.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: i64,
}

impl VideoFile {
    pub fn is_ts(&self) -> bool {
        self.kind == VIDEO_TYPE_TS
    }

    pub fn is_encoded(&self) -> bool {
        self.kind == VIDEO_TYPE_ENCODED
    }
}
