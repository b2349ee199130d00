use bitcode::{Decode, Encode};
use redb::{MultimapTableDefinition, TableDefinition};
use serde::{Deserialize, Serialize};

// 記錄主表: id -> bitcode(VideoMetaSchema)
pub const VIDEO_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("videos");

// 影片內容: (id, chunk index) -> raw bytes, split every BLOB_CHUNK_SIZE bytes
pub const VIDEO_BLOB_TABLE: TableDefinition<(u64, u32), &[u8]> =
    TableDefinition::new("video_chunks");

pub const BLOB_CHUNK_SIZE: usize = 1 << 20;

// 次要索引 (non-unique)
pub const IDX_TITLE_TABLE: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("idx_title");
pub const IDX_FILENAME_TABLE: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("idx_filename");

/// Metadata row stored under each id. The blob lives in `VIDEO_BLOB_TABLE`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct VideoMetaSchema {
    pub filename: String,
    pub title: String,
    pub media_type: String,
    pub size: u64,
    pub created: i64,
}

impl VideoMetaSchema {
    pub fn into_summary(self, id: u64) -> VideoSummary {
        VideoSummary {
            id,
            filename: self.filename,
            title: self.title,
            media_type: self.media_type,
            size: self.size,
            created: self.created,
        }
    }
}

/// A stored video with its full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: u64,
    pub blob: Vec<u8>,
    pub filename: String,
    pub title: String,
    pub media_type: String,
    pub created: i64,
}

/// A stored video without its content; what listings and the JSON API carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: u64,
    pub filename: String,
    pub title: String,
    pub media_type: String,
    pub size: u64,
    pub created: i64,
}

impl VideoSummary {
    /// Title as displayed; an empty stored title shows as "Untitled".
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            crate::common::UNTITLED
        } else {
            &self.title
        }
    }
}
