pub mod errors;

use std::sync::LazyLock;

use tokio::runtime::{Builder, Runtime};

/// Name of the single local database; the file stem of the default store path.
pub const DB_NAME: &str = "demotube";

/// Schema version written into the `meta` table on first open.
pub const SCHEMA_VERSION: u64 = 1;

pub const VIDEO_MEDIA_PREFIX: &str = "video/";

/// `accept` filter of the file picker; matches what ingestion keeps.
pub const VIDEO_ACCEPT: &str = "video/*";

pub const EMPTY_GALLERY_MESSAGE: &str = "No videos yet — drop some or click Upload.";

pub const NO_MATCH_MESSAGE: &str = "No videos match your search.";

pub const UNTITLED: &str = "Untitled";

pub const CONFIRM_REMOVE_MESSAGE: &str = "Delete this video from your browser storage?";

pub const CONFIRM_PLAYER_DELETE_MESSAGE: &str = "Delete this video from your browser?";

pub static CURRENT_NUM_THREADS: LazyLock<usize> = LazyLock::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
});

// Rocket-specific Tokio Runtime
// Store calls are pushed onto this runtime's blocking pool.
pub static ROCKET_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .worker_threads(*CURRENT_NUM_THREADS)
        .thread_name("rocket-io-worker")
        .enable_all()
        .build()
        .expect("Failed to build Rocket Tokio runtime")
});
