use anyhow::{Context, Result, bail};
use log::{debug, info};
use redb::{Database, ReadOnlyTable, ReadableMultimapTable, ReadableTable};
use std::path::Path;
use std::time::Instant;

use crate::bootstrap::setup::initialize_folder;
use crate::common::SCHEMA_VERSION;
use crate::common::errors::{StoreError, StoreResult};
use crate::database::schema::meta::{META_TABLE, NEXT_ID_KEY, SCHEMA_VERSION_KEY};
use crate::database::schema::video::{
    BLOB_CHUNK_SIZE, IDX_FILENAME_TABLE, IDX_TITLE_TABLE, VIDEO_BLOB_TABLE, VIDEO_TABLE,
    VideoMetaSchema, VideoRecord, VideoSummary,
};

/// Synchronous core of the local store. Every public method runs in its own
/// redb transaction.
pub struct VideoStore {
    in_disk: Database,
}

impl std::fmt::Debug for VideoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoStore").finish_non_exhaustive()
    }
}

impl VideoStore {
    /// Open (or create) the database file and bring it to the current schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        initialize_folder(path).map_err(|error| StoreError::unavailable(format!("{error:#}")))?;

        let in_disk = Database::create(path)
            .with_context(|| format!("Failed to open database {}", path.display()))
            .map_err(|error| StoreError::unavailable(format!("{error:#}")))?;

        let store = Self { in_disk };
        store.initialize()?;
        info!("Opened video store at {}", path.display());
        Ok(store)
    }

    /// Same schema on a volatile backend.
    pub fn open_in_memory() -> StoreResult<Self> {
        let in_disk = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(StoreError::unavailable)?;
        let store = Self { in_disk };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.create_tables()
            .map_err(|error| StoreError::unavailable(format!("{error:#}")))
    }

    fn create_tables(&self) -> Result<()> {
        let txn = self.in_disk.begin_write()?;
        {
            let mut meta = txn.open_table(META_TABLE)?;
            let stored = meta.get(SCHEMA_VERSION_KEY)?.map(|guard| guard.value());
            match stored {
                None => {
                    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
                    meta.insert(NEXT_ID_KEY, 1u64)?;
                    info!("Created video collection at schema version {}", SCHEMA_VERSION);
                }
                Some(version) if version > SCHEMA_VERSION => {
                    bail!(
                        "Database schema version {} is newer than supported version {}",
                        version,
                        SCHEMA_VERSION
                    );
                }
                Some(_) => {}
            }

            let _ = txn.open_table(VIDEO_TABLE)?;
            let _ = txn.open_table(VIDEO_BLOB_TABLE)?;
            let _ = txn.open_multimap_table(IDX_TITLE_TABLE)?;
            let _ = txn.open_multimap_table(IDX_FILENAME_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn schema_version(&self) -> StoreResult<u64> {
        let read = || -> Result<u64> {
            let txn = self.in_disk.begin_read()?;
            let meta = txn.open_table(META_TABLE)?;
            let version = meta
                .get(SCHEMA_VERSION_KEY)?
                .map(|guard| guard.value())
                .context("Schema version is missing")?;
            Ok(version)
        };
        read().map_err(|error| StoreError::read(format!("{error:#}")))
    }

    /// Insert a new record; returns the id assigned to it.
    pub fn add(
        &self,
        blob: &[u8],
        filename: &str,
        title: &str,
        media_type: &str,
    ) -> StoreResult<u64> {
        let start_time = Instant::now();
        let id = self
            .insert(blob, filename, title, media_type)
            .map_err(|error| StoreError::write(format!("{error:#}")))?;
        info!(
            duration = &*format!("{:?}", start_time.elapsed());
            "Stored video {} '{}' ({} bytes)", id, filename, blob.len()
        );
        Ok(id)
    }

    fn insert(&self, blob: &[u8], filename: &str, title: &str, media_type: &str) -> Result<u64> {
        let txn = self.in_disk.begin_write()?;
        let id = {
            let mut meta = txn.open_table(META_TABLE)?;
            let id = meta.get(NEXT_ID_KEY)?.map(|guard| guard.value()).unwrap_or(1u64);
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let schema = VideoMetaSchema {
                filename: filename.to_string(),
                title: title.to_string(),
                media_type: media_type.to_string(),
                size: blob.len() as u64,
                created: chrono::Utc::now().timestamp_millis(),
            };
            let encoded = bitcode::encode(&schema);

            let mut videos = txn.open_table(VIDEO_TABLE)?;
            videos.insert(id, encoded.as_slice())?;

            let mut blobs = txn.open_table(VIDEO_BLOB_TABLE)?;
            for (index, chunk) in blob.chunks(BLOB_CHUNK_SIZE).enumerate() {
                blobs.insert((id, index as u32), chunk)?;
            }

            let mut idx_title = txn.open_multimap_table(IDX_TITLE_TABLE)?;
            idx_title.insert(title, id)?;

            let mut idx_filename = txn.open_multimap_table(IDX_FILENAME_TABLE)?;
            idx_filename.insert(filename, id)?;

            id
        };
        txn.commit()?;
        Ok(id)
    }

    /// Every record with its content. No ordering promise.
    pub fn list_all(&self) -> StoreResult<Vec<VideoRecord>> {
        let start_time = Instant::now();
        let records = self
            .read_all_records()
            .map_err(|error| StoreError::read(format!("{error:#}")))?;
        info!(
            duration = &*format!("{:?}", start_time.elapsed());
            "Read {} videos with content", records.len()
        );
        Ok(records)
    }

    fn read_all_records(&self) -> Result<Vec<VideoRecord>> {
        let txn = self.in_disk.begin_read()?;
        let videos = txn.open_table(VIDEO_TABLE)?;
        let blobs = txn.open_table(VIDEO_BLOB_TABLE)?;

        let mut records = Vec::new();
        for entry in videos.iter()? {
            let (id, value) = entry?;
            let id = id.value();
            let schema: VideoMetaSchema = bitcode::decode(value.value())
                .with_context(|| format!("Corrupt metadata for video {}", id))?;
            let blob = collect_blob(&blobs, id)?;
            records.push(VideoRecord {
                id,
                blob,
                filename: schema.filename,
                title: schema.title,
                media_type: schema.media_type,
                created: schema.created,
            });
        }
        Ok(records)
    }

    /// Every record without content. No ordering promise.
    pub fn list_summaries(&self) -> StoreResult<Vec<VideoSummary>> {
        let start_time = Instant::now();
        let read = || -> Result<Vec<VideoSummary>> {
            let txn = self.in_disk.begin_read()?;
            let videos = txn.open_table(VIDEO_TABLE)?;
            let mut summaries = Vec::new();
            for entry in videos.iter()? {
                let (id, value) = entry?;
                let schema: VideoMetaSchema = bitcode::decode(value.value())
                    .with_context(|| format!("Corrupt metadata for video {}", id.value()))?;
                summaries.push(schema.into_summary(id.value()));
            }
            Ok(summaries)
        };
        let summaries = read().map_err(|error| StoreError::read(format!("{error:#}")))?;
        debug!(
            duration = &*format!("{:?}", start_time.elapsed());
            "Read {} video summaries", summaries.len()
        );
        Ok(summaries)
    }

    /// `Ok(None)` when no record has this id.
    pub fn get_by_id(&self, id: u64) -> StoreResult<Option<VideoRecord>> {
        let read = || -> Result<Option<VideoRecord>> {
            let txn = self.in_disk.begin_read()?;
            let videos = txn.open_table(VIDEO_TABLE)?;
            let Some(value) = videos.get(id)? else {
                return Ok(None);
            };
            let schema: VideoMetaSchema = bitcode::decode(value.value())
                .with_context(|| format!("Corrupt metadata for video {}", id))?;
            let blobs = txn.open_table(VIDEO_BLOB_TABLE)?;
            let blob = collect_blob(&blobs, id)?;
            Ok(Some(VideoRecord {
                id,
                blob,
                filename: schema.filename,
                title: schema.title,
                media_type: schema.media_type,
                created: schema.created,
            }))
        };
        read().map_err(|error| StoreError::read(format!("{error:#}")))
    }

    pub fn get_summary(&self, id: u64) -> StoreResult<Option<VideoSummary>> {
        let read = || -> Result<Option<VideoSummary>> {
            let txn = self.in_disk.begin_read()?;
            let videos = txn.open_table(VIDEO_TABLE)?;
            let Some(value) = videos.get(id)? else {
                return Ok(None);
            };
            let schema: VideoMetaSchema = bitcode::decode(value.value())
                .with_context(|| format!("Corrupt metadata for video {}", id))?;
            Ok(Some(schema.into_summary(id)))
        };
        read().map_err(|error| StoreError::read(format!("{error:#}")))
    }

    /// Bytes `offset..offset + len` of a record's content, clamped to its
    /// size. Only the chunks covering the range are read.
    pub fn read_range(&self, id: u64, offset: u64, len: u64) -> StoreResult<Option<Vec<u8>>> {
        let read = || -> Result<Option<Vec<u8>>> {
            let txn = self.in_disk.begin_read()?;
            let videos = txn.open_table(VIDEO_TABLE)?;
            let Some(value) = videos.get(id)? else {
                return Ok(None);
            };
            let schema: VideoMetaSchema = bitcode::decode(value.value())
                .with_context(|| format!("Corrupt metadata for video {}", id))?;

            let end = offset.saturating_add(len).min(schema.size);
            if offset >= end {
                return Ok(Some(Vec::new()));
            }
            let chunk_size = BLOB_CHUNK_SIZE as u64;
            let first = (offset / chunk_size) as u32;
            let last = ((end - 1) / chunk_size) as u32;

            let blobs = txn.open_table(VIDEO_BLOB_TABLE)?;
            let mut bytes = Vec::with_capacity((end - offset) as usize);
            for entry in blobs.range((id, first)..=(id, last))? {
                let (key, chunk) = entry?;
                let chunk_start = key.value().1 as u64 * chunk_size;
                let data = chunk.value();
                let from = offset.saturating_sub(chunk_start) as usize;
                let to = ((end - chunk_start) as usize).min(data.len());
                if from < to {
                    bytes.extend_from_slice(&data[from..to]);
                }
            }
            Ok(Some(bytes))
        };
        read().map_err(|error| StoreError::read(format!("{error:#}")))
    }

    /// Remove a record, its content and its index entries. Removing an
    /// unknown id succeeds and changes nothing.
    pub fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        let start_time = Instant::now();
        let existed = self
            .remove(id)
            .map_err(|error| StoreError::write(format!("{error:#}")))?;
        if existed {
            info!(duration = &*format!("{:?}", start_time.elapsed()); "Deleted video {}", id);
        } else {
            debug!("Delete of unknown video {} ignored", id);
        }
        Ok(())
    }

    fn remove(&self, id: u64) -> Result<bool> {
        let txn = self.in_disk.begin_write()?;
        let existed = {
            let mut videos = txn.open_table(VIDEO_TABLE)?;
            let removed = videos.remove(id)?.map(|guard| guard.value().to_vec());
            match removed {
                None => false,
                Some(bytes) => {
                    let schema: VideoMetaSchema = bitcode::decode(&bytes)
                        .with_context(|| format!("Corrupt metadata for video {}", id))?;

                    let mut blobs = txn.open_table(VIDEO_BLOB_TABLE)?;
                    let chunks: Vec<(u64, u32)> = blobs
                        .range((id, 0u32)..=(id, u32::MAX))?
                        .map(|entry| entry.map(|(key, _)| key.value()))
                        .collect::<Result<_, _>>()?;
                    for key in chunks {
                        blobs.remove(key)?;
                    }

                    let mut idx_title = txn.open_multimap_table(IDX_TITLE_TABLE)?;
                    idx_title.remove(schema.title.as_str(), id)?;

                    let mut idx_filename = txn.open_multimap_table(IDX_FILENAME_TABLE)?;
                    idx_filename.remove(schema.filename.as_str(), id)?;
                    true
                }
            }
        };
        txn.commit()?;
        Ok(existed)
    }

    /// Ids of records whose title equals `title` exactly.
    pub fn find_by_title(&self, title: &str) -> StoreResult<Vec<u64>> {
        self.lookup(IndexKind::Title, title)
    }

    /// Ids of records whose filename equals `filename` exactly.
    pub fn find_by_filename(&self, filename: &str) -> StoreResult<Vec<u64>> {
        self.lookup(IndexKind::Filename, filename)
    }

    fn lookup(&self, kind: IndexKind, key: &str) -> StoreResult<Vec<u64>> {
        let read = || -> Result<Vec<u64>> {
            let txn = self.in_disk.begin_read()?;
            let table = match kind {
                IndexKind::Title => txn.open_multimap_table(IDX_TITLE_TABLE)?,
                IndexKind::Filename => txn.open_multimap_table(IDX_FILENAME_TABLE)?,
            };
            let mut ids = Vec::new();
            for value in table.get(key)? {
                ids.push(value?.value());
            }
            Ok(ids)
        };
        read().map_err(|error| StoreError::read(format!("{error:#}")))
    }
}

/// Concatenate a record's chunks in order.
fn collect_blob(blobs: &ReadOnlyTable<(u64, u32), &'static [u8]>, id: u64) -> Result<Vec<u8>> {
    let mut blob = Vec::new();
    for entry in blobs.range((id, 0u32)..=(id, u32::MAX))? {
        let (_, chunk) = entry?;
        blob.extend_from_slice(chunk.value());
    }
    Ok(blob)
}

#[derive(Debug, Clone, Copy)]
enum IndexKind {
    Title,
    Filename,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VideoStore {
        VideoStore::open_in_memory().unwrap()
    }

    #[test]
    fn add_then_get_returns_identical_record() {
        let store = store();
        let blob = vec![0u8, 1, 2, 3, 255, 254];
        let id = store.add(&blob, "a.mp4", "Cat Jumping", "video/mp4").unwrap();

        let record = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.filename, "a.mp4");
        assert_eq!(record.title, "Cat Jumping");
        assert_eq!(record.media_type, "video/mp4");
        assert_eq!(record.blob, blob);
        assert!(record.created > 0);
    }

    #[test]
    fn ids_are_unique_and_never_reused() {
        let store = store();
        let first = store.add(b"1", "a.mp4", "a", "video/mp4").unwrap();
        let second = store.add(b"2", "b.mp4", "b", "video/mp4").unwrap();
        assert_ne!(first, second);

        store.delete_by_id(second).unwrap();
        let third = store.add(b"3", "c.mp4", "c", "video/mp4").unwrap();
        assert!(third > second);
    }

    #[test]
    fn unknown_id_is_not_found_rather_than_error() {
        let store = store();
        assert!(store.get_by_id(42).unwrap().is_none());
        assert!(store.get_summary(42).unwrap().is_none());
    }

    #[test]
    fn delete_removes_record_from_every_read_path() {
        let store = store();
        let keep = store.add(b"keep", "a.mp4", "Keep", "video/mp4").unwrap();
        let gone = store.add(b"gone", "b.mov", "Gone", "video/quicktime").unwrap();

        store.delete_by_id(gone).unwrap();

        assert!(store.get_by_id(gone).unwrap().is_none());
        let ids: Vec<u64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep]);
        assert!(store.find_by_title("Gone").unwrap().is_empty());
        assert!(store.find_by_filename("b.mov").unwrap().is_empty());
    }

    #[test]
    fn deleting_unknown_id_changes_nothing() {
        let store = store();
        store.add(b"x", "a.mp4", "A", "video/mp4").unwrap();
        let before = store.list_all().unwrap();

        store.delete_by_id(9_999).unwrap();

        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn secondary_lookups_are_non_unique() {
        let store = store();
        let a = store.add(b"1", "same.mp4", "Holiday", "video/mp4").unwrap();
        let b = store.add(b"2", "same.mp4", "Holiday", "video/mp4").unwrap();
        store.add(b"3", "other.mp4", "Other", "video/mp4").unwrap();

        let mut by_title = store.find_by_title("Holiday").unwrap();
        by_title.sort();
        assert_eq!(by_title, vec![a, b]);

        let mut by_filename = store.find_by_filename("same.mp4").unwrap();
        by_filename.sort();
        assert_eq!(by_filename, vec![a, b]);
        assert!(store.find_by_title("holiday").unwrap().is_empty());
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn large_content_round_trips_across_chunks() {
        let store = store();
        let blob = patterned(BLOB_CHUNK_SIZE * 2 + 123);
        let id = store.add(&blob, "big.mp4", "Big", "video/mp4").unwrap();

        assert_eq!(store.get_by_id(id).unwrap().unwrap().blob, blob);
        assert_eq!(store.list_all().unwrap()[0].blob, blob);
    }

    #[test]
    fn read_range_spans_chunk_boundaries_and_clamps() {
        let store = store();
        let blob = patterned(BLOB_CHUNK_SIZE * 2 + 123);
        let id = store.add(&blob, "big.mp4", "Big", "video/mp4").unwrap();

        let start = BLOB_CHUNK_SIZE as u64 - 10;
        let bytes = store.read_range(id, start, 20).unwrap().unwrap();
        assert_eq!(bytes, &blob[start as usize..start as usize + 20]);

        let tail = store.read_range(id, blob.len() as u64 - 5, 100).unwrap().unwrap();
        assert_eq!(tail, &blob[blob.len() - 5..]);

        assert!(store.read_range(id, blob.len() as u64, 10).unwrap().unwrap().is_empty());
        assert!(store.read_range(id + 1, 0, 10).unwrap().is_none());
    }

    #[test]
    fn delete_removes_every_chunk() {
        let store = store();
        let blob = patterned(BLOB_CHUNK_SIZE + 1);
        let gone = store.add(&blob, "a.mp4", "A", "video/mp4").unwrap();
        let keep = store.add(b"keep", "b.mp4", "B", "video/mp4").unwrap();

        store.delete_by_id(gone).unwrap();

        let txn = store.in_disk.begin_read().unwrap();
        let blobs = txn.open_table(VIDEO_BLOB_TABLE).unwrap();
        let keys: Vec<(u64, u32)> = blobs
            .iter()
            .unwrap()
            .map(|entry| entry.unwrap().0.value())
            .collect();
        assert_eq!(keys, vec![(keep, 0)]);
    }

    #[test]
    fn summaries_carry_size_without_content() {
        let store = store();
        let id = store.add(&[7u8; 10], "a.mp4", "A", "video/mp4").unwrap();
        let summaries = store.list_summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].size, 10);
    }

    #[test]
    fn reopening_keeps_records_and_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("demotube.redb");

        let id = {
            let store = VideoStore::open(&path).unwrap();
            assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
            store.add(b"persisted", "a.mp4", "A", "video/mp4").unwrap()
        };

        let store = VideoStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(store.get_by_id(id).unwrap().unwrap().blob, b"persisted");
        let next = store.add(b"next", "b.mp4", "B", "video/mp4").unwrap();
        assert!(next > id);
    }

    #[test]
    fn unusable_path_is_storage_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("demotube.redb");

        let error = VideoStore::open(&path).unwrap_err();
        assert!(error.is_fatal(), "unexpected error: {error}");
    }

    #[test]
    fn newer_schema_version_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demotube.redb");
        {
            let store = VideoStore::open(&path).unwrap();
            let txn = store.in_disk.begin_write().unwrap();
            {
                let mut meta = txn.open_table(META_TABLE).unwrap();
                meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION + 1).unwrap();
            }
            txn.commit().unwrap();
        }

        let error = VideoStore::open(&path).unwrap_err();
        assert!(matches!(error, StoreError::StorageUnavailable(_)));
    }
}
