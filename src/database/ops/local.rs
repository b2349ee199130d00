use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::spawn_blocking;

use crate::common::errors::{StoreError, StoreResult};
use crate::database::ops::reader::BlobReader;
use crate::database::ops::store::VideoStore;
use crate::database::schema::video::{VideoRecord, VideoSummary};

/// Async handle to the local store. Each call runs one transaction on the
/// blocking pool and resolves once it has committed or failed.
#[derive(Debug, Clone)]
pub struct LocalStore {
    inner: Arc<VideoStore>,
}

impl LocalStore {
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let store = spawn_blocking(move || VideoStore::open(path))
            .await
            .map_err(StoreError::unavailable)??;
        Ok(Self::from_store(store))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_store(VideoStore::open_in_memory()?))
    }

    pub fn from_store(store: VideoStore) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub async fn add(
        &self,
        blob: Vec<u8>,
        filename: impl Into<String>,
        title: impl Into<String>,
        media_type: impl Into<String>,
    ) -> StoreResult<u64> {
        let (filename, title, media_type) = (filename.into(), title.into(), media_type.into());
        self.run_write(move |store| store.add(&blob, &filename, &title, &media_type))
            .await
    }

    pub async fn list_all(&self) -> StoreResult<Vec<VideoRecord>> {
        self.run_read(|store| store.list_all()).await
    }

    pub async fn list_summaries(&self) -> StoreResult<Vec<VideoSummary>> {
        self.run_read(|store| store.list_summaries()).await
    }

    pub async fn get_by_id(&self, id: u64) -> StoreResult<Option<VideoRecord>> {
        self.run_read(move |store| store.get_by_id(id)).await
    }

    pub async fn get_summary(&self, id: u64) -> StoreResult<Option<VideoSummary>> {
        self.run_read(move |store| store.get_summary(id)).await
    }

    /// Seekable stream over the content of `summary`'s record.
    pub fn blob_reader(&self, summary: &VideoSummary) -> BlobReader {
        BlobReader::new(Arc::clone(&self.inner), summary.id, summary.size)
    }

    pub async fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        self.run_write(move |store| store.delete_by_id(id)).await
    }

    pub async fn find_by_title(&self, title: impl Into<String>) -> StoreResult<Vec<u64>> {
        let title = title.into();
        self.run_read(move |store| store.find_by_title(&title)).await
    }

    pub async fn find_by_filename(&self, filename: impl Into<String>) -> StoreResult<Vec<u64>> {
        let filename = filename.into();
        self.run_read(move |store| store.find_by_filename(&filename))
            .await
    }

    pub async fn schema_version(&self) -> StoreResult<u64> {
        self.run_read(|store| store.schema_version()).await
    }

    async fn run_read<T, F>(&self, job: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&VideoStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        spawn_blocking(move || job(&store))
            .await
            .map_err(StoreError::read)?
    }

    async fn run_write<T, F>(&self, job: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&VideoStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        spawn_blocking(move || job(&store))
            .await
            .map_err(StoreError::write)?
    }
}
