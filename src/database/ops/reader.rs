use std::future::Future;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tokio::task::{JoinHandle, spawn_blocking};

use crate::common::errors::StoreResult;
use crate::database::ops::store::VideoStore;
use crate::database::schema::video::BLOB_CHUNK_SIZE;

/// Seekable reader over one record's content. Each read fetches at most one
/// chunk's worth of bytes on the blocking pool, so serving a range never
/// loads the whole video.
pub struct BlobReader {
    store: Arc<VideoStore>,
    id: u64,
    len: u64,
    pos: u64,
    pending: Option<JoinHandle<StoreResult<Option<Vec<u8>>>>>,
}

impl BlobReader {
    pub(crate) fn new(store: Arc<VideoStore>, id: u64, len: u64) -> Self {
        Self {
            store,
            id,
            len,
            pos: 0,
            pending: None,
        }
    }
}

impl AsyncRead for BlobReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos >= this.len || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let want = (buf.remaining() as u64)
            .min(BLOB_CHUNK_SIZE as u64)
            .min(this.len - this.pos);
        let (id, offset) = (this.id, this.pos);
        let store = &this.store;
        let handle = this.pending.get_or_insert_with(|| {
            let store = Arc::clone(store);
            spawn_blocking(move || store.read_range(id, offset, want))
        });

        let result = ready!(Pin::new(handle).poll(cx));
        this.pending = None;
        let bytes = result
            .map_err(io::Error::other)?
            .map_err(io::Error::other)?
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "video was deleted"))?;

        let n = bytes.len().min(buf.remaining());
        buf.put_slice(&bytes[..n]);
        this.pos += n as u64;
        Poll::Ready(Ok(()))
    }
}

impl AsyncSeek for BlobReader {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.get_mut();
        let target = match position {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => this.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => this.pos.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of video")
        })?;
        // 位置改變後，尚未完成的讀取已經沒有意義
        this.pending = None;
        this.pos = target;
        Ok(())
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.pos))
    }
}
