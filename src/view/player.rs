use log::{info, warn};

use crate::common::CONFIRM_PLAYER_DELETE_MESSAGE;
use crate::database::ops::local::LocalStore;
use crate::models::content::{ContentHandle, ContentUrls};
use crate::models::notice::Notice;
use crate::workflow::types::Prompter;

#[derive(Debug)]
pub struct OpenVideo {
    pub id: u64,
    pub title: String,
    pub filename: String,
    pub media_type: String,
    handle: ContentHandle,
}

impl OpenVideo {
    pub fn content_url(&self) -> String {
        self.handle.url()
    }
}

#[derive(Debug, Default)]
pub enum PlayerState {
    #[default]
    Closed,
    Open(OpenVideo),
}

/// Full-size playback of one record.
///
/// ```text
/// Closed  --open(id), found-->      Open(id)
/// Closed  --open(id), not found-->  Closed   (+ notice)
/// Open    --close-->                Closed
/// Open    --delete, confirmed-->    Closed   (+ record removed)
/// Open    --delete, declined-->     Open
/// ```
#[derive(Debug)]
pub struct PlayerOverlay {
    urls: ContentUrls,
    state: PlayerState,
}

impl PlayerOverlay {
    pub fn new(urls: ContentUrls) -> Self {
        Self {
            urls,
            state: PlayerState::Closed,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn current(&self) -> Option<&OpenVideo> {
        match &self.state {
            PlayerState::Open(video) => Some(video),
            PlayerState::Closed => None,
        }
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current().map(|video| video.id)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PlayerState::Open(_))
    }

    /// Show a record. A missing id leaves the overlay as it was and comes
    /// back as `Notice::NotFound`.
    pub async fn open(&mut self, store: &LocalStore, id: u64) -> Result<(), Notice> {
        let summary = store
            .get_summary(id)
            .await
            .map_err(Notice::from)?
            .ok_or(Notice::NotFound { id })?;

        self.release();
        let handle = self.urls.create(id);
        info!("Playing video {} '{}'", id, summary.filename);
        self.state = PlayerState::Open(OpenVideo {
            id,
            title: summary.display_title().to_string(),
            filename: summary.filename,
            media_type: summary.media_type,
            handle,
        });
        Ok(())
    }

    /// Stop playback and hide. Closing a closed overlay does nothing.
    pub fn close(&mut self) {
        if let Some(id) = self.release() {
            info!("Closed player for video {}", id);
        }
    }

    /// Delete the open record after confirmation. Returns true when the
    /// record was removed; the overlay is then closed.
    pub async fn delete(
        &mut self,
        store: &LocalStore,
        prompter: &mut dyn Prompter,
    ) -> Result<bool, Notice> {
        let Some(id) = self.current_id() else {
            return Ok(false);
        };
        if !prompter.confirm(CONFIRM_PLAYER_DELETE_MESSAGE) {
            return Ok(false);
        }
        if let Err(error) = store.delete_by_id(id).await {
            warn!("Failed to delete video {}: {}", id, error);
            return Err(Notice::from(error));
        }
        self.close();
        Ok(true)
    }

    fn release(&mut self) -> Option<u64> {
        match std::mem::take(&mut self.state) {
            PlayerState::Open(video) => {
                let id = video.id;
                self.urls.revoke(video.handle);
                Some(id)
            }
            PlayerState::Closed => None,
        }
    }
}
