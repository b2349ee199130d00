use log::{error, info, warn};

use crate::common::CONFIRM_REMOVE_MESSAGE;
use crate::database::ops::local::LocalStore;
use crate::models::content::ContentUrls;
use crate::models::filter::GalleryFilter;
use crate::models::notice::Notice;
use crate::view::gallery::{Gallery, GalleryView};
use crate::view::player::{OpenVideo, PlayerOverlay};
use crate::workflow::flows::ingest_batch;
use crate::workflow::types::{IncomingFile, IngestReport, Prompter};

/// The library's single view-model: filter text, card grid, player overlay
/// and the notices waiting to be shown. Built once at startup.
#[derive(Debug)]
pub struct LibraryController {
    store: LocalStore,
    filter: GalleryFilter,
    gallery: Gallery,
    player: PlayerOverlay,
    notices: Vec<Notice>,
}

impl LibraryController {
    /// Build the controller and run the initial render.
    pub async fn start(store: LocalStore, urls: ContentUrls) -> Self {
        let mut controller = Self {
            store,
            filter: GalleryFilter::default(),
            gallery: Gallery::new(urls.clone()),
            player: PlayerOverlay::new(urls),
            notices: Vec::new(),
        };
        controller.refresh_gallery().await;
        controller
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn filter(&self) -> &GalleryFilter {
        &self.filter
    }

    pub fn gallery(&self) -> &GalleryView {
        self.gallery.view()
    }

    pub fn now_playing(&self) -> Option<&OpenVideo> {
        self.player.current()
    }

    /// Hand over the pending notices; each one is shown once.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        if notice.is_error() {
            warn!("{}", notice);
        } else {
            info!("{}", notice);
        }
        self.notices.push(notice);
    }

    /// Re-run the gallery against the current filter.
    pub async fn refresh_gallery(&mut self) {
        let rendered = self
            .gallery
            .refresh(&self.store, &self.filter)
            .await
            .map(|_| ());
        if let Err(store_error) = rendered {
            if store_error.is_fatal() {
                error!("Gallery refresh failed: {}", store_error);
            }
            self.notify(Notice::from(store_error));
        }
    }

    /// Filter text changed.
    pub async fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = GalleryFilter::new(query);
        self.refresh_gallery().await;
    }

    /// Persist a batch, then refresh the gallery once.
    pub async fn ingest<F>(
        &mut self,
        files: impl IntoIterator<Item = F>,
        prompter: &mut dyn Prompter,
    ) -> IngestReport
    where
        F: IncomingFile,
    {
        let report = ingest_batch(&self.store, files, prompter).await;
        for notice in &report.notices {
            self.notify(notice.clone());
        }
        self.refresh_gallery().await;
        report
    }

    /// The Remove action of a gallery card.
    pub async fn remove_from_gallery(&mut self, id: u64, prompter: &mut dyn Prompter) -> bool {
        if !prompter.confirm(CONFIRM_REMOVE_MESSAGE) {
            return false;
        }
        if let Err(store_error) = self.store.delete_by_id(id).await {
            self.notify(Notice::from(store_error));
            return false;
        }
        if self.player.current_id() == Some(id) {
            self.player.close();
        }
        self.refresh_gallery().await;
        true
    }

    pub async fn open_player(&mut self, id: u64) {
        if let Err(notice) = self.player.open(&self.store, id).await {
            self.notify(notice);
        }
    }

    pub fn close_player(&mut self) {
        self.player.close();
    }

    /// The Delete action of the player overlay.
    pub async fn delete_from_player(&mut self, prompter: &mut dyn Prompter) -> bool {
        match self.player.delete(&self.store, prompter).await {
            Ok(true) => {
                self.refresh_gallery().await;
                true
            }
            Ok(false) => false,
            Err(notice) => {
                self.notify(notice);
                false
            }
        }
    }
}
