use log::info;
use std::cmp::Ordering;
use std::time::Instant;

use crate::common::errors::StoreResult;
use crate::database::ops::local::LocalStore;
use crate::database::schema::video::VideoSummary;
use crate::models::content::{ContentHandle, ContentUrls};
use crate::models::filter::GalleryFilter;

/// Presentation order: most recently added first. Ids are handed out in
/// insertion order, so a descending id is reverse insertion order.
pub fn presentation_order(a: &VideoSummary, b: &VideoSummary) -> Ordering {
    b.id.cmp(&a.id).then_with(|| b.created.cmp(&a.created))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: u64,
    pub title: String,
    pub filename: String,
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryBody {
    /// The store holds no records at all.
    Empty,
    /// Records exist but none match the filter.
    NoMatches,
    Cards(Vec<Card>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub filter: GalleryFilter,
    pub body: GalleryBody,
    /// Bumped on every successful render.
    pub generation: u64,
}

impl GalleryView {
    pub fn cards(&self) -> &[Card] {
        match &self.body {
            GalleryBody::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// The card grid. Owns one content reference per rendered card.
#[derive(Debug)]
pub struct Gallery {
    urls: ContentUrls,
    previews: Vec<ContentHandle>,
    view: GalleryView,
}

impl Gallery {
    pub fn new(urls: ContentUrls) -> Self {
        Self {
            urls,
            previews: Vec::new(),
            view: GalleryView {
                filter: GalleryFilter::default(),
                body: GalleryBody::Empty,
                generation: 0,
            },
        }
    }

    pub fn view(&self) -> &GalleryView {
        &self.view
    }

    pub fn live_previews(&self) -> usize {
        self.previews.len()
    }

    /// Re-read the store and rebuild the cards. On a read failure the
    /// previous view and its references are kept as they were.
    pub async fn refresh(
        &mut self,
        store: &LocalStore,
        filter: &GalleryFilter,
    ) -> StoreResult<&GalleryView> {
        let start_time = Instant::now();
        let mut summaries = store.list_summaries().await?;
        summaries.sort_by(presentation_order);
        let total = summaries.len();

        let released = self.urls.revoke_all(self.previews.drain(..));

        let keep = filter.generate_filter();
        let mut cards = Vec::new();
        for summary in summaries.into_iter().filter(|summary| keep(summary)) {
            let handle = self.urls.create(summary.id);
            cards.push(Card {
                id: summary.id,
                title: summary.display_title().to_string(),
                filename: summary.filename,
                preview_url: handle.url(),
            });
            self.previews.push(handle);
        }

        let body = if total == 0 {
            GalleryBody::Empty
        } else if cards.is_empty() {
            GalleryBody::NoMatches
        } else {
            GalleryBody::Cards(cards)
        };

        self.view = GalleryView {
            filter: filter.clone(),
            body,
            generation: self.view.generation + 1,
        };
        info!(
            duration = &*format!("{:?}", start_time.elapsed());
            "Rendered {} of {} videos (released {} previews)",
            self.previews.len(),
            total,
            released
        );
        Ok(&self.view)
    }
}
