use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Registry of live content references, the local stand-in for object
/// URLs. Every preview card and the open player hold one; a reference must
/// be revoked when its owner is discarded, otherwise it stays resolvable.
#[derive(Debug, Clone, Default)]
pub struct ContentUrls {
    live: Arc<DashMap<Uuid, u64>>,
}

/// One live reference to a record's content. Not `Clone`: whoever holds it
/// is responsible for handing it back to [`ContentUrls::revoke`].
#[derive(Debug, PartialEq, Eq)]
pub struct ContentHandle {
    token: Uuid,
}

impl ContentHandle {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn url(&self) -> String {
        format!("/content/{}", self.token)
    }
}

impl ContentUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, video_id: u64) -> ContentHandle {
        let token = Uuid::new_v4();
        self.live.insert(token, video_id);
        ContentHandle { token }
    }

    /// Returns false if the handle was already gone.
    pub fn revoke(&self, handle: ContentHandle) -> bool {
        self.live.remove(&handle.token).is_some()
    }

    pub fn revoke_all(&self, handles: impl IntoIterator<Item = ContentHandle>) -> usize {
        handles
            .into_iter()
            .map(|handle| self.revoke(handle))
            .filter(|revoked| *revoked)
            .count()
    }

    pub fn resolve(&self, token: Uuid) -> Option<u64> {
        self.live.get(&token).map(|entry| *entry.value())
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
