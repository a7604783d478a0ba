use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::deck::DeckObserver;
use crate::storage::Storage;
use crate::types::ContentItem;

pub(crate) const SLOT_LIKED: &str = "deck/liked";
pub(crate) const SLOT_WATCHED: &str = "deck/watched";

/// Liked and watched lists, newest first, mirrored to durable slots.
///
/// The in-memory lists are authoritative for the session; a failing store
/// write is reported but never blocks or reorders a decision. Dislikes are
/// deliberately not recorded.
pub struct Library {
    store: Arc<dyn Storage>,
    liked: Mutex<Vec<ContentItem>>,
    watched: Mutex<Vec<ContentItem>>,
}

impl Library {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            liked: Mutex::new(Vec::new()),
            watched: Mutex::new(Vec::new()),
        }
    }

    /// Load both lists from the store; missing or undecodable slots start
    /// the session empty.
    pub async fn restore(store: Arc<dyn Storage>) -> Self {
        let liked = load_list(store.as_ref(), SLOT_LIKED).await;
        let watched = load_list(store.as_ref(), SLOT_WATCHED).await;
        Self {
            store,
            liked: Mutex::new(liked),
            watched: Mutex::new(watched),
        }
    }

    pub fn liked(&self) -> Vec<ContentItem> {
        self.liked.lock().unwrap().clone()
    }

    pub fn watched(&self) -> Vec<ContentItem> {
        self.watched.lock().unwrap().clone()
    }

    pub fn counts(&self) -> (usize, usize) {
        (
            self.liked.lock().unwrap().len(),
            self.watched.lock().unwrap().len(),
        )
    }

    async fn push(
        &self,
        list: &Mutex<Vec<ContentItem>>,
        slot: &str,
        item: &ContentItem,
    ) -> anyhow::Result<()> {
        let payload = {
            let mut list = list.lock().unwrap();
            list.insert(0, item.clone());
            serde_json::to_string(&*list)?
        };
        self.store.put_slot(slot, &payload).await
    }
}

async fn load_list(store: &dyn Storage, slot: &str) -> Vec<ContentItem> {
    match store.get_slot(slot).await {
        Ok(Some(payload)) => match serde_json::from_str(&payload) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(slot, error = %e, "undecodable list payload, starting empty");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(slot, error = %e, "list restore failed, starting empty");
            Vec::new()
        }
    }
}

#[async_trait]
impl DeckObserver for Library {
    async fn on_liked(&self, item: &ContentItem) -> anyhow::Result<()> {
        self.push(&self.liked, SLOT_LIKED, item).await
    }

    async fn on_disliked(&self, _item: &ContentItem) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_watched(&self, item: &ContentItem) -> anyhow::Result<()> {
        self.push(&self.watched, SLOT_WATCHED, item).await
    }
}
