use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::catalog::CatalogSource;
use crate::types::{ContentKind, TrailerHandle};

/// Cache key: ids are only unique within a kind, so movie 5 and series 5
/// are distinct entries.
pub type TrailerKey = (ContentKind, u32);

/// Tri-state a card renders from: not asked yet, lookup in flight, or a
/// final answer (which may be "no trailer").
#[derive(Debug, Clone, PartialEq)]
pub enum TrailerStatus {
    Unresolved,
    Pending,
    Resolved(Option<TrailerHandle>),
}

enum Entry {
    InFlight(watch::Receiver<Option<Option<TrailerHandle>>>),
    Resolved(Option<TrailerHandle>),
}

/// Memoizing trailer resolver with in-flight request coalescing: at most
/// one outstanding catalog lookup per key, shared by every concurrent
/// caller. Entries live until [`TrailerCache::clear`] (filter change).
pub struct TrailerCache {
    catalog: Arc<dyn CatalogSource>,
    entries: Mutex<HashMap<TrailerKey, Entry>>,
}

enum Claim {
    Done(Option<TrailerHandle>),
    Wait(watch::Receiver<Option<Option<TrailerHandle>>>),
    Fetch(watch::Sender<Option<Option<TrailerHandle>>>),
}

impl TrailerCache {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a trailer, memoized. A lookup failure resolves to `None`
    /// exactly like a catalog with no trailer; it never surfaces as an
    /// error to the deck.
    pub async fn resolve(&self, id: u32, kind: ContentKind) -> Option<TrailerHandle> {
        let claim = {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(&(kind, id)) {
                Some(Entry::Resolved(v)) => Claim::Done(v.clone()),
                Some(Entry::InFlight(rx)) => Claim::Wait(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    entries.insert((kind, id), Entry::InFlight(rx));
                    Claim::Fetch(tx)
                }
            }
        };

        match claim {
            Claim::Done(v) => v,
            Claim::Wait(mut rx) => loop {
                let settled = rx.borrow_and_update().clone();
                if let Some(v) = settled {
                    return v;
                }
                if rx.changed().await.is_err() {
                    // Resolver vanished without an answer; report whatever
                    // the map has settled on.
                    let entries = self.entries.lock().unwrap();
                    return match entries.get(&(kind, id)) {
                        Some(Entry::Resolved(v)) => v.clone(),
                        _ => None,
                    };
                }
            },
            Claim::Fetch(tx) => {
                let resolved = match self.catalog.lookup_trailer(id, kind).await {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(id, kind = %kind, error = %e, "trailer lookup failed, resolving to none");
                        None
                    }
                };
                let mut entries = self.entries.lock().unwrap();
                entries.insert((kind, id), Entry::Resolved(resolved.clone()));
                let _ = tx.send(Some(resolved.clone()));
                resolved
            }
        }
    }

    /// Current state of a key without triggering a lookup.
    pub fn status(&self, id: u32, kind: ContentKind) -> TrailerStatus {
        let entries = self.entries.lock().unwrap();
        match entries.get(&(kind, id)) {
            None => TrailerStatus::Unresolved,
            Some(Entry::InFlight(_)) => TrailerStatus::Pending,
            Some(Entry::Resolved(v)) => TrailerStatus::Resolved(v.clone()),
        }
    }

    /// Kick off resolution for a window of keys in the background.
    pub fn preload(self: &Arc<Self>, keys: Vec<TrailerKey>) {
        let cache = self.clone();
        tokio::spawn(async move {
            let lookups = keys.into_iter().map(|(kind, id)| {
                let cache = cache.clone();
                async move {
                    cache.resolve(id, kind).await;
                }
            });
            futures::future::join_all(lookups).await;
        });
    }

    /// Drop every entry. Called on filter change; ids are namespaced per
    /// kind but a fresh deck should not trust a previous session's window.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
