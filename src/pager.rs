use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::catalog::CatalogSource;
use crate::storage::Storage;
use crate::types::{ContentItem, FilterState, PagerSnapshot};

pub(crate) const SLOT_PAGER: &str = "deck/pager";

/// Paginated, deduplicated item sequence for the active filter.
///
/// Owns the pagination cursor, the exhaustion flag and the durable
/// snapshot; completions from a superseded filter are detected by a
/// generation counter and dropped.
pub struct ContentPager {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn Storage>,
    state: Mutex<PagerState>,
}

#[derive(Debug)]
struct PagerState {
    filter: FilterState,
    items: Vec<ContentItem>,
    seen: HashSet<u32>,
    next_page: u32,
    exhausted: bool,
    loading: bool,
    last_error: Option<String>,
    generation: u64,
}

impl PagerState {
    fn new(filter: FilterState) -> Self {
        Self {
            filter,
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            exhausted: false,
            loading: false,
            last_error: None,
            generation: 0,
        }
    }
}

/// Point-in-time pager flags for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct PagerStatus {
    pub items: usize,
    pub loading: bool,
    pub exhausted: bool,
    pub error: Option<String>,
}

impl ContentPager {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn Storage>,
        filter: FilterState,
    ) -> Self {
        Self {
            catalog,
            store,
            state: Mutex::new(PagerState::new(filter)),
        }
    }

    /// Clear state for a new filter. A persisted snapshot whose filter is
    /// set-equal to the requested one is adopted verbatim with no network
    /// call; otherwise the stale snapshot is discarded and page 1 fetched.
    pub async fn reset(&self, filter: FilterState) {
        let generation = {
            let mut s = self.state.lock().unwrap();
            s.generation += 1;
            s.filter = filter.clone();
            s.items.clear();
            s.seen.clear();
            s.next_page = 1;
            s.exhausted = false;
            s.loading = false;
            s.last_error = None;
            s.generation
        };

        let restored = match self.store.get_slot(SLOT_PAGER).await {
            Ok(Some(payload)) => match serde_json::from_str::<PagerSnapshot>(&payload) {
                Ok(snapshot) if snapshot.filter == filter => Some(snapshot),
                Ok(_) => {
                    // Snapshot belongs to a different filter; not an error.
                    let _ = self.store.delete_slot(SLOT_PAGER).await;
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable deck snapshot, discarding");
                    let _ = self.store.delete_slot(SLOT_PAGER).await;
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "snapshot restore failed, fetching fresh");
                None
            }
        };

        if let Some(snapshot) = restored {
            let mut s = self.state.lock().unwrap();
            if s.generation == generation {
                s.seen = snapshot.items.iter().map(|i| i.id).collect();
                s.items = snapshot.items;
                s.next_page = snapshot.next_page.max(1);
                tracing::info!(
                    items = s.items.len(),
                    next_page = s.next_page,
                    "adopted persisted deck snapshot"
                );
            }
            return;
        }

        self.load_next().await;
    }

    /// Fetch the next page for the current filter. No-op while a fetch is
    /// in flight or the filter is exhausted. New items merge first-seen-wins
    /// by id; a page contributing nothing new marks the filter exhausted.
    pub async fn load_next(&self) {
        let (page, filter, generation) = {
            let mut s = self.state.lock().unwrap();
            if s.loading || s.exhausted {
                return;
            }
            s.loading = true;
            s.last_error = None;
            (s.next_page, s.filter.clone(), s.generation)
        };

        tracing::debug!(page, kind = %filter.kind, "fetching catalog page");
        let fetched = self.catalog.discover(page, &filter).await;

        let snapshot = {
            let mut s = self.state.lock().unwrap();
            if s.generation != generation {
                // Superseded by a filter change; drop the result.
                return;
            }
            s.loading = false;
            match fetched {
                Ok(batch) => {
                    let before = s.items.len();
                    for item in batch {
                        if s.seen.insert(item.id) {
                            s.items.push(item);
                        }
                    }
                    let added = s.items.len() - before;
                    s.next_page += 1;
                    if added == 0 {
                        s.exhausted = true;
                        tracing::info!(page, "catalog exhausted for current filter");
                    }
                    Some(PagerSnapshot {
                        filter: s.filter.clone(),
                        items: s.items.clone(),
                        next_page: s.next_page,
                    })
                }
                Err(e) => {
                    // Recoverable: items stay, the next load_next retries.
                    tracing::warn!(page, error = %e, "catalog page fetch failed");
                    s.last_error = Some(e.to_string());
                    None
                }
            }
        };

        if let Some(snapshot) = snapshot {
            self.persist(&snapshot).await;
        }
    }

    async fn persist(&self, snapshot: &PagerSnapshot) {
        // Best-effort: a failing store leaves the session in-memory only.
        match serde_json::to_string(snapshot) {
            Ok(payload) => {
                if let Err(e) = self.store.put_slot(SLOT_PAGER, &payload).await {
                    tracing::warn!(error = %e, "persisting deck snapshot failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "serializing deck snapshot failed"),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<ContentItem> {
        self.state.lock().unwrap().items.get(index).cloned()
    }

    /// Contiguous slice `[start, start + len)` of the sequence, clamped.
    pub fn window(&self, start: usize, len: usize) -> Vec<ContentItem> {
        let s = self.state.lock().unwrap();
        s.items.iter().skip(start).take(len).cloned().collect()
    }

    pub fn filter(&self) -> FilterState {
        self.state.lock().unwrap().filter.clone()
    }

    pub fn status(&self) -> PagerStatus {
        let s = self.state.lock().unwrap();
        PagerStatus {
            items: s.items.len(),
            loading: s.loading,
            exhausted: s.exhausted,
            error: s.last_error.clone(),
        }
    }
}
