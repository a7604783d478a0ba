pub mod catalog;
pub mod dao;
pub mod db;
pub mod deck;
pub mod gesture;
pub mod library;
pub mod pager;
pub mod player;
pub mod storage;
pub mod trailers;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::catalog::{CatalogError, CatalogSource, TmdbCatalog};
    pub use crate::deck::{
        DeckCard, DeckObserver, DeckStatus, DeckView, SwipeDeck, REFILL_THRESHOLD, WINDOW_SIZE,
    };
    pub use crate::gesture::{
        CardTransform, Classification, Displacement, GestureRecognizer, Point, SwipeDirection,
        Viewport,
    };
    pub use crate::library::Library;
    pub use crate::player::{PlaybackError, PlaybackWidget};
    pub use crate::storage::{MemoryStore, Storage};
    pub use crate::trailers::{TrailerCache, TrailerStatus};
    pub use crate::types::{ContentItem, ContentKind, FilterState, Genre, TrailerHandle};
}

use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::catalog::CatalogSource;
use crate::db::Database;
use crate::deck::SwipeDeck;
use crate::library::Library;
use crate::storage::Storage;
use crate::types::{ContentItem, ContentKind, FilterState, Genre, TrailerHandle};

/// Stored-state overview for diagnostics.
#[derive(Debug, Clone)]
pub struct DeckStats {
    pub liked: usize,
    pub watched: usize,
    pub has_snapshot: bool,
    pub slots: usize,
}

/// Async library entry point. Owns the database and (optionally) a catalog
/// client; decks are built per filter on top of both.
pub struct Reeldeck {
    db: Database,
    catalog: Option<Arc<dyn CatalogSource>>,
}

impl Reeldeck {
    /// Initialize database and (optionally) run migrations. Does not start
    /// any internal runtimes.
    pub async fn connect(database_url: Option<&str>, run_migrations: bool) -> Result<Self> {
        let db = Database::connect(database_url).await?;
        if run_migrations {
            db.run_migrations().await?;
        }
        Ok(Self { db, catalog: None })
    }

    /// Attach a catalog client. Required for discovery, trailer lookups
    /// and deck building; the stored-state surfaces work without one.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn require_catalog(&self) -> Result<Arc<dyn CatalogSource>> {
        self.catalog
            .clone()
            .ok_or_else(|| anyhow!("no catalog configured; call with_catalog first"))
    }

    fn store(&self) -> Arc<dyn Storage> {
        Arc::new(self.db.clone())
    }

    /// Build a swipe deck for a filter, with the durable [`Library`] as
    /// its outcome observer. The deck is inert until
    /// [`SwipeDeck::start`].
    pub async fn deck(&self, filter: FilterState) -> Result<(Arc<SwipeDeck>, Arc<Library>)> {
        let catalog = self.require_catalog()?;
        let store = self.store();
        let library = Arc::new(Library::restore(store.clone()).await);
        let deck = Arc::new(SwipeDeck::new(catalog, store, library.clone(), filter));
        Ok((deck, library))
    }

    /// Genre taxonomy for a content kind.
    pub async fn genres(&self, kind: ContentKind) -> Result<Vec<Genre>> {
        Ok(self.require_catalog()?.genres(kind).await?)
    }

    /// One discover page, unfiltered passthrough for previewing a filter.
    pub async fn discover(&self, page: u32, filter: &FilterState) -> Result<Vec<ContentItem>> {
        Ok(self.require_catalog()?.discover(page, filter).await?)
    }

    /// Best trailer for a single item, or None.
    pub async fn trailer(&self, id: u32, kind: ContentKind) -> Result<Option<TrailerHandle>> {
        Ok(self.require_catalog()?.lookup_trailer(id, kind).await?)
    }

    /// The durable liked/watched lists, restored from the store.
    pub async fn library(&self) -> Library {
        Library::restore(self.store()).await
    }

    /// Counts of stored state.
    pub async fn stats(&self) -> Result<DeckStats> {
        let library = self.library().await;
        let (liked, watched) = library.counts();
        let has_snapshot = self.db.get_slot(crate::pager::SLOT_PAGER).await?.is_some();
        let slots = self.db.count_slots().await? as usize;
        Ok(DeckStats { liked, watched, has_snapshot, slots })
    }

    /// Clear stored slots by prefix (everything when None). Returns the
    /// number of rows removed.
    pub async fn clear_state(&self, prefix: Option<&str>) -> Result<u64> {
        self.db.clear_slots_prefix(prefix).await
    }

    /// Vacuum/compact the database (SQLite only; no-op on others).
    pub async fn vacuum_db(&self) -> Result<()> {
        self.db.vacuum().await
    }
}
