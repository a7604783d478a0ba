use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::catalog::CatalogSource;
use crate::gesture::{
    CardTransform, Classification, GestureRecognizer, Point, SwipeDirection, Viewport,
};
use crate::pager::ContentPager;
use crate::player::{PlaybackWidget, READY_TIMEOUT};
use crate::storage::Storage;
use crate::trailers::{TrailerCache, TrailerStatus};
use crate::types::{ContentItem, FilterState};

/// Cards rendered/preloaded ahead of the cursor.
pub const WINDOW_SIZE: usize = 4;
/// Remaining-card level that triggers a background page fetch.
pub const REFILL_THRESHOLD: usize = 5;

/// Consumer callbacks for decided cards. A failing callback is the
/// consumer's problem: the deck logs it and moves on, the gesture decision
/// stands.
#[async_trait]
pub trait DeckObserver: Send + Sync {
    async fn on_liked(&self, item: &ContentItem) -> anyhow::Result<()>;
    async fn on_disliked(&self, item: &ContentItem) -> anyhow::Result<()>;
    async fn on_watched(&self, item: &ContentItem) -> anyhow::Result<()>;
}

/// What the empty deck area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckStatus {
    /// At least one card is available to swipe.
    Ready,
    /// Nothing to show yet, a fetch is in flight.
    Loading,
    /// Drained and the last fetch failed; retryable.
    Failed(String),
    /// Drained with the catalog exhausted (or nothing matched the filter).
    Empty,
}

/// One card of the visible window.
#[derive(Debug, Clone)]
pub struct DeckCard {
    pub item: ContentItem,
    pub trailer: TrailerStatus,
    pub active: bool,
    pub transform: CardTransform,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct DeckView {
    pub cards: Vec<DeckCard>,
    pub status: DeckStatus,
    pub loading: bool,
    pub exhausted: bool,
    pub error: Option<String>,
    pub muted: bool,
}

#[derive(Debug)]
struct DeckState {
    cursor: usize,
    muted: bool,
    started: bool,
}

/// Orchestrates pager, trailer cache, gesture recognizer and playback:
/// classifies gestures into outcomes, advances the cursor, notifies the
/// observer and keeps the card window fetched and preloaded.
pub struct SwipeDeck {
    pager: Arc<ContentPager>,
    trailers: Arc<TrailerCache>,
    observer: Arc<dyn DeckObserver>,
    player: Mutex<Option<Arc<dyn PlaybackWidget>>>,
    gesture: Mutex<GestureRecognizer>,
    state: Mutex<DeckState>,
}

impl SwipeDeck {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn Storage>,
        observer: Arc<dyn DeckObserver>,
        filter: FilterState,
    ) -> Self {
        Self {
            pager: Arc::new(ContentPager::new(catalog.clone(), store, filter)),
            trailers: Arc::new(TrailerCache::new(catalog)),
            observer,
            player: Mutex::new(None),
            gesture: Mutex::new(GestureRecognizer::new()),
            state: Mutex::new(DeckState { cursor: 0, muted: true, started: false }),
        }
    }

    pub fn attach_player(&self, widget: Arc<dyn PlaybackWidget>) {
        *self.player.lock().unwrap() = Some(widget);
        self.activate_front();
    }

    /// Initial load for the filter the deck was built with.
    pub async fn start(&self) {
        let filter = self.pager.filter();
        self.refresh(filter).await;
    }

    /// Apply a new filter. Re-applying the same logical filter (genre set
    /// equal, kind equal) is a no-op so the deck position survives.
    pub async fn on_filter_change(&self, filter: FilterState) {
        {
            let state = self.state.lock().unwrap();
            if state.started && filter == self.pager.filter() {
                return;
            }
        }
        self.refresh(filter).await;
    }

    async fn refresh(&self, filter: FilterState) {
        self.pager.reset(filter).await;
        self.trailers.clear();
        {
            let mut state = self.state.lock().unwrap();
            state.cursor = 0;
            state.started = true;
        }
        self.preload_window();
        self.activate_front();
    }

    /// Retry after a failed fetch surfaced through [`DeckStatus::Failed`].
    pub async fn retry(&self) {
        self.pager.load_next().await;
        self.preload_window();
        self.activate_front();
    }

    pub fn filter(&self) -> FilterState {
        self.pager.filter()
    }

    // --- gesture surface ---

    pub fn on_pointer_down(&self, at: Point) {
        self.gesture.lock().unwrap().pointer_down(at);
    }

    pub fn on_pointer_move(&self, at: Point) {
        self.gesture.lock().unwrap().pointer_move(at);
    }

    /// Pointer released: classify, hold through the settle delay, then
    /// commit the outcome. Returns the decided direction, or None for a
    /// snap-back.
    pub async fn on_gesture_released(&self, viewport: Viewport) -> Option<SwipeDirection> {
        let classification = self.gesture.lock().unwrap().pointer_up(viewport);
        match classification {
            Classification::Cancel => None,
            Classification::Decisive(_) => self.settle_and_commit().await,
        }
    }

    /// Lost pointer (e.g. the browser dropped the touch): identical to a
    /// release at the last known displacement.
    pub async fn on_gesture_cancelled(&self, viewport: Viewport) -> Option<SwipeDirection> {
        self.on_gesture_released(viewport).await
    }

    /// Explicit action control (like/dislike/watched button): bypasses
    /// dragging and settles with the longer deterministic delay.
    pub async fn on_action_triggered(
        &self,
        direction: SwipeDirection,
        viewport: Viewport,
    ) -> Option<SwipeDirection> {
        if !self.gesture.lock().unwrap().trigger(direction, viewport) {
            return None;
        }
        self.settle_and_commit().await
    }

    async fn settle_and_commit(&self) -> Option<SwipeDirection> {
        // A classified decision always runs to completion; the settle delay
        // just lets the exit animation play out.
        let delay = self.gesture.lock().unwrap().settle_delay()?;
        tokio::time::sleep(delay).await;
        let direction = self.gesture.lock().unwrap().complete_settle()?;
        self.commit(direction).await;
        Some(direction)
    }

    async fn commit(&self, direction: SwipeDirection) {
        // (1) advance the cursor past the decided card
        let decided = {
            let mut state = self.state.lock().unwrap();
            let item = self.pager.get(state.cursor);
            if item.is_some() {
                state.cursor += 1;
            }
            item
        };
        let Some(item) = decided else { return };
        tracing::info!(id = item.id, kind = %item.kind, ?direction, "card decided");

        // (2) notify the consumer; never roll the cursor back on failure
        let outcome = match direction {
            SwipeDirection::Right => self.observer.on_liked(&item).await,
            SwipeDirection::Left => self.observer.on_disliked(&item).await,
            SwipeDirection::Up => self.observer.on_watched(&item).await,
        };
        if let Err(e) = outcome {
            tracing::warn!(id = item.id, error = %e, "outcome callback failed");
        }

        // (3) keep the deck supplied
        self.maybe_refill();
        self.preload_window();
        self.activate_front();
    }

    /// Fire-and-forget page fetch when the remaining cards run low. The
    /// pager's loading flag keeps this from double-firing.
    fn maybe_refill(&self) {
        let cursor = self.state.lock().unwrap().cursor;
        let status = self.pager.status();
        let remaining = status.items.saturating_sub(cursor);
        if remaining < REFILL_THRESHOLD && !status.loading && !status.exhausted {
            tracing::debug!(remaining, "refilling deck");
            let pager = self.pager.clone();
            tokio::spawn(async move { pager.load_next().await });
        }
    }

    fn preload_window(&self) {
        let cursor = self.state.lock().unwrap().cursor;
        let keys = self
            .pager
            .window(cursor, WINDOW_SIZE)
            .iter()
            .map(|i| (i.kind, i.id))
            .collect();
        self.trailers.preload(keys);
    }

    /// Drive the playback widget for the frontmost card: resolve its
    /// trailer, wait (bounded) for the widget, load and play. Runs in the
    /// background so gesture handling never blocks on the network.
    fn activate_front(&self) {
        let widget = self.player.lock().unwrap().clone();
        let Some(widget) = widget else { return };

        let (front, muted) = {
            let state = self.state.lock().unwrap();
            (self.pager.get(state.cursor), state.muted)
        };
        let Some(item) = front else {
            widget.pause();
            return;
        };

        let trailers = self.trailers.clone();
        tokio::spawn(async move {
            let Some(handle) = trailers.resolve(item.id, item.kind).await else {
                // Resolved to none: the card shows its backdrop instead.
                widget.pause();
                return;
            };
            if let Err(e) = widget.wait_ready(READY_TIMEOUT).await {
                tracing::warn!(id = item.id, error = %e, "playback widget not ready");
                return;
            }
            widget.load(&handle);
            if muted {
                widget.mute();
            } else {
                widget.unmute();
            }
            widget.play();
        });
    }

    /// Flip mute on the attached widget and report the new state.
    pub fn toggle_mute(&self) -> bool {
        let widget = self.player.lock().unwrap().clone();
        let mut state = self.state.lock().unwrap();
        state.muted = match widget {
            Some(w) => {
                if w.is_muted() {
                    w.unmute();
                    false
                } else {
                    w.mute();
                    true
                }
            }
            None => !state.muted,
        };
        state.muted
    }

    /// Playback-ended notification from the widget: loop the trailer.
    pub fn notify_playback_ended(&self) {
        if let Some(widget) = self.player.lock().unwrap().clone() {
            widget.play();
        }
    }

    /// Snapshot for the presentation layer.
    pub fn view(&self) -> DeckView {
        let (cursor, muted) = {
            let state = self.state.lock().unwrap();
            (state.cursor, state.muted)
        };
        let pager_status = self.pager.status();
        let transform = self.gesture.lock().unwrap().transform();

        let cards: Vec<DeckCard> = self
            .pager
            .window(cursor, WINDOW_SIZE)
            .into_iter()
            .enumerate()
            .map(|(idx, item)| DeckCard {
                trailer: self.trailers.status(item.id, item.kind),
                active: idx == 0,
                transform: if idx == 0 { transform } else { CardTransform::IDENTITY },
                item,
            })
            .collect();

        // Fetch trouble stays silent while cards remain; the empty deck is
        // where loading/failure/exhaustion become visible.
        let status = if !cards.is_empty() {
            DeckStatus::Ready
        } else if pager_status.loading {
            DeckStatus::Loading
        } else if let Some(err) = &pager_status.error {
            DeckStatus::Failed(err.clone())
        } else {
            DeckStatus::Empty
        };

        DeckView {
            cards,
            status,
            loading: pager_status.loading,
            exhausted: pager_status.exhausted,
            error: pager_status.error,
            muted,
        }
    }

    /// Current cursor position (first undecided index).
    pub fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::player::PlaybackError;
    use crate::storage::MemoryStore;
    use crate::types::{ContentKind, Genre, TrailerHandle};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const VIEWPORT: Viewport = Viewport { width: 400.0, height: 800.0 };

    fn item(id: u32) -> ContentItem {
        ContentItem {
            id,
            kind: ContentKind::Movie,
            title: format!("Title {id}"),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            vote_average: 7.0,
            release_date: None,
        }
    }

    struct FakeCatalog {
        movie_pages: Vec<Vec<ContentItem>>,
        series_pages: Vec<Vec<ContentItem>>,
        discover_calls: AtomicUsize,
        fail_discover: AtomicBool,
    }

    impl FakeCatalog {
        fn new(movie_pages: Vec<Vec<ContentItem>>) -> Arc<Self> {
            Arc::new(Self {
                movie_pages,
                series_pages: vec![vec![item(900), item(901)]],
                discover_calls: AtomicUsize::new(0),
                fail_discover: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn discover(
            &self,
            page: u32,
            filter: &FilterState,
        ) -> Result<Vec<ContentItem>, CatalogError> {
            self.discover_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_discover.load(Ordering::SeqCst) {
                return Err(CatalogError::ApiError("discover down".into()));
            }
            let pages = match filter.kind {
                ContentKind::Movie => &self.movie_pages,
                ContentKind::Series => &self.series_pages,
            };
            Ok(pages.get(page as usize - 1).cloned().unwrap_or_default())
        }

        async fn lookup_trailer(
            &self,
            id: u32,
            kind: ContentKind,
        ) -> Result<Option<TrailerHandle>, CatalogError> {
            Ok(Some(TrailerHandle::new(format!("{kind}-{id}"))))
        }

        async fn genres(&self, _kind: ContentKind) -> Result<Vec<Genre>, CatalogError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        decisions: Mutex<Vec<(SwipeDirection, u32)>>,
        fail: AtomicBool,
    }

    impl RecordingObserver {
        fn record(&self, direction: SwipeDirection, id: u32) -> anyhow::Result<()> {
            self.decisions.lock().unwrap().push((direction, id));
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("downstream persistence failed");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DeckObserver for RecordingObserver {
        async fn on_liked(&self, item: &ContentItem) -> anyhow::Result<()> {
            self.record(SwipeDirection::Right, item.id)
        }

        async fn on_disliked(&self, item: &ContentItem) -> anyhow::Result<()> {
            self.record(SwipeDirection::Left, item.id)
        }

        async fn on_watched(&self, item: &ContentItem) -> anyhow::Result<()> {
            self.record(SwipeDirection::Up, item.id)
        }
    }

    fn deck_with(
        catalog: Arc<FakeCatalog>,
        observer: Arc<RecordingObserver>,
    ) -> SwipeDeck {
        SwipeDeck::new(
            catalog,
            Arc::new(MemoryStore::new()),
            observer,
            FilterState::new(ContentKind::Movie),
        )
    }

    /// Let spawned refill/preload tasks run to completion on the
    /// current-thread test runtime.
    async fn drain_tasks() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    async fn swipe(deck: &SwipeDeck, dx: f32, dy: f32) -> Option<SwipeDirection> {
        deck.on_pointer_down(Point::new(0.0, 0.0));
        deck.on_pointer_move(Point::new(dx, dy));
        deck.on_gesture_released(VIEWPORT).await
    }

    #[tokio::test(start_paused = true)]
    async fn swipe_right_likes_and_advances() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1), item(2)]]), observer.clone());
        deck.start().await;

        let outcome = swipe(&deck, 150.0, 0.0).await;
        assert_eq!(outcome, Some(SwipeDirection::Right));
        assert_eq!(deck.cursor(), 1);
        assert_eq!(
            observer.decisions.lock().unwrap().as_slice(),
            &[(SwipeDirection::Right, 1)]
        );

        let view = deck.view();
        assert_eq!(view.cards[0].item.id, 2);
        assert!(view.cards[0].active);
    }

    #[tokio::test(start_paused = true)]
    async fn swipe_left_dislikes_and_up_marks_watched() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(
            FakeCatalog::new(vec![vec![item(1), item(2), item(3)]]),
            observer.clone(),
        );
        deck.start().await;

        assert_eq!(swipe(&deck, -150.0, 0.0).await, Some(SwipeDirection::Left));
        assert_eq!(swipe(&deck, 0.0, -250.0).await, Some(SwipeDirection::Up));
        assert_eq!(
            observer.decisions.lock().unwrap().as_slice(),
            &[(SwipeDirection::Left, 1), (SwipeDirection::Up, 2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_swipe_decides_nothing() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1)]]), observer.clone());
        deck.start().await;

        assert_eq!(swipe(&deck, 10.0, 10.0).await, None);
        assert_eq!(deck.cursor(), 0);
        assert!(observer.decisions.lock().unwrap().is_empty());
        assert_eq!(deck.view().cards[0].item.id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn action_trigger_decides_without_drag() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1)]]), observer.clone());
        deck.start().await;

        let outcome = deck.on_action_triggered(SwipeDirection::Up, VIEWPORT).await;
        assert_eq!(outcome, Some(SwipeDirection::Up));
        assert_eq!(
            observer.decisions.lock().unwrap().as_slice(),
            &[(SwipeDirection::Up, 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn callback_failure_never_rolls_back_cursor() {
        let observer = Arc::new(RecordingObserver::default());
        observer.fail.store(true, Ordering::SeqCst);
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1), item(2)]]), observer.clone());
        deck.start().await;

        assert_eq!(swipe(&deck, 150.0, 0.0).await, Some(SwipeDirection::Right));
        assert_eq!(deck.cursor(), 1);
        assert_eq!(deck.view().cards[0].item.id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_is_monotonic_and_bounded() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1), item(2)]]), observer.clone());
        deck.start().await;

        for _ in 0..5 {
            swipe(&deck, 150.0, 0.0).await;
            drain_tasks().await;
        }
        // Two decisions happened; further gestures on the drained deck are
        // no-ops and the cursor stays within the sequence.
        assert_eq!(deck.cursor(), 2);
        assert_eq!(observer.decisions.lock().unwrap().len(), 2);
        assert!(deck.view().cards.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refill_fires_when_window_runs_low() {
        let observer = Arc::new(RecordingObserver::default());
        let pages = vec![
            vec![item(1), item(2), item(3), item(4), item(5), item(6)],
            vec![item(7), item(8)],
        ];
        let catalog = FakeCatalog::new(pages);
        let deck = deck_with(catalog.clone(), observer);
        deck.start().await;
        assert_eq!(catalog.discover_calls.load(Ordering::SeqCst), 1);

        // 6 items, cursor 1 -> 5 remaining: not below the threshold yet.
        swipe(&deck, 150.0, 0.0).await;
        drain_tasks().await;
        assert_eq!(catalog.discover_calls.load(Ordering::SeqCst), 1);

        // cursor 2 -> 4 remaining: refill kicks in.
        swipe(&deck, 150.0, 0.0).await;
        drain_tasks().await;
        assert_eq!(catalog.discover_calls.load(Ordering::SeqCst), 2);
        assert_eq!(deck.view().cards[0].item.id, 3);
        assert_eq!(deck.pager.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_stops_at_exhaustion() {
        let observer = Arc::new(RecordingObserver::default());
        let catalog = FakeCatalog::new(vec![vec![item(1), item(2)]]);
        let deck = deck_with(catalog.clone(), observer);
        deck.start().await;

        // First swipe drops remaining below threshold; the refill gets an
        // empty page and marks the filter exhausted.
        swipe(&deck, 150.0, 0.0).await;
        drain_tasks().await;
        assert!(deck.view().exhausted);
        let calls = catalog.discover_calls.load(Ordering::SeqCst);

        swipe(&deck, 150.0, 0.0).await;
        drain_tasks().await;
        assert_eq!(catalog.discover_calls.load(Ordering::SeqCst), calls);
        assert_eq!(deck.view().status, DeckStatus::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn same_logical_filter_keeps_position() {
        let observer = Arc::new(RecordingObserver::default());
        let catalog = FakeCatalog::new(vec![vec![item(1), item(2), item(3)]]);
        let deck = SwipeDeck::new(
            catalog.clone(),
            Arc::new(MemoryStore::new()),
            observer,
            FilterState::with_genres(ContentKind::Movie, [28, 12]),
        );
        deck.start().await;
        swipe(&deck, 150.0, 0.0).await;
        assert_eq!(deck.cursor(), 1);

        // Genres re-applied in a different order: no reset, position kept.
        deck.on_filter_change(FilterState::with_genres(ContentKind::Movie, [12, 28]))
            .await;
        assert_eq!(deck.cursor(), 1);
        assert_eq!(deck.view().cards[0].item.id, 2);
        assert_eq!(catalog.discover_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_filter_resets_deck() {
        let observer = Arc::new(RecordingObserver::default());
        let catalog = FakeCatalog::new(vec![vec![item(1), item(2)]]);
        let deck = deck_with(catalog.clone(), observer);
        deck.start().await;
        swipe(&deck, 150.0, 0.0).await;

        deck.on_filter_change(FilterState::new(ContentKind::Series)).await;
        assert_eq!(deck.cursor(), 0);
        assert_eq!(deck.view().cards[0].item.id, 900);
        // The old filter's trailer entries were discarded with the cache.
        assert_eq!(deck.trailers.status(1, ContentKind::Movie), TrailerStatus::Unresolved);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_deck_surfaces_fetch_failure_as_retryable() {
        let observer = Arc::new(RecordingObserver::default());
        let catalog = FakeCatalog::new(vec![vec![item(1)], vec![item(2)]]);
        catalog.fail_discover.store(true, Ordering::SeqCst);
        let deck = deck_with(catalog.clone(), observer);
        deck.start().await;

        assert!(matches!(deck.view().status, DeckStatus::Failed(_)));

        catalog.fail_discover.store(false, Ordering::SeqCst);
        deck.retry().await;
        assert_eq!(deck.view().status, DeckStatus::Ready);
        assert_eq!(deck.view().cards[0].item.id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_with_cards_left_stays_silent() {
        let observer = Arc::new(RecordingObserver::default());
        let catalog = FakeCatalog::new(vec![vec![
            item(1),
            item(2),
            item(3),
            item(4),
            item(5),
        ]]);
        let deck = deck_with(catalog.clone(), observer);
        deck.start().await;

        catalog.fail_discover.store(true, Ordering::SeqCst);
        swipe(&deck, 150.0, 0.0).await; // triggers a refill that fails
        drain_tasks().await;

        let view = deck.view();
        assert_eq!(view.status, DeckStatus::Ready);
        assert!(view.error.is_some());
        assert_eq!(view.cards[0].item.id, 2);
    }

    struct RecordingPlayer {
        loaded: Mutex<Vec<String>>,
        plays: AtomicUsize,
        muted: AtomicBool,
    }

    impl RecordingPlayer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                loaded: Mutex::new(Vec::new()),
                plays: AtomicUsize::new(0),
                muted: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl PlaybackWidget for RecordingPlayer {
        async fn wait_ready(&self, _timeout: Duration) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn load(&self, trailer: &TrailerHandle) {
            self.loaded.lock().unwrap().push(trailer.key.clone());
        }

        fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
        }

        fn pause(&self) {}

        fn mute(&self) {
            self.muted.store(true, Ordering::SeqCst);
        }

        fn unmute(&self) {
            self.muted.store(false, Ordering::SeqCst);
        }

        fn is_muted(&self) -> bool {
            self.muted.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn front_card_drives_playback_muted() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1), item(2)]]), observer);
        deck.start().await;

        let player = RecordingPlayer::new();
        deck.attach_player(player.clone());
        drain_tasks().await;

        assert_eq!(player.loaded.lock().unwrap().as_slice(), &["movie-1".to_string()]);
        assert!(player.is_muted());
        assert_eq!(player.plays.load(Ordering::SeqCst), 1);

        // Advancing swaps the widget onto the next card's trailer.
        swipe(&deck, 150.0, 0.0).await;
        drain_tasks().await;
        assert_eq!(player.loaded.lock().unwrap().last().unwrap(), "movie-2");
    }

    #[tokio::test(start_paused = true)]
    async fn mute_toggle_and_loop_on_ended() {
        let observer = Arc::new(RecordingObserver::default());
        let deck = deck_with(FakeCatalog::new(vec![vec![item(1)]]), observer);
        deck.start().await;

        let player = RecordingPlayer::new();
        deck.attach_player(player.clone());
        drain_tasks().await;

        assert!(deck.view().muted);
        assert!(!deck.toggle_mute());
        assert!(!deck.view().muted);
        assert!(!player.is_muted());

        let plays = player.plays.load(Ordering::SeqCst);
        deck.notify_playback_ended();
        assert_eq!(player.plays.load(Ordering::SeqCst), plays + 1);
    }
}
