use async_trait::async_trait;
use std::time::Duration;

use crate::types::TrailerHandle;

/// How long the deck waits for an external player API before giving up on
/// activating a card. Bounded; the card stays visible without playback.
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("playback widget not ready within {0:?}")]
    NotReady(Duration),

    #[error("playback error: {0}")]
    Failed(String),
}

/// Seam to whatever actually plays a trailer. Exactly one card drives the
/// widget at a time (the frontmost one); the deck loads it, keeps mute
/// state in sync, and restarts playback when the widget reports the end
/// of the clip.
#[async_trait]
pub trait PlaybackWidget: Send + Sync {
    /// Wait until the underlying player API is usable, up to `timeout`.
    /// Implementations must resolve or fail within the bound; the deck
    /// never polls indefinitely.
    async fn wait_ready(&self, timeout: Duration) -> Result<(), PlaybackError>;

    /// Point the widget at a trailer. Playback starts on [`play`](Self::play).
    fn load(&self, trailer: &TrailerHandle);

    /// Start (or restart from the top after an ended notification).
    fn play(&self);

    fn pause(&self);

    fn mute(&self);

    fn unmute(&self);

    fn is_muted(&self) -> bool;
}
