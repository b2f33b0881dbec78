//! Audio Backend Abstraction
//!
//! Defines the seam between the playback sequencer and whatever actually
//! makes sound. A backend turns a media URL into a [`PlayableHandle`]; the
//! sequencer decides when that handle becomes audible and when it is cut
//! short. Keeping fetch-and-decode separate from start lets the sequencer
//! re-check its supersede token after the slow part has finished.

use async_trait::async_trait;

use crate::error::Result;

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The clip played through to its natural end.
    Natural,
    /// [`PlayableHandle::stop`] was called before the clip finished.
    Stopped,
}

/// A decoded clip that is ready to play.
///
/// Handles start silent. Dropping a handle without calling
/// [`PlayableHandle::start`] must never produce sound.
#[async_trait]
pub trait PlayableHandle: Send + Sync {
    /// Make the clip audible. Calling more than once is a no-op.
    fn start(&self);

    /// Cut playback short. Idempotent, and safe to call before `start`.
    fn stop(&self);

    /// Wait for the clip to finish, either naturally or via [`stop`].
    ///
    /// [`stop`]: PlayableHandle::stop
    async fn wait_until_end(&self) -> PlaybackEnd;
}

/// Async audio backend trait
///
/// Implementations own the audio device and the decode pipeline.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Fetch the media at `url` and decode it into a silent, ready handle.
    ///
    /// # Errors
    ///
    /// Returns error if the fetch fails, the bytes cannot be decoded, or no
    /// audio device is available.
    async fn fetch_and_decode(&self, url: &str) -> Result<Box<dyn PlayableHandle>>;
}
