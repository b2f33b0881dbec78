//! # Playback Sequencer
//!
//! Owns the current example set and drives audio playback through an
//! [`AudioBackend`]. Guarantees at most one audible source at any time via a
//! monotonically increasing play token: every `play` call captures a fresh
//! token, and a completion whose token is no longer current is discarded
//! before it can touch the speaker or the active handle.
//!
//! Looping and play-all are higher-level modes layered on top, mutually
//! exclusive with each other, each driving repeated play cycles on a spawned
//! task. Both are cancellable at any point by stop, navigation, or a new
//! keyword lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bridge_traits::audio::{AudioBackend, PlaybackEnd, PlayableHandle};
use core_examples::{sanitize_keyword, ExampleProvider, ExampleSentence};

use crate::config::SequencerConfig;
use crate::error::{Result, SequencerError};
use crate::events::{EventBus, SequencerEvent};
use crate::state::SequencerState;

/// How a `play` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The clip played to its natural end
    Completed,
    /// The clip was stopped while audible
    Stopped,
    /// A newer play request took over before this one became audible
    Superseded,
    /// There was nothing to play
    NoAudio,
}

/// The playback sequencer.
///
/// Cheap to clone; clones share the same state, so background cycles hold a
/// clone to keep the sequencer alive. All locks are released before any
/// await point; cross-task correctness rests on the play token, not on
/// holding a lock through a suspension.
#[derive(Clone)]
pub struct PlaybackSequencer {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn ExampleProvider>,
    backend: Arc<dyn AudioBackend>,
    config: SequencerConfig,
    state: Mutex<SequencerState>,
    play_token: AtomicU64,
    active: Mutex<Option<Arc<dyn PlayableHandle>>>,
    last_keyword: Mutex<Option<String>>,
    events: EventBus,
    cancel: CancellationToken,
}

impl PlaybackSequencer {
    pub fn new(
        provider: Arc<dyn ExampleProvider>,
        backend: Arc<dyn AudioBackend>,
        config: SequencerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                backend,
                config,
                state: Mutex::new(SequencerState::default()),
                play_token: AtomicU64::new(0),
                active: Mutex::new(None),
                last_keyword: Mutex::new(None),
                events: EventBus::default(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to sequencer events for rendering.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SequencerEvent> {
        self.inner.events.subscribe()
    }

    pub fn current_index(&self) -> usize {
        self.inner.state.lock().current_index()
    }

    pub fn example_count(&self) -> usize {
        self.inner.state.lock().len()
    }

    pub fn is_looping(&self) -> bool {
        self.inner.state.lock().looping()
    }

    pub fn is_playing_all(&self) -> bool {
        self.inner.state.lock().playing_all()
    }

    /// The entry currently on screen, `None` when the set is empty.
    pub fn current_example(&self) -> Option<ExampleSentence> {
        self.inner.state.lock().current().cloned()
    }

    /// Tears the sequencer down: stops audio, clears modes, and cancels all
    /// background cycles. Further lookups fail with
    /// [`SequencerError::ShutDown`].
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        {
            let mut state = self.inner.state.lock();
            state.set_looping(false);
            state.set_playing_all(false);
        }
        self.stop_current();
    }

    /// Looks up examples for a keyword and adopts them as the current set.
    ///
    /// The keyword is sanitized down to Japanese script first. Looking up
    /// the same sanitized keyword while results are on screen is a no-op
    /// beyond refreshing the displayed title. On success the first entry
    /// autoplays after a short delay if it has audio.
    ///
    /// Lookup failures are pushed to subscribers as a persistent status
    /// message and also surfaced to the caller; zero results and invalid
    /// keywords are status messages only, not errors.
    pub async fn load_keyword(&self, raw_keyword: &str) -> Result<()> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(SequencerError::ShutDown);
        }
        let sanitized = sanitize_keyword(raw_keyword);

        let same_keyword = inner.last_keyword.lock().as_deref() == Some(sanitized.as_str());
        if same_keyword && !inner.state.lock().is_empty() {
            debug!("Keyword unchanged, keeping current examples");
            inner.events.emit(SequencerEvent::LookupStarted {
                keyword: raw_keyword.to_string(),
            });
            return Ok(());
        }

        inner.events.emit(SequencerEvent::LookupStarted {
            keyword: raw_keyword.to_string(),
        });
        *inner.last_keyword.lock() = Some(sanitized.clone());
        self.stop_current();
        self.disable_looping();

        if sanitized.trim().is_empty() {
            inner.state.lock().clear();
            inner.events.emit(SequencerEvent::Status {
                message: "Invalid keyword (non-Japanese)".to_string(),
            });
            return Ok(());
        }

        inner.events.emit(SequencerEvent::Status {
            message: "Loading examples...".to_string(),
        });

        let examples = match inner.provider.search(&sanitized).await {
            Ok(examples) => examples,
            Err(e) => {
                warn!("Example lookup failed for {:?}: {}", sanitized, e);
                inner.state.lock().clear();
                inner.events.emit(SequencerEvent::Status {
                    message: format!("Failed to fetch: {}", e),
                });
                return Err(e.into());
            }
        };

        if examples.is_empty() {
            inner.state.lock().clear();
            inner.events.emit(SequencerEvent::Status {
                message: "No examples found".to_string(),
            });
            return Ok(());
        }

        let count = examples.len();
        info!("Adopting {} examples for {:?}", count, sanitized);
        inner.state.lock().adopt(examples);
        inner.events.emit(SequencerEvent::ExamplesLoaded {
            keyword: raw_keyword.to_string(),
            count,
        });
        inner.events.emit(SequencerEvent::Render {
            index: 0,
            total: count,
        });

        if let Some(url) = inner.state.lock().current_sound_url() {
            let this = self.clone();
            tokio::spawn(async move {
                sleep(this.inner.config.autoplay_delay).await;
                if this.inner.cancel.is_cancelled() {
                    return;
                }
                this.play_logged(&url).await;
            });
        }
        Ok(())
    }

    /// Moves to the adjacent entry, wrapping in both directions.
    ///
    /// No-op on an empty set. Stops current audio, clears loop mode,
    /// re-renders, then autoplays the new entry's audio (if any) after a
    /// settle delay without blocking the caller.
    pub fn navigate(&self, direction: i32) {
        if self.inner.state.lock().is_empty() {
            return;
        }
        self.stop_current();
        self.disable_looping();

        let (index, total, url) = {
            let mut state = self.inner.state.lock();
            let Some(index) = state.step(direction) else {
                return;
            };
            (index, state.len(), state.current_sound_url())
        };
        self.inner.events.emit(SequencerEvent::Render { index, total });

        if let Some(url) = url {
            let this = self.clone();
            tokio::spawn(async move {
                sleep(this.inner.config.render_settle_delay).await;
                if this.inner.cancel.is_cancelled() {
                    return;
                }
                this.play_logged(&url).await;
            });
        }
    }

    /// Plays the current entry's audio once, clearing loop mode first.
    ///
    /// Resolves [`PlayOutcome::NoAudio`] when the set is empty or the entry
    /// is silent.
    pub async fn play_current(&self) -> Result<PlayOutcome> {
        self.disable_looping();
        match self.inner.state.lock().current_sound_url() {
            Some(url) => self.play(&url).await,
            None => Ok(PlayOutcome::NoAudio),
        }
    }

    /// Silences the active handle, if any. Idempotent.
    pub fn stop_current(&self) {
        if let Some(handle) = self.inner.active.lock().take() {
            handle.stop();
        }
    }

    /// Fetches, decodes, and plays one clip to completion.
    ///
    /// Single-flight: a newer `play` supersedes this one at the next check
    /// point, in which case the resolution is a silent
    /// [`PlayOutcome::Superseded`] even if the fetch failed.
    pub async fn play(&self, url: &str) -> Result<PlayOutcome> {
        let inner = &self.inner;
        if url.is_empty() {
            return Ok(PlayOutcome::NoAudio);
        }
        if inner.cancel.is_cancelled() {
            return Err(SequencerError::ShutDown);
        }

        let token = inner.play_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop_current();
        debug!(token, url, "fetching audio");

        let handle = match inner.backend.fetch_and_decode(url).await {
            Ok(handle) => handle,
            Err(e) => {
                if self.is_superseded(token) {
                    debug!(token, "superseded during fetch, suppressing error");
                    return Ok(PlayOutcome::Superseded);
                }
                return Err(e.into());
            }
        };

        let handle: Arc<dyn PlayableHandle> = Arc::from(handle);
        {
            // Re-check and adoption happen under the same lock a newer
            // play's stop_current takes, so a stale handle can never
            // outlive its successor's silence sweep.
            let mut active = inner.active.lock();
            if self.is_superseded(token) {
                debug!(token, "superseded after decode, discarding handle");
                return Ok(PlayOutcome::Superseded);
            }
            *active = Some(Arc::clone(&handle));
        }

        let index = inner.state.lock().current_index();
        inner.events.emit(SequencerEvent::PlaybackStarted {
            index,
            url: url.to_string(),
        });
        handle.start();
        let end = handle.wait_until_end().await;

        {
            let mut active = inner.active.lock();
            if active
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &handle))
            {
                *active = None;
            }
        }

        Ok(match end {
            PlaybackEnd::Natural => PlayOutcome::Completed,
            PlaybackEnd::Stopped => PlayOutcome::Stopped,
        })
    }

    /// Toggles loop mode, or forces it with `Some(state)`.
    ///
    /// Turning loop on cancels play-all and starts the loop cycle on a
    /// background task; turning it off stops current audio. Setting the
    /// already-active state is a no-op.
    pub fn toggle_loop(&self, force: Option<bool>) {
        let (change, now_on) = {
            let mut state = self.inner.state.lock();
            let target = force.unwrap_or(!state.looping());
            (state.set_looping(target), target)
        };
        if !change.changed {
            return;
        }
        self.emit_modes();
        if now_on {
            if change.cancelled_other {
                self.stop_current();
            }
            let this = self.clone();
            tokio::spawn(async move { this.loop_cycle().await });
        } else {
            self.stop_current();
        }
    }

    /// Toggles play-all mode, or forces it with `Some(state)`.
    ///
    /// Turning play-all on cancels loop mode and starts one full traversal
    /// on a background task; turning it off stops current audio and halts
    /// the traversal.
    pub fn toggle_play_all(&self, force: Option<bool>) {
        let (change, now_on) = {
            let mut state = self.inner.state.lock();
            let target = force.unwrap_or(!state.playing_all());
            (state.set_playing_all(target), target)
        };
        if !change.changed {
            return;
        }
        self.emit_modes();
        if now_on {
            if change.cancelled_other {
                self.stop_current();
            }
            let this = self.clone();
            tokio::spawn(async move { this.play_all_sequence().await });
        } else {
            self.stop_current();
        }
    }

    /// Repeats the current entry until loop mode clears.
    ///
    /// A silent entry, an interrupted play, or a playback error all disable
    /// the loop rather than spin.
    async fn loop_cycle(self) {
        loop {
            if self.inner.cancel.is_cancelled() {
                self.disable_looping();
                return;
            }
            let url = {
                let state = self.inner.state.lock();
                if !state.looping() {
                    return;
                }
                state.current_sound_url()
            };
            let Some(url) = url else {
                self.disable_looping();
                return;
            };

            match self.play(&url).await {
                Ok(PlayOutcome::Completed) | Ok(PlayOutcome::NoAudio) => {}
                Ok(PlayOutcome::Stopped) | Ok(PlayOutcome::Superseded) => {
                    // Something external took over the audio path
                    self.disable_looping();
                    return;
                }
                Err(e) => {
                    warn!("Loop playback failed: {}", e);
                    self.inner.events.emit(SequencerEvent::PlaybackError {
                        message: e.to_string(),
                    });
                    self.disable_looping();
                    return;
                }
            }
            if !self.inner.state.lock().looping() {
                return;
            }
            sleep(self.inner.config.loop_gap).await;
        }
    }

    /// Visits every entry exactly once from the current index, then
    /// auto-disables play-all.
    ///
    /// Silent entries are rendered and counted toward the single pass; they
    /// just contribute no audio or gap.
    async fn play_all_sequence(self) {
        let total = self.inner.state.lock().len();
        if total == 0 {
            self.disable_play_all();
            return;
        }

        let mut played = 0usize;
        while played < total {
            if self.inner.cancel.is_cancelled() || !self.inner.state.lock().playing_all() {
                break;
            }
            let (index, url) = {
                let state = self.inner.state.lock();
                (state.current_index(), state.current_sound_url())
            };
            self.inner.events.emit(SequencerEvent::Render { index, total });

            if let Some(url) = url {
                match self.play(&url).await {
                    Ok(PlayOutcome::Completed) | Ok(PlayOutcome::NoAudio) => {}
                    Ok(PlayOutcome::Stopped) | Ok(PlayOutcome::Superseded) => break,
                    Err(e) => {
                        warn!("Play-all playback failed: {}", e);
                        self.inner.events.emit(SequencerEvent::PlaybackError {
                            message: e.to_string(),
                        });
                        break;
                    }
                }
                if !self.inner.state.lock().playing_all() {
                    break;
                }
                sleep(self.inner.config.play_all_gap).await;
            }

            if !self.inner.state.lock().playing_all() {
                break;
            }
            self.inner.state.lock().step(1);
            played += 1;
        }
        self.disable_play_all();
    }

    async fn play_logged(&self, url: &str) {
        if let Err(e) = self.play(url).await {
            warn!("Playback failed for {}: {}", url, e);
            self.inner.events.emit(SequencerEvent::PlaybackError {
                message: e.to_string(),
            });
        }
    }

    fn is_superseded(&self, token: u64) -> bool {
        self.inner.play_token.load(Ordering::SeqCst) != token
    }

    fn disable_looping(&self) {
        let change = self.inner.state.lock().set_looping(false);
        if change.changed {
            self.emit_modes();
        }
    }

    fn disable_play_all(&self) {
        let change = self.inner.state.lock().set_playing_all(false);
        if change.changed {
            self.emit_modes();
        }
    }

    fn emit_modes(&self) {
        let (looping, playing_all) = {
            let state = self.inner.state.lock();
            (state.looping(), state.playing_all())
        };
        self.inner.events.emit(SequencerEvent::ModeChanged {
            looping,
            playing_all,
        });
    }
}
