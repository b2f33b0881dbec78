//! # Sequencer Event Bus
//!
//! Decouples the sequencer from whatever renders it using
//! `tokio::sync::broadcast`. The presentation layer subscribes and reflects
//! events into counters, button states, and status text; the sequencer never
//! touches a UI surface directly.
//!
//! ## Usage
//!
//! ```rust
//! use core_sequencer::events::{EventBus, SequencerEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::default();
//! let mut stream = bus.subscribe();
//!
//! bus.emit(SequencerEvent::Status {
//!     message: "Loading examples...".to_string(),
//! });
//!
//! let event = stream.recv().await.unwrap();
//! assert!(matches!(event, SequencerEvent::Status { .. }));
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default buffer size for the event channel
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Events emitted by the playback sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerEvent {
    /// A keyword lookup started; presentation should show the raw keyword
    LookupStarted { keyword: String },
    /// A lookup finished with a fresh example set
    ExamplesLoaded { keyword: String, count: usize },
    /// The current entry changed and should be re-rendered
    Render { index: usize, total: usize },
    /// A persistent status message replaces the content area
    Status { message: String },
    /// A clip became audible
    PlaybackStarted { index: usize, url: String },
    /// A playback attempt failed; content stays visible without audio
    PlaybackError { message: String },
    /// Loop or play-all flags changed
    ModeChanged { looping: bool, playing_all: bool },
}

impl SequencerEvent {
    /// Short human-readable description, used in log lines.
    pub fn description(&self) -> String {
        match self {
            SequencerEvent::LookupStarted { keyword } => format!("lookup started: {}", keyword),
            SequencerEvent::ExamplesLoaded { keyword, count } => {
                format!("{} examples loaded for {}", count, keyword)
            }
            SequencerEvent::Render { index, total } => format!("render {}/{}", index + 1, total),
            SequencerEvent::Status { message } => format!("status: {}", message),
            SequencerEvent::PlaybackStarted { index, .. } => {
                format!("playback started at index {}", index)
            }
            SequencerEvent::PlaybackError { message } => format!("playback error: {}", message),
            SequencerEvent::ModeChanged {
                looping,
                playing_all,
            } => format!("modes: loop={} play_all={}", looping, playing_all),
        }
    }
}

/// Broadcast channel for sequencer events.
///
/// Cheap to clone; every subscriber gets an independent cursor into the
/// stream and may lag without blocking the sequencer.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SequencerEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events
    /// receives `RecvError::Lagged` and continues from the oldest retained
    /// event.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// An event emitted with no subscribers is dropped silently; the
    /// sequencer does not care whether anyone is rendering.
    pub fn emit(&self, event: SequencerEvent) {
        tracing::debug!("{}", event.description());
        let _ = self.sender.send(event);
    }

    /// Creates a new subscription to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_all_subscribers() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(SequencerEvent::Render { index: 2, total: 5 });

        assert_eq!(a.recv().await.unwrap(), SequencerEvent::Render { index: 2, total: 5 });
        assert_eq!(b.recv().await.unwrap(), SequencerEvent::Render { index: 2, total: 5 });
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(SequencerEvent::Status {
            message: "No examples found".to_string(),
        });
    }

    #[test]
    fn descriptions_are_one_indexed_for_render() {
        let event = SequencerEvent::Render { index: 0, total: 3 };
        assert_eq!(event.description(), "render 1/3");
    }
}
