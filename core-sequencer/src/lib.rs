//! # Core Sequencer
//!
//! Audio playback sequencer for example sentence review.
//!
//! ## Architecture
//!
//! - [`state`]: pure state transitions (index, loop and play-all flags)
//! - [`sequencer`]: async shell that drives audio and emits events
//! - [`events`]: broadcast bus consumed by the presentation layer
//! - [`config`]: fixed pacing delays between clips
//!
//! The sequencer guarantees at most one audible source at a time; see
//! [`sequencer::PlaybackSequencer`] for the token-guard mechanism.

pub mod config;
pub mod error;
pub mod events;
pub mod sequencer;
pub mod state;

pub use config::SequencerConfig;
pub use error::{Result, SequencerError};
pub use events::{EventBus, SequencerEvent};
pub use sequencer::{PlayOutcome, PlaybackSequencer};
pub use state::{ModeChange, SequencerState};
