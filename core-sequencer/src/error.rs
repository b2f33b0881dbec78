//! Error types for the playback sequencer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Audio fetch failed: {0}")]
    AudioFetch(String),

    #[error("Audio decode failed: {0}")]
    AudioDecode(String),

    #[error(transparent)]
    Provider(#[from] core_examples::ExampleError),

    /// The sequencer was shut down while the operation was in flight
    #[error("Sequencer is shut down")]
    ShutDown,
}

impl From<bridge_traits::BridgeError> for SequencerError {
    fn from(e: bridge_traits::BridgeError) -> Self {
        match e {
            bridge_traits::BridgeError::Decode(msg) => SequencerError::AudioDecode(msg),
            other => SequencerError::AudioFetch(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SequencerError>;
