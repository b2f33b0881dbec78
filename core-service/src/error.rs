//! Errors surfaced by the service façade

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A bridge or subscriber could not be set up
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error(transparent)]
    Sequencer(#[from] core_sequencer::SequencerError),

    /// The built-in random word list is empty
    #[error("Random word list is empty")]
    NoRandomWords,
}

pub type Result<T> = std::result::Result<T, CoreError>;
