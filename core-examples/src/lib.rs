//! # Core Examples
//!
//! Example sentence lookup for Japanese study keywords.
//!
//! ## Features
//!
//! - Keyword sanitization down to Japanese script
//! - Immersion Kit search with deck metadata and media URL resolution
//! - LRU caching of recent searches and per-client rate limiting
//! - Built-in random study words
//!
//! The [`ExampleProvider`] trait is the seam consumed by the playback
//! sequencer; [`ImmersionKitClient`] is the production implementation.

pub mod error;
pub mod immersion_kit;
pub mod keyword;
pub mod provider;
pub mod types;

pub use error::{ExampleError, Result};
pub use immersion_kit::ImmersionKitClient;
pub use keyword::{random_word, sanitize_keyword, RANDOM_WORDS};
pub use provider::ExampleProvider;
pub use types::ExampleSentence;
