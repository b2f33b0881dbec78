//! # Bridge Traits
//!
//! Platform abstraction traits for the reibun study-aid core. The core
//! crates depend only on these traits; host shims (desktop, tests) provide
//! the implementations.
//!
//! ## Design Principles
//!
//! - All traits are async-first using `async_trait`
//! - Send + Sync bounds so implementations can cross task boundaries
//! - Results use a shared [`BridgeError`] so callers get one failure surface
//!
//! ## Modules
//!
//! - [`audio`]: Fetch-and-decode audio playback handles
//! - [`http`]: HTTP client with retry support
//! - [`time`]: Wall-clock abstraction
//! - [`error`]: Common error types

pub mod audio;
pub mod error;
pub mod http;
pub mod time;

pub use audio::{AudioBackend, PlaybackEnd, PlayableHandle};
pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use time::{Clock, SystemClock};
