//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `AudioBackend` using `rodio`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, RodioAudioBackend};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new());
//! let audio = RodioAudioBackend::new(http_client.clone())?;
//! ```

mod audio;
mod http;

pub use audio::RodioAudioBackend;
pub use http::ReqwestHttpClient;
